
use crate::pins::{Direction, Level, Nibble, Pins};
use crate::port::Port;
use crate::registers::{Register, RegisterFile};

/// A GPIO driver for four 8-bit ports backed by a given register file.
///
/// Every operation takes the port either as a [`Port`] or as a raw `u8` id.
/// Mutating operations on an invalid raw id do nothing; reads from an invalid
/// raw id return 0. Each operation touches the registers of exactly one port.
#[derive(Debug)]
pub struct Gpio<R: RegisterFile> {
    registers: R,
}

impl<R: RegisterFile> Gpio<R> {
    pub fn new(registers: R) -> Self {
        Self { registers }
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.registers
    }

    pub fn into_registers(self) -> R {
        self.registers
    }

    // Whole port

    /// Assigns the entire direction register. 0x00 makes every pin an input,
    /// 0xFF makes every pin an output, but any byte is stored as-is.
    pub fn set_port_direction(&mut self, port: impl TryInto<Port>, direction: u8) {
        if let Ok(port) = port.try_into() {
            self.registers.write(port, Register::Direction, direction);
        }
    }

    /// Assigns the entire data register.
    pub fn write_port(&mut self, port: impl TryInto<Port>, value: u8) {
        if let Ok(port) = port.try_into() {
            self.registers.write(port, Register::Data, value);
        }
    }

    /// Flips every bit of the data register.
    pub fn toggle_port(&mut self, port: impl TryInto<Port>) {
        if let Ok(port) = port.try_into() {
            self.modify(port, Register::Data, |data| data ^ 0xFF);
        }
    }

    /// Reads the data register.
    pub fn read_port(&self, port: impl TryInto<Port>) -> u8 {
        match port.try_into() {
            Ok(port) => self.registers.read(port, Register::Data),
            Err(_) => 0,
        }
    }

    // Pins

    /// Makes all selected pins outputs or all selected pins inputs, leaving
    /// the remaining pins alone. A raw direction byte means output only if
    /// it's exactly 0xFF.
    pub fn set_pin_direction(
        &mut self,
        port: impl TryInto<Port>,
        pins: impl Into<Pins>,
        direction: impl Into<Direction>,
    ) {
        if let Ok(port) = port.try_into() {
            let mask = pins.into().bits();
            match direction.into() {
                Direction::Output => self.modify(port, Register::Direction, |dir| dir | mask),
                Direction::Input => self.modify(port, Register::Direction, |dir| dir & !mask),
            }
        }
    }

    /// Drives all selected pins to the same level. A raw level byte means
    /// low only if it's 0.
    pub fn write_pins(
        &mut self,
        port: impl TryInto<Port>,
        pins: impl Into<Pins>,
        level: impl Into<Level>,
    ) {
        if let Ok(port) = port.try_into() {
            let mask = pins.into().bits();
            match level.into() {
                Level::High => self.modify(port, Register::Data, |data| data | mask),
                Level::Low => self.modify(port, Register::Data, |data| data & !mask),
            }
        }
    }

    /// Flips the selected pins.
    pub fn toggle_pins(&mut self, port: impl TryInto<Port>, pins: impl Into<Pins>) {
        if let Ok(port) = port.try_into() {
            let mask = pins.into().bits();
            self.modify(port, Register::Data, |data| data ^ mask);
        }
    }

    /// Returns 1 if the data bit at `index` is set, 0 otherwise. Indices
    /// beyond 7 always read as 0.
    pub fn read_pin(&self, port: impl TryInto<Port>, index: u8) -> u8 {
        match port.try_into() {
            Ok(port) => {
                let data = self.registers.read(port, Register::Data);
                data.checked_shr(index as u32).unwrap_or(0) & 1
            }
            Err(_) => 0,
        }
    }

    // Nibbles

    /// Copies the nibble's bits of `direction` into the direction register.
    pub fn set_nibble_direction(
        &mut self,
        port: impl TryInto<Port>,
        nibble: Nibble,
        direction: u8,
    ) {
        if let Ok(port) = port.try_into() {
            self.assign_bits(port, Register::Direction, nibble.mask(), direction);
        }
    }

    /// Copies the nibble's bits of `value` into the data register.
    pub fn write_nibble(&mut self, port: impl TryInto<Port>, nibble: Nibble, value: u8) {
        if let Ok(port) = port.try_into() {
            self.assign_bits(port, Register::Data, nibble.mask(), value);
        }
    }

    pub fn toggle_nibble(&mut self, port: impl TryInto<Port>, nibble: Nibble) {
        self.toggle_pins(port, nibble);
    }

    /// Reads the nibble's bits of the data register. The result is not
    /// shifted: an upper nibble read is always a multiple of 16.
    pub fn read_nibble(&self, port: impl TryInto<Port>, nibble: Nibble) -> u8 {
        self.read_port(port) & nibble.mask()
    }

    pub fn set_upper_nibble_direction(&mut self, port: impl TryInto<Port>, direction: u8) {
        self.set_nibble_direction(port, Nibble::Upper, direction);
    }

    pub fn write_upper_nibble(&mut self, port: impl TryInto<Port>, value: u8) {
        self.write_nibble(port, Nibble::Upper, value);
    }

    pub fn toggle_upper_nibble(&mut self, port: impl TryInto<Port>) {
        self.toggle_nibble(port, Nibble::Upper);
    }

    pub fn read_upper_nibble(&self, port: impl TryInto<Port>) -> u8 {
        self.read_nibble(port, Nibble::Upper)
    }

    pub fn set_lower_nibble_direction(&mut self, port: impl TryInto<Port>, direction: u8) {
        self.set_nibble_direction(port, Nibble::Lower, direction);
    }

    pub fn write_lower_nibble(&mut self, port: impl TryInto<Port>, value: u8) {
        self.write_nibble(port, Nibble::Lower, value);
    }

    pub fn toggle_lower_nibble(&mut self, port: impl TryInto<Port>) {
        self.toggle_nibble(port, Nibble::Lower);
    }

    pub fn read_lower_nibble(&self, port: impl TryInto<Port>) -> u8 {
        self.read_nibble(port, Nibble::Lower)
    }

    /// Performs a single read-modify-write cycle on a register.
    fn modify(&mut self, port: Port, register: Register, f: impl FnOnce(u8) -> u8) {
        let value = self.registers.read(port, register);
        self.registers.write(port, register, f(value));
    }

    /// Replaces the bits selected by `mask` with the same bits of `value`.
    fn assign_bits(&mut self, port: Port, register: Register, mask: u8, value: u8) {
        self.modify(port, register, |current| (current & !mask) | (value & mask));
    }
}
