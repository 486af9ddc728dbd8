use crate::port::Port;
use core::fmt;
use core::ptr;
use enum_map::{enum_map, EnumMap};

/// One of the two registers owned by every port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// Each bit controls the direction of a given pin. 0=input, 1=output.
    Direction,
    /// Holds the output level of output pins and reflects the level of input
    /// pins.
    Data,
}

/// The set of registers that back the four GPIO ports. Every call is a real
/// register access: implementations must not cache anything.
#[cfg_attr(test, mockall::automock)]
pub trait RegisterFile {
    fn read(&self, port: Port, register: Register) -> u8;
    fn write(&mut self, port: Port, register: Register, value: u8);
}

/// Locations of the registers of a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterAddresses {
    pub direction: usize,
    pub data: usize,
}

impl RegisterAddresses {
    fn of(&self, register: Register) -> usize {
        match register {
            Register::Direction => self.direction,
            Register::Data => self.data,
        }
    }
}

/// Memory-mapped hardware registers, accessed with volatile byte reads and
/// writes.
#[derive(Debug)]
pub struct MmioRegisters {
    addresses: EnumMap<Port, RegisterAddresses>,
    // Raw pointers are neither `Send` nor `Sync`, and neither is the hardware.
    _not_send: core::marker::PhantomData<*mut u8>,
}

impl MmioRegisters {
    /// Creates a register file over given register locations.
    ///
    /// # Safety
    ///
    /// Every address must be a valid, byte-sized device register that stays
    /// mapped for the lifetime of the returned value. The caller is
    /// responsible for serializing any concurrent access to these registers,
    /// including access from interrupt handlers.
    pub unsafe fn new(addresses: EnumMap<Port, RegisterAddresses>) -> Self {
        Self {
            addresses,
            _not_send: core::marker::PhantomData,
        }
    }

    pub fn addresses(&self, port: Port) -> RegisterAddresses {
        self.addresses[port]
    }
}

impl RegisterFile for MmioRegisters {
    fn read(&self, port: Port, register: Register) -> u8 {
        let address = self.addresses[port].of(register) as *const u8;
        // SAFETY: guaranteed by the contract of `MmioRegisters::new`.
        unsafe { ptr::read_volatile(address) }
    }

    fn write(&mut self, port: Port, register: Register, value: u8) {
        let address = self.addresses[port].of(register) as *mut u8;
        // SAFETY: guaranteed by the contract of `MmioRegisters::new`.
        unsafe { ptr::write_volatile(address, value) }
    }
}

/// An internal state of an 8-bit port.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PortRegisters {
    pub direction: u8,
    pub data: u8,
}

/// An in-memory register file for hosted builds and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimulatedRegisters {
    ports: EnumMap<Port, PortRegisters>,
}

impl SimulatedRegisters {
    /// Creates a register file with all registers cleared, which is how the
    /// hardware comes out of reset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a register file with every register set to a given value.
    pub fn initialized_with(value: u8) -> Self {
        Self {
            ports: enum_map! {
                _ => PortRegisters {
                    direction: value,
                    data: value,
                },
            },
        }
    }

    pub fn port(&self, port: Port) -> PortRegisters {
        self.ports[port]
    }

    pub fn port_mut(&mut self, port: Port) -> &mut PortRegisters {
        &mut self.ports[port]
    }

    pub fn direction(&self, port: Port) -> u8 {
        self.ports[port].direction
    }

    pub fn data(&self, port: Port) -> u8 {
        self.ports[port].data
    }
}

impl RegisterFile for SimulatedRegisters {
    fn read(&self, port: Port, register: Register) -> u8 {
        let registers = &self.ports[port];
        match register {
            Register::Direction => registers.direction,
            Register::Data => registers.data,
        }
    }

    fn write(&mut self, port: Port, register: Register, value: u8) {
        let registers = &mut self.ports[port];
        match register {
            Register::Direction => registers.direction = value,
            Register::Data => registers.data = value,
        }
    }
}

impl fmt::Display for SimulatedRegisters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (port, registers) in self.ports.iter() {
            writeln!(
                f,
                "PORT{} DIR=${:02X} ({:08b}) DATA=${:02X} ({:08b})",
                port.letter(),
                registers.direction,
                registers.direction,
                registers.data,
                registers.data,
            )?;
        }
        Ok(())
    }
}
