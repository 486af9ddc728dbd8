use bitflags::bitflags;

bitflags! {
    /// A selection of pins within a single port. Any combination of bits is
    /// valid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Pins: u8 {
        const BIT0 = 1 << 0;
        const BIT1 = 1 << 1;
        const BIT2 = 1 << 2;
        const BIT3 = 1 << 3;
        const BIT4 = 1 << 4;
        const BIT5 = 1 << 5;
        const BIT6 = 1 << 6;
        const BIT7 = 1 << 7;
    }
}

impl Pins {
    /// Selects a single pin. Indices beyond 7 select nothing.
    pub fn pin(index: u8) -> Self {
        Self::from_bits_retain(1u8.checked_shl(index as u32).unwrap_or(0))
    }
}

impl From<u8> for Pins {
    fn from(mask: u8) -> Self {
        Self::from_bits_retain(mask)
    }
}

impl From<Nibble> for Pins {
    fn from(nibble: Nibble) -> Self {
        Self::from_bits_retain(nibble.mask())
    }
}

/// Raw byte meaning "all selected pins are inputs".
pub const INPUT: u8 = 0x00;
/// Raw byte meaning "all selected pins are outputs".
pub const OUTPUT: u8 = 0xFF;
/// Raw byte for the low logical level.
pub const LOW: u8 = 0x00;
/// Raw byte for the high logical level.
pub const HIGH: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

impl From<u8> for Direction {
    /// Only `OUTPUT` (0xFF) means output; every other byte is an input.
    fn from(direction: u8) -> Self {
        if direction == OUTPUT {
            Direction::Output
        } else {
            Direction::Input
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl From<u8> for Level {
    /// Zero is low, anything else is high.
    fn from(level: u8) -> Self {
        if level == LOW {
            Level::Low
        } else {
            Level::High
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// A fixed half of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nibble {
    /// Bits 4-7.
    Upper,
    /// Bits 0-3.
    Lower,
}

impl Nibble {
    pub fn mask(self) -> u8 {
        match self {
            Nibble::Upper => 0xF0,
            Nibble::Lower => 0x0F,
        }
    }
}
