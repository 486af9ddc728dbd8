//! Direct register access to four 8-bit GPIO ports (A to D), at whole-port,
//! pin and nibble granularity, plus a crude busy-wait delay.
//!
//! The driver never reports errors. Operations addressed to a raw port id
//! outside of 0..=3 do nothing, and reads from such a port return 0.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod delay;
pub mod driver;
pub mod pins;
pub mod port;
pub mod registers;

pub use driver::Gpio;
pub use pins::{Direction, Level, Nibble, Pins};
pub use port::{InvalidPortError, Port};
pub use registers::{
    MmioRegisters, PortRegisters, Register, RegisterAddresses, RegisterFile, SimulatedRegisters,
};
