use enum_map::Enum;

/// One of the four GPIO ports. The raw ids used by firmware are 0 to 3, in
/// declaration order.
#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Port {
    A,
    B,
    C,
    D,
}

impl Port {
    pub const ALL: [Port; 4] = [Port::A, Port::B, Port::C, Port::D];

    /// The raw port id, as used by `TryFrom<u8>`.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// The port letter, for display purposes.
    pub fn letter(self) -> char {
        (b'A' + self.id()) as char
    }
}

impl TryFrom<u8> for Port {
    type Error = InvalidPortError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Port::A),
            1 => Ok(Port::B),
            2 => Ok(Port::C),
            3 => Ok(Port::D),
            _ => Err(InvalidPortError { id }),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("No such GPIO port: {id}")]
pub struct InvalidPortError {
    pub id: u8,
}
