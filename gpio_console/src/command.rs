use gpio::{Direction, Gpio, Level, Nibble, SimulatedRegisters};
use std::fmt;

/// A single console command. Ports are kept as raw ids, so that commands
/// addressed to nonexistent ports reach the driver too.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PortDirection { port: u8, direction: u8 },
    PortWrite { port: u8, value: u8 },
    PortToggle { port: u8 },
    PortRead { port: u8 },
    PinDirection { port: u8, mask: u8, direction: Direction },
    PinWrite { port: u8, mask: u8, level: Level },
    PinToggle { port: u8, mask: u8 },
    PinRead { port: u8, index: u8 },
    NibbleDirection { nibble: Nibble, port: u8, direction: u8 },
    NibbleWrite { nibble: Nibble, port: u8, value: u8 },
    NibbleToggle { nibble: Nibble, port: u8 },
    NibbleRead { nibble: Nibble, port: u8 },
    Delay { ms: u32 },
    Dump,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing argument of {command}: {argument}")]
    MissingArgument {
        command: String,
        argument: &'static str,
    },

    #[error("Unexpected argument of {command}: {argument}")]
    UnexpectedArgument { command: String, argument: String },

    #[error("Invalid port: {0}")]
    InvalidPort(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Invalid direction: {0} (expected in, out or a byte)")]
    InvalidDirection(String),

    #[error("Invalid level: {0} (expected low, high or a byte)")]
    InvalidLevel(String),

    #[error("Invalid nibble: {0} (expected upper or lower)")]
    InvalidNibble(String),
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Parses a number in decimal, `0x` or `$` hexadecimal, or `0b` binary
/// notation.
fn parse_number<T: TryFrom<u64>>(token: &str) -> CommandResult<T> {
    let lowercase = token.to_ascii_lowercase();
    let parsed = if let Some(hex) = lowercase.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = lowercase.strip_prefix("0b") {
        u64::from_str_radix(bin, 2)
    } else if let Some(hex) = lowercase.strip_prefix('$') {
        u64::from_str_radix(hex, 16)
    } else {
        lowercase.parse()
    };
    parsed
        .ok()
        .and_then(|value| T::try_from(value).ok())
        .ok_or_else(|| CommandError::InvalidNumber(token.to_string()))
}

pub fn parse_byte(token: &str) -> CommandResult<u8> {
    parse_number(token)
}

/// Parses a port letter or a raw port id. Raw ids aren't checked against the
/// set of existing ports.
fn parse_port(token: &str) -> CommandResult<u8> {
    match token.to_ascii_uppercase().as_str() {
        "A" => Ok(0),
        "B" => Ok(1),
        "C" => Ok(2),
        "D" => Ok(3),
        _ => parse_byte(token).map_err(|_| CommandError::InvalidPort(token.to_string())),
    }
}

fn parse_direction(token: &str) -> CommandResult<Direction> {
    match token.to_ascii_lowercase().as_str() {
        "in" | "input" => Ok(Direction::Input),
        "out" | "output" => Ok(Direction::Output),
        _ => parse_byte(token)
            .map(Direction::from)
            .map_err(|_| CommandError::InvalidDirection(token.to_string())),
    }
}

fn parse_level(token: &str) -> CommandResult<Level> {
    match token.to_ascii_lowercase().as_str() {
        "low" => Ok(Level::Low),
        "high" => Ok(Level::High),
        _ => parse_byte(token)
            .map(Level::from)
            .map_err(|_| CommandError::InvalidLevel(token.to_string())),
    }
}

fn parse_nibble(token: &str) -> CommandResult<Nibble> {
    match token.to_ascii_lowercase().as_str() {
        "upper" | "high" => Ok(Nibble::Upper),
        "lower" | "low" => Ok(Nibble::Lower),
        _ => Err(CommandError::InvalidNibble(token.to_string())),
    }
}

/// Hands out consecutive arguments of a command.
struct Arguments<'a, I: Iterator<Item = &'a str>> {
    command: &'a str,
    tokens: I,
}

impl<'a, I: Iterator<Item = &'a str>> Arguments<'a, I> {
    fn next<T>(
        &mut self,
        argument: &'static str,
        parse: impl FnOnce(&str) -> CommandResult<T>,
    ) -> CommandResult<T> {
        match self.tokens.next() {
            Some(token) => parse(token),
            None => Err(CommandError::MissingArgument {
                command: self.command.to_string(),
                argument,
            }),
        }
    }

    fn finish(mut self) -> CommandResult<()> {
        match self.tokens.next() {
            Some(token) => Err(CommandError::UnexpectedArgument {
                command: self.command.to_string(),
                argument: token.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Command {
    pub fn parse(line: &str) -> CommandResult<Command> {
        let mut tokens = line.split_whitespace();
        let name = tokens.next().ok_or(CommandError::Empty)?;
        let mut args = Arguments {
            command: name,
            tokens,
        };
        let parsed = match name {
            "port-dir" => Command::PortDirection {
                port: args.next("port", parse_port)?,
                direction: args.next("direction", parse_byte)?,
            },
            "port-write" => Command::PortWrite {
                port: args.next("port", parse_port)?,
                value: args.next("value", parse_byte)?,
            },
            "port-toggle" => Command::PortToggle {
                port: args.next("port", parse_port)?,
            },
            "port-read" => Command::PortRead {
                port: args.next("port", parse_port)?,
            },
            "pin-dir" => Command::PinDirection {
                port: args.next("port", parse_port)?,
                mask: args.next("mask", parse_byte)?,
                direction: args.next("direction", parse_direction)?,
            },
            "pin-write" => Command::PinWrite {
                port: args.next("port", parse_port)?,
                mask: args.next("mask", parse_byte)?,
                level: args.next("level", parse_level)?,
            },
            "pin-toggle" => Command::PinToggle {
                port: args.next("port", parse_port)?,
                mask: args.next("mask", parse_byte)?,
            },
            "pin-read" => Command::PinRead {
                port: args.next("port", parse_port)?,
                index: args.next("index", parse_byte)?,
            },
            "nibble-dir" => Command::NibbleDirection {
                nibble: args.next("nibble", parse_nibble)?,
                port: args.next("port", parse_port)?,
                direction: args.next("direction", parse_byte)?,
            },
            "nibble-write" => Command::NibbleWrite {
                nibble: args.next("nibble", parse_nibble)?,
                port: args.next("port", parse_port)?,
                value: args.next("value", parse_byte)?,
            },
            "nibble-toggle" => Command::NibbleToggle {
                nibble: args.next("nibble", parse_nibble)?,
                port: args.next("port", parse_port)?,
            },
            "nibble-read" => Command::NibbleRead {
                nibble: args.next("nibble", parse_nibble)?,
                port: args.next("port", parse_port)?,
            },
            "delay" => Command::Delay {
                ms: args.next("milliseconds", parse_number)?,
            },
            "dump" => Command::Dump,
            _ => return Err(CommandError::UnknownCommand(name.to_string())),
        };
        args.finish()?;
        return Ok(parsed);
    }

    /// Runs the command, returning whatever it has to report.
    pub fn execute(&self, gpio: &mut Gpio<SimulatedRegisters>) -> Option<Output> {
        match *self {
            Command::PortDirection { port, direction } => gpio.set_port_direction(port, direction),
            Command::PortWrite { port, value } => gpio.write_port(port, value),
            Command::PortToggle { port } => gpio.toggle_port(port),
            Command::PortRead { port } => return Some(Output::Byte(gpio.read_port(port))),
            Command::PinDirection {
                port,
                mask,
                direction,
            } => gpio.set_pin_direction(port, mask, direction),
            Command::PinWrite { port, mask, level } => gpio.write_pins(port, mask, level),
            Command::PinToggle { port, mask } => gpio.toggle_pins(port, mask),
            Command::PinRead { port, index } => {
                return Some(Output::Byte(gpio.read_pin(port, index)))
            }
            Command::NibbleDirection {
                nibble,
                port,
                direction,
            } => gpio.set_nibble_direction(port, nibble, direction),
            Command::NibbleWrite {
                nibble,
                port,
                value,
            } => gpio.write_nibble(port, nibble, value),
            Command::NibbleToggle { nibble, port } => gpio.toggle_nibble(port, nibble),
            Command::NibbleRead { nibble, port } => {
                return Some(Output::Byte(gpio.read_nibble(port, nibble)))
            }
            Command::Delay { ms } => gpio::delay::delay_ms(ms),
            Command::Dump => return Some(Output::Dump(gpio.registers().clone())),
        }
        return None;
    }
}

/// A result of running a reading command.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Byte(u8),
    Dump(SimulatedRegisters),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Output::Byte(value) => write!(f, "${:02X}", value),
            Output::Dump(registers) => write!(f, "{}", registers.to_string().trim_end()),
        }
    }
}

/// Reads commands from a script, skipping blank lines and `#` comments.
/// Returns each command with its 1-based line number.
pub fn parse_script(script: &str) -> Vec<(usize, CommandResult<Command>)> {
    script
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| (number, Command::parse(line)))
        .collect()
}

/// A command that failed to parse, labeled with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Malformed {
    pub position: String,
    pub error: CommandError,
}

impl fmt::Display for Malformed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.position, self.error)
    }
}

/// Collects commands from an optional script, given as its name and
/// contents, followed by the command-line arguments. Script commands are
/// labeled `name:line`, arguments `argument N`. If anything is malformed,
/// returns every malformed command and none of the good ones.
pub fn load_commands(
    script: Option<(&str, &str)>,
    arguments: &[String],
) -> Result<Vec<Command>, Vec<Malformed>> {
    let from_script = script.into_iter().flat_map(|(name, contents)| {
        parse_script(contents)
            .into_iter()
            .map(move |(line, result)| (format!("{}:{}", name, line), result))
    });
    let from_arguments = arguments
        .iter()
        .enumerate()
        .map(|(index, command)| (format!("argument {}", index + 1), Command::parse(command)));

    let mut commands = Vec::new();
    let mut malformed = Vec::new();
    for (position, result) in from_script.chain(from_arguments) {
        match result {
            Ok(command) => commands.push(command),
            Err(error) => malformed.push(Malformed { position, error }),
        }
    }
    if !malformed.is_empty() {
        return Err(malformed);
    }
    return Ok(commands);
}

/// Runs commands one by one, collecting their output.
pub fn run<'a>(
    gpio: &mut Gpio<SimulatedRegisters>,
    commands: impl IntoIterator<Item = &'a Command>,
) -> Vec<Output> {
    commands
        .into_iter()
        .filter_map(|command| command.execute(gpio))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpio::Port;

    fn run_lines(lines: &[&str]) -> (Vec<Output>, Gpio<SimulatedRegisters>) {
        let commands: Vec<Command> = lines
            .iter()
            .map(|line| Command::parse(line).unwrap())
            .collect();
        let mut gpio = Gpio::new(SimulatedRegisters::new());
        let outputs = run(&mut gpio, &commands);
        return (outputs, gpio);
    }

    #[test]
    fn parsing_numbers() {
        assert_eq!(parse_byte("85"), Ok(85));
        assert_eq!(parse_byte("0x55"), Ok(0x55));
        assert_eq!(parse_byte("0XaB"), Ok(0xAB));
        assert_eq!(parse_byte("$F0"), Ok(0xF0));
        assert_eq!(parse_byte("0b10100101"), Ok(0xA5));
        assert_eq!(
            parse_byte("256"),
            Err(CommandError::InvalidNumber("256".into()))
        );
        assert_eq!(
            parse_byte("0xZZ"),
            Err(CommandError::InvalidNumber("0xZZ".into()))
        );
    }

    #[test]
    fn parsing_commands() {
        assert_eq!(
            Command::parse("port-dir A 0xFF"),
            Ok(Command::PortDirection {
                port: 0,
                direction: 0xFF
            })
        );
        assert_eq!(
            Command::parse("  pin-dir   b 0x0F in "),
            Ok(Command::PinDirection {
                port: 1,
                mask: 0x0F,
                direction: Direction::Input
            })
        );
        assert_eq!(
            Command::parse("pin-write C 3 0xFF"),
            Ok(Command::PinWrite {
                port: 2,
                mask: 3,
                level: Level::High
            })
        );
        assert_eq!(
            Command::parse("nibble-read upper D"),
            Ok(Command::NibbleRead {
                nibble: Nibble::Upper,
                port: 3
            })
        );
        assert_eq!(
            Command::parse("port-write 7 1"),
            Ok(Command::PortWrite { port: 7, value: 1 })
        );
        assert_eq!(Command::parse("delay 250"), Ok(Command::Delay { ms: 250 }));
        assert_eq!(Command::parse("dump"), Ok(Command::Dump));
    }

    #[test]
    fn parsing_errors() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("port-explode A"),
            Err(CommandError::UnknownCommand("port-explode".into()))
        );
        assert_eq!(
            Command::parse("port-write A"),
            Err(CommandError::MissingArgument {
                command: "port-write".into(),
                argument: "value"
            })
        );
        assert_eq!(
            Command::parse("port-toggle A B"),
            Err(CommandError::UnexpectedArgument {
                command: "port-toggle".into(),
                argument: "B".into()
            })
        );
        assert_eq!(
            Command::parse("port-read E"),
            Err(CommandError::InvalidPort("E".into()))
        );
        assert_eq!(
            Command::parse("pin-dir A 1 sideways"),
            Err(CommandError::InvalidDirection("sideways".into()))
        );
        assert_eq!(
            Command::parse("nibble-toggle middle A"),
            Err(CommandError::InvalidNibble("middle".into()))
        );
        assert_eq!(
            CommandError::MissingArgument {
                command: "pin-read".into(),
                argument: "index"
            }
            .to_string(),
            "Missing argument of pin-read: index"
        );
    }

    #[test]
    fn toggling_scenario() {
        let (outputs, gpio) = run_lines(&[
            "port-dir A 0xFF",
            "port-write A 0x55",
            "port-toggle A",
            "port-read A",
        ]);
        assert_eq!(outputs, [Output::Byte(0xAA)]);
        assert_eq!(gpio.registers().direction(Port::A), 0xFF);
    }

    #[test]
    fn reads_and_formatting() {
        let (outputs, _) = run_lines(&[
            "port-write B 0b10010110",
            "pin-read B 1",
            "pin-read B 0",
            "nibble-read upper B",
            "nibble-read lower B",
            "port-read 9",
        ]);
        itertools::assert_equal(
            outputs.iter().map(|output| output.to_string()),
            ["$01", "$00", "$90", "$06", "$00"],
        );
    }

    #[test]
    fn invalid_ports_change_nothing() {
        let (outputs, gpio) = run_lines(&[
            "port-dir 4 0xFF",
            "pin-write 5 0xFF high",
            "nibble-toggle lower 200",
            "dump",
        ]);
        assert_eq!(gpio.registers(), &SimulatedRegisters::new());
        assert_eq!(outputs, [Output::Dump(SimulatedRegisters::new())]);
    }

    #[test]
    fn scripts() {
        let script = "# Blink setup\n\
                      port-dir A out\n\
                      \n\
                      pin-dir A 0x0F in\n\
                      bogus\n";
        let parsed = parse_script(script);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0, 2);
        assert_eq!(
            parsed[0].1,
            Err(CommandError::InvalidNumber("out".into()))
        );
        assert_eq!(
            parsed[1],
            (
                4,
                Ok(Command::PinDirection {
                    port: 0,
                    mask: 0x0F,
                    direction: Direction::Input
                })
            )
        );
        assert_eq!(
            parsed[2],
            (5, Err(CommandError::UnknownCommand("bogus".into())))
        );
    }

    fn arguments(commands: &[&str]) -> Vec<String> {
        commands.iter().map(|command| command.to_string()).collect()
    }

    #[test]
    fn loading_puts_script_first() {
        let commands = load_commands(
            Some(("setup.gpio", "port-dir A 0xFF\n# comment\nport-write A 1\n")),
            &arguments(&["port-toggle A", "port-read A"]),
        )
        .unwrap();
        assert_eq!(
            commands,
            [
                Command::PortDirection {
                    port: 0,
                    direction: 0xFF
                },
                Command::PortWrite { port: 0, value: 1 },
                Command::PortToggle { port: 0 },
                Command::PortRead { port: 0 },
            ]
        );
        assert_eq!(
            load_commands(None, &arguments(&["dump"])),
            Ok(vec![Command::Dump])
        );
    }

    #[test]
    fn loading_reports_every_malformed_command() {
        let result = load_commands(
            Some(("setup.gpio", "port-write A 1\n\nport-write Q 1\n")),
            &arguments(&["port-read A", "pin-read A", "dump"]),
        );
        let malformed = result.unwrap_err();
        assert_eq!(
            malformed,
            [
                Malformed {
                    position: "setup.gpio:3".into(),
                    error: CommandError::InvalidPort("Q".into()),
                },
                Malformed {
                    position: "argument 2".into(),
                    error: CommandError::MissingArgument {
                        command: "pin-read".into(),
                        argument: "index"
                    },
                },
            ]
        );
        assert_eq!(malformed[0].to_string(), "setup.gpio:3: Invalid port: Q");
    }

    #[test]
    fn malformed_commands_leave_registers_alone() {
        let mut gpio = Gpio::new(SimulatedRegisters::new());
        let script = Some(("setup.gpio", "port-write A 0xFF\n"));
        if let Ok(commands) = load_commands(script, &arguments(&["port-toggle"])) {
            run(&mut gpio, &commands);
        }
        assert_eq!(gpio.registers(), &SimulatedRegisters::new());
    }

    #[test]
    fn initial_register_values() {
        let init = parse_byte("0xA5").unwrap();
        let mut gpio = Gpio::new(SimulatedRegisters::initialized_with(init));
        let commands =
            load_commands(None, &arguments(&["port-read C", "port-toggle C"])).unwrap();
        assert_eq!(run(&mut gpio, &commands), [Output::Byte(0xA5)]);
        assert_eq!(gpio.registers().data(Port::C), 0x5A);
        assert_eq!(gpio.registers().direction(Port::C), 0xA5);
        assert_eq!(gpio.registers().data(Port::D), 0xA5);
    }
}
