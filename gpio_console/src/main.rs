mod command;

use clap::Parser;
use command::parse_byte;
use gpio::{Gpio, SimulatedRegisters};
use std::path::PathBuf;
use std::process;

/// Runs GPIO driver commands against a simulated register file.
#[derive(Parser)]
#[clap(version, about)]
struct Args {
    /// Read commands from a file, one per line. They run before the commands
    /// given on the command line.
    #[clap(long)]
    script: Option<PathBuf>,

    /// Initial value of every register.
    #[clap(long, default_value = "0", parse(try_from_str = parse_byte))]
    init: u8,

    /// Print all registers after the last command.
    #[clap(long)]
    dump: bool,

    /// Commands, e.g. "port-dir A 0xFF" "port-write A 0x55" "port-read A".
    commands: Vec<String>,
}

fn main() {
    let args = Args::parse();

    let script = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(contents) => Some((path.display().to_string(), contents)),
            Err(e) => {
                eprintln!("ERROR: {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => None,
    };
    let script = script
        .as_ref()
        .map(|(name, contents)| (name.as_str(), contents.as_str()));

    let commands = match command::load_commands(script, &args.commands) {
        Ok(commands) => commands,
        Err(malformed) => {
            for entry in malformed {
                eprintln!("{}", entry);
            }
            eprintln!("ERROR: Malformed commands, nothing executed");
            process::exit(1);
        }
    };

    let mut gpio = Gpio::new(SimulatedRegisters::initialized_with(args.init));
    for output in command::run(&mut gpio, &commands) {
        println!("{}", output);
    }
    if args.dump {
        print!("{}", gpio.registers());
    }
}
