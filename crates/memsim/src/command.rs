//! Parsing of shell input lines into commands.

use core::{num::ParseIntError, str::FromStr};

use snafu::{OptionExt as _, ResultExt as _, Snafu, ensure};
use snafu_utils::Location;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init { size: usize },
    Alloc { size: usize, algorithm: String },
    Free { id: u64 },
    Choose { size: usize, algorithm: String },
    Show,
    Stats,
    Owner { address: usize },
    Help,
    Exit,
}

pub struct CommandHelp {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "init",
        aliases: &[],
        usage: "init <size>",
        summary: "create the arena with a single free block",
    },
    CommandHelp {
        name: "alloc",
        aliases: &[],
        usage: "alloc <size> <first|best|worst>",
        summary: "allocate a block with the given placement algorithm",
    },
    CommandHelp {
        name: "free_id",
        aliases: &["free"],
        usage: "free_id <id>",
        summary: "free an allocated block by id",
    },
    CommandHelp {
        name: "choose_block",
        aliases: &["choose"],
        usage: "choose_block <size> <first|best|worst>",
        summary: "show which free block an allocation would use",
    },
    CommandHelp {
        name: "show",
        aliases: &[],
        usage: "show",
        summary: "print occupancy and block id maps",
    },
    CommandHelp {
        name: "stats",
        aliases: &[],
        usage: "stats",
        summary: "print usage and fragmentation statistics",
    },
    CommandHelp {
        name: "owner",
        aliases: &[],
        usage: "owner <address>",
        summary: "print the block owning an address",
    },
    CommandHelp {
        name: "help",
        aliases: &["?"],
        usage: "help",
        summary: "list commands",
    },
    CommandHelp {
        name: "exit",
        aliases: &["quit"],
        usage: "exit",
        summary: "leave the simulator",
    },
];

fn lookup(name: &str) -> Option<&'static CommandHelp> {
    COMMANDS
        .iter()
        .find(|c| c.name == name || c.aliases.contains(&name))
}

#[derive(Debug, Snafu)]
pub enum ParseCommandError {
    #[snafu(display("unknown command `{name}` (type `help` for a list)"))]
    UnknownCommand {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("wrong number of arguments, usage: {usage}"))]
    Arity {
        usage: &'static str,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("invalid <{argument}> `{value}`: {source}"))]
    InvalidNumber {
        argument: &'static str,
        value: String,
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        source: ParseIntError,
    },
}

fn number<T>(argument: &'static str, value: &str) -> Result<T, ParseCommandError>
where
    T: FromStr<Err = ParseIntError>,
{
    value
        .parse()
        .context(InvalidNumberSnafu { argument, value })
}

impl Command {
    /// Parses one input line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseCommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args = words.collect::<Vec<_>>();
        let help = lookup(&name.to_ascii_lowercase()).context(UnknownCommandSnafu { name })?;

        let arity = match help.name {
            "init" | "free_id" | "owner" => 1,
            "alloc" | "choose_block" => 2,
            _ => 0,
        };
        ensure!(args.len() == arity, AritySnafu { usage: help.usage });

        let command = match help.name {
            "init" => Self::Init {
                size: number("size", args[0])?,
            },
            "alloc" => Self::Alloc {
                size: number("size", args[0])?,
                algorithm: args[1].to_owned(),
            },
            "free_id" => Self::Free {
                id: number("id", args[0])?,
            },
            "choose_block" => Self::Choose {
                size: number("size", args[0])?,
                algorithm: args[1].to_owned(),
            },
            "show" => Self::Show,
            "stats" => Self::Stats,
            "owner" => Self::Owner {
                address: number("address", args[0])?,
            },
            "help" => Self::Help,
            "exit" => Self::Exit,
            name => unreachable!("command table entry `{name}` has no parser"),
        };
        Ok(Some(command))
    }
}
