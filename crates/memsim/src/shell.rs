//! The read-eval-print loop.

use core::iter;
use std::io::{BufRead, Write};

use ansi_term::{Color, Palette};
use memsim_core::{BlockId, Engine, EngineError, Stats};
use snafu::ResultExt as _;
use snafu_utils::GenericError;
use tracing::debug;

use crate::command::{COMMANDS, Command};

pub const PROMPT: &str = "memsim > ";

/// Where input lines come from, which decides what is echoed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A terminal: print the prompt before every line.
    Interactive,
    /// A command file: echo every command after the prompt.
    Script,
    /// A pipe: no prompt, no echo.
    Piped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct Shell<W> {
    engine: Engine,
    out: W,
    palette: Palette,
}

impl<W> Shell<W>
where
    W: Write,
{
    pub fn new(out: W, palette: Palette) -> Self {
        Self {
            engine: Engine::new(),
            out,
            palette,
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Reads and executes commands until `exit` or end of input.
    pub fn run<R>(&mut self, mut input: R, mode: Input) -> Result<Flow, GenericError>
    where
        R: BufRead,
    {
        let mut line = String::new();
        loop {
            if mode == Input::Interactive {
                write!(self.out, "{}", self.palette.paint(Color::Cyan, PROMPT))
                    .and_then(|()| self.out.flush())
                    .whatever_context("failed to write prompt")?;
            }

            line.clear();
            let n = input
                .read_line(&mut line)
                .whatever_context("failed to read command")?;
            if n == 0 {
                if mode == Input::Interactive {
                    writeln!(self.out).whatever_context("failed to write output")?;
                }
                return Ok(Flow::Continue);
            }

            if mode == Input::Script && !line.trim().is_empty() {
                write!(self.out, "{PROMPT}{line}").whatever_context("failed to write output")?;
                if !line.ends_with('\n') {
                    writeln!(self.out).whatever_context("failed to write output")?;
                }
            }

            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(err) => {
                    self.error(&err)?;
                    continue;
                }
            };
            if self.execute(command)? == Flow::Exit {
                return Ok(Flow::Exit);
            }
        }
    }

    /// Executes one command, printing its result or the engine error.
    pub fn execute(&mut self, command: Command) -> Result<Flow, GenericError> {
        debug!(?command, "executing command");
        let result = match command {
            Command::Init { size } => self.engine.init(size).map(|r| r.to_string()),
            Command::Alloc { size, algorithm } => self
                .engine
                .alloc(size, algorithm.as_str())
                .map(|r| r.to_string()),
            Command::Free { id } => self.engine.free(BlockId::new(id)).map(|r| r.to_string()),
            Command::Choose { size, algorithm } => self
                .engine
                .choose_block(size, algorithm.as_str())
                .map(|r| r.to_string()),
            Command::Show => self.engine.show().map(|view| view.to_string()),
            Command::Stats => self.stats(),
            Command::Owner { address } => self.engine.owner_of(address).map(|owner| match owner {
                Some(id) => format!("address {address}: block {id}"),
                None => format!("address {address}: free"),
            }),
            Command::Help => Ok(help()),
            Command::Exit => return Ok(Flow::Exit),
        };

        match result {
            Ok(message) => {
                writeln!(self.out, "{message}").whatever_context("failed to write output")?;
            }
            Err(err) => self.engine_error(&err)?,
        }
        Ok(Flow::Continue)
    }

    fn stats(&self) -> Result<String, EngineError> {
        let Stats {
            total_size,
            allocated,
            free,
            internal_fragmentation,
            external_fragmentation,
            largest_free_block,
            allocated_blocks,
        } = self.engine.stats()?;

        let mut s = format!(
            "total size:             {total_size}\n\
             allocated:              {allocated} ({allocated_blocks} blocks)\n\
             free:                   {free} (largest block {largest_free_block})\n\
             internal fragmentation: {internal_fragmentation}\n\
             external fragmentation: {external_fragmentation} free blocks\n\
             active blocks:"
        );
        let active = self.engine.blocks()?.iter().filter_map(|b| {
            b.id().map(|id| format!("\n  [id={id}] @{} +{}", b.start(), b.size()))
        });
        s.extend(active);
        Ok(s)
    }

    fn engine_error(&mut self, err: &EngineError) -> Result<(), GenericError> {
        debug!(kind = %err.kind(), location = %err.location(), "engine operation failed");
        self.error(err)
    }

    fn error(&mut self, err: &dyn core::error::Error) -> Result<(), GenericError> {
        writeln!(self.out, "{}: {err}", self.palette.paint(Color::Red, "Error"))
            .whatever_context("failed to write output")
    }
}

fn help() -> String {
    let width = COMMANDS.iter().map(|c| c.usage.len()).max().unwrap_or(0);
    let lines = COMMANDS.iter().map(|c| {
        let aliases = if c.aliases.is_empty() {
            String::new()
        } else {
            format!(" (alias: {})", c.aliases.join(", "))
        };
        format!("\n  {:width$}  {}{aliases}", c.usage, c.summary)
    });
    iter::once("commands:".to_owned()).chain(lines).collect()
}
