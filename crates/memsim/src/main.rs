use std::{
    fs::File,
    io::{self, BufReader, IsTerminal as _},
    path::PathBuf,
    process,
};

use ansi_term::Palette;
use argh::FromArgs;
use memsim::{
    command::Command,
    log,
    shell::{Flow, Input, Shell},
};
use snafu::ResultExt as _;
use snafu_utils::{GenericError, Report};
use tracing::info;

/// Simulate contiguous memory allocation with first, best and worst fit.
#[derive(Debug, FromArgs)]
struct Args {
    /// initialize the arena with this many units before reading commands
    #[argh(option, short = 's')]
    size: Option<usize>,

    /// run the commands in this file before reading standard input
    #[argh(option)]
    script: Option<PathBuf>,

    /// exit after the script instead of reading standard input
    #[argh(switch)]
    batch: bool,

    /// disable colored output
    #[argh(switch)]
    no_color: bool,

    /// log filter directives (overrides RUST_LOG), e.g. `memsim_core=debug`
    #[argh(option)]
    log_level: Option<String>,
}

fn main() {
    let args: Args = argh::from_env();
    let stdout = io::stdout();
    let palette = Palette::new(!args.no_color && stdout.is_terminal());

    if let Err(err) = run(&args, palette) {
        let report = Report::new(err).with_palette(palette);
        eprintln!("{report}");
        process::exit(1);
    }
}

fn run(args: &Args, palette: Palette) -> Result<(), GenericError> {
    log::init(args.log_level.as_deref(), palette.is_enabled())?;

    let mut shell = Shell::new(io::stdout().lock(), palette);

    if let Some(size) = args.size {
        shell.execute(Command::Init { size })?;
    }

    if let Some(path) = &args.script {
        info!(path = %path.display(), "running script");
        let file = File::open(path)
            .with_whatever_context(|_| format!("failed to open script, path={}", path.display()))?;
        let flow = shell
            .run(BufReader::new(file), Input::Script)
            .with_whatever_context(|_| format!("failed to run script, path={}", path.display()))?;
        if flow == Flow::Exit || args.batch {
            return Ok(());
        }
    }

    let stdin = io::stdin();
    let mode = if stdin.is_terminal() {
        Input::Interactive
    } else {
        Input::Piped
    };
    shell.run(stdin.lock(), mode)?;
    Ok(())
}
