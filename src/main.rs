use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dgt_pgn::capture::DebugCapture;
use dgt_pgn::recorder::{Recorder, RecorderConfig};

/// Record games from a DGT board byte stream to PGN.
#[derive(Parser, Debug)]
#[command(name = "dgt_pgn", version, about = "Record games from a DGT board to PGN")]
struct Args {
    /// Raw board byte stream (captured serial output). Reads stdin when omitted.
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Filename prefix for PGN output.
    #[arg(short, long, default_value_t = default_prefix())]
    prefix: String,

    /// Leave `[%clk]` annotations out of the PGN.
    #[arg(long)]
    no_clock: bool,

    /// Bytes handed to the driver per read.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Capture raw transfers to `{prefix}.debug` and log board progress.
    #[arg(long)]
    debug: bool,
}

fn default_prefix() -> String {
    chrono::Local::now().format("%Y-%m-%d-%H%M%S").to_string()
}

fn main() {
    let args = Args::parse();
    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    let capture = if args.debug {
        match DebugCapture::create(&args.prefix) {
            Ok(capture) => Some(capture),
            Err(err) => {
                error!(path = %DebugCapture::path_for(&args.prefix).display(), %err, "cannot create capture file");
                process::exit(1);
            }
        }
    } else {
        None
    };

    let config = RecorderConfig {
        output_prefix: args.prefix,
        include_clock: !args.no_clock,
        chunk_size: args.chunk_size,
    };

    let input: Box<dyn Read> = match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(err) => {
                error!(path = %path.display(), %err, "cannot open input");
                process::exit(1);
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    // Commands for the board go to stdout, next to the captured stream.
    let mut recorder = Recorder::new(config, io::stdout());
    if let Some(capture) = capture {
        recorder = recorder.with_capture(capture);
    }
    let result = recorder.init_board().and_then(|()| recorder.run(input));
    match result {
        Ok(files) => info!(games = files.len(), "done"),
        Err(err) => {
            error!(%err, "recording failed");
            process::exit(1);
        }
    }
}
