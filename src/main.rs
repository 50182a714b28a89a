mod cli;
mod error;
mod json;
mod markers;
mod naming;
mod output;
mod states;
mod stream;
mod transport;

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::D8Error;
use output::{Output, sample_time};
use stream::{FRAME_SIZE, SampleSink, SampleSource};
use transport::{RunSummary, TransportController};

const ERR_FAILED: u8 = 1;
const ERR_OUTPUT_NAME: u8 = 2;

fn copy<R: Read, W: Write>(
    controller: &mut TransportController,
    source: &mut SampleSource<R>,
    inner: W,
    progress: &Output,
) -> error::Result<(RunSummary, W)> {
    let mut sink = SampleSink::new(inner);
    let summary = controller.run(source, &mut sink, progress)?;
    Ok((summary, sink.into_inner()?))
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let mut controller =
        TransportController::new(args.transport_options()).context("invalid options")?;

    let (input, num_frames): (Box<dyn Read>, Option<u64>) = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening input {}", path.display()))?;
            let num_frames = file.metadata().ok().map(|m| m.len() / FRAME_SIZE as u64);
            (Box::new(file), num_frames)
        }
        None => (Box::new(io::stdin().lock()), None),
    };
    let progress = Output::new(args, num_frames);
    let mut source = SampleSource::new(input);

    let summary = if args.song_filename {
        let dir = Path::new(".");
        let temp = naming::temp_output(dir)?;
        let (summary, temp) = copy(&mut controller, &mut source, temp, &progress)?;
        if !args.name_only {
            let song_name = summary.song_name_bytes.as_deref();
            let path = naming::persist_as_song(temp, dir, song_name, args.cut)?;
            info!("Will use output file name {}", path.display());
        }
        summary
    } else if let Some(path) = &args.output {
        let file = naming::create_exclusive(path)?;
        copy(&mut controller, &mut source, file, &progress)?.0
    } else {
        copy(&mut controller, &mut source, io::stdout().lock(), &progress)?.0
    };

    if args.name_only {
        if let Some(song_name) = &summary.song_name_bytes {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(song_name)
                .and_then(|()| stdout.write_all(b"\n"))
                .context("writing song name")?;
        }
        return Ok(());
    }

    info!(
        "Read {} bytes, wrote {} bytes",
        summary.bytes_read, summary.bytes_written
    );
    info!(
        "Read {} samples, wrote {} samples",
        summary.frames_read, summary.frames_written
    );
    if summary.song_length_frames > 0 {
        info!("Song length is {}", sample_time(summary.song_length_frames));
    }

    json::write_json(args, &summary)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<D8Error>() {
        Some(
            D8Error::NoSongName
            | D8Error::NameCollision { .. }
            | D8Error::CheckOutput { .. }
            | D8Error::Rename { .. },
        ) => ERR_OUTPUT_NAME,
        _ => ERR_FAILED,
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let default_filter = if args.debug { "d8bup=debug" } else { "d8bup=info" };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
