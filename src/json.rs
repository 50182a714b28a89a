use anyhow::Context;
use serde_json::{Value, json, to_string_pretty};
use tracing::info;

use crate::{cli::Cli, stream::SAMPLE_RATE, transport::RunSummary};

pub fn report(summary: &RunSummary) -> Value {
    json!({
        "run": summary,
        "sampleRate": SAMPLE_RATE,
        "songLength": summary.song_length_frames as f64 / SAMPLE_RATE as f64,
    })
}

pub fn write_json(args: &Cli, summary: &RunSummary) -> anyhow::Result<()> {
    let Some(path) = args.json.as_ref() else {
        return Ok(());
    };

    std::fs::write(path, to_string_pretty(&report(summary))?)
        .with_context(|| format!("writing JSON output to {}", path.display()))?;

    info!("Wrote JSON output to {}", path.display());
    Ok(())
}
