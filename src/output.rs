use crate::cli::Cli;
use crate::stream::SAMPLE_RATE;
use indicatif::{ProgressBar, ProgressStyle};

pub fn sample_time(samples: u64) -> String {
    let seconds = samples / SAMPLE_RATE;
    format!(
        "{}:{:02} ({} sample{})",
        seconds / 60,
        seconds % 60,
        samples,
        if samples == 1 { "" } else { "s" }
    )
}

#[derive(Debug)]
pub struct Output {
    pub progress_bar: Option<ProgressBar>,
}

impl Output {
    /// Progress is only shown when the number of input frames is known.
    pub fn new(args: &Cli, num_frames: Option<u64>) -> Self {
        let progress_bar = match num_frames {
            Some(n) if !args.no_progress => Some(ProgressBar::new(n)),
            _ => None,
        };

        if let Some(pb) = &progress_bar {
            if let Ok(style) = ProgressStyle::with_template(
                "[{elapsed_precise}] [{wide_bar:.yellow/green}] {percent_precise}% ({pos}/{len})",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
        }

        Self { progress_bar }
    }

    pub fn hidden() -> Self {
        Self { progress_bar: None }
    }

    pub fn inc(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_seconds_and_samples() {
        assert_eq!(sample_time(0), "0:00 (0 samples)");
        assert_eq!(sample_time(1), "0:00 (1 sample)");
        assert_eq!(sample_time(SAMPLE_RATE * 61 + 5), "1:01 (2690105 samples)");
    }
}
