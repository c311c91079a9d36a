use crate::utils::format_size;

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent<'a> {
    Started {
        name: &'a str,
        total: u64,
    },
    Chunk {
        name: &'a str,
        bytes_so_far: u64,
        total: u64,
        percent: f64,
    },
    Finished {
        name: &'a str,
        bytes: u64,
    },
}

pub trait ProgressReporter {
    fn on_event(&mut self, event: ProgressEvent<'_>);
}

/// Share of `total` covered by `bytes_so_far`, capped at 100 since the size
/// announced by the server is not always exact.
pub fn percent(bytes_so_far: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (bytes_so_far as f64 / total as f64 * 100.0).min(100.0)
}

#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_event(&mut self, _event: ProgressEvent<'_>) {}
}

/// Logs progress through `tracing`, once per whole percent.
#[derive(Debug, Default)]
pub struct TracingReporter {
    last_whole_percent: Option<u8>,
}

impl ProgressReporter for TracingReporter {
    fn on_event(&mut self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::Started { name, total } => {
                self.last_whole_percent = None;
                tracing::info!(name, size = %format_size(total), "Downloading");
            }
            ProgressEvent::Chunk {
                name,
                bytes_so_far,
                total,
                percent,
            } => {
                let whole = percent.floor() as u8;
                if self.last_whole_percent != Some(whole) {
                    self.last_whole_percent = Some(whole);
                    tracing::debug!(
                        name,
                        "{:.2}% ({} of {})",
                        percent,
                        format_size(bytes_so_far),
                        format_size(total)
                    );
                }
            }
            ProgressEvent::Finished { name, bytes } => {
                tracing::info!(name, size = %format_size(bytes), "Downloaded");
            }
        }
    }
}
