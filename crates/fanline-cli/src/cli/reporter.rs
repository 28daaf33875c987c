use fanline::{Error, Report, Reporter};
use std::io::{self, Write};

/// Writes the final report to stdout and fatal errors to the log.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    json: bool,
}

impl ConsoleReporter {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    fn render(&self, report: &Report) -> serde_json::Result<String> {
        if self.json {
            serde_json::to_string(report)
        } else {
            Ok(report.to_string())
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, report: &Report) {
        match self.render(report) {
            Ok(text) => {
                let mut out = io::stdout().lock();
                if let Err(e) = writeln!(out, "{text}") {
                    tracing::warn!("Failed to write report: {e}");
                }
            }
            Err(e) => tracing::error!("Failed to serialize report: {e}"),
        }
    }

    fn fatal(&self, error: &Error) {
        tracing::error!("Fatal: {error}");
    }
}
