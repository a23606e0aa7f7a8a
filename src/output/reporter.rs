use std::io::Write;

use crate::audit::{AuditReport, AuditReporter, Finding, FindingSink};

use super::{AuditProgress, ColorMode, ErrorOutput, OutputFormat, TextFormatter};

/// Terminal side of an audit run: finding lines, progress and the final
/// status, all on stderr. JSON output is written by the caller to stdout.
pub struct Reporter {
    text: TextFormatter,
    warnings: ErrorOutput,
    format: OutputFormat,
    quiet: bool,
    progress: Option<AuditProgress>,
    out: Box<dyn Write>,
}

impl Reporter {
    #[must_use]
    pub fn new(color: ColorMode, format: OutputFormat, quiet: bool) -> Self {
        Self::with_writer(color, format, quiet, Box::new(std::io::stderr()))
    }

    #[must_use]
    pub fn with_writer(
        color: ColorMode,
        format: OutputFormat,
        quiet: bool,
        out: Box<dyn Write>,
    ) -> Self {
        let use_colors = color.use_colors();
        Self {
            text: TextFormatter::with_colors(use_colors),
            warnings: ErrorOutput::with_colors(use_colors),
            format,
            quiet,
            progress: None,
            out,
        }
    }

    const fn is_text(&self) -> bool {
        matches!(self.format, OutputFormat::Text)
    }

    fn emit(&mut self, line: &str) {
        let Self { progress, out, .. } = self;
        let mut write = || {
            let _ = writeln!(out, "{line}");
        };
        match progress {
            Some(progress) => progress.suspend(write),
            None => write(),
        }
    }
}

impl FindingSink for Reporter {
    fn record(&mut self, finding: Finding) {
        if self.is_text() && !self.quiet {
            let line = self.text.format_finding(&finding);
            self.emit(&line);
        }
    }

    fn begin_documents(&mut self, collection: &str, total: usize) {
        let hidden = self.quiet || !self.is_text();
        self.progress = Some(AuditProgress::new(
            collection,
            u64::try_from(total).unwrap_or(u64::MAX),
            hidden,
        ));
    }

    fn document_done(&mut self) {
        if let Some(progress) = &self.progress {
            progress.inc();
        }
    }

    fn end_documents(&mut self) {
        if let Some(progress) = self.progress.take() {
            progress.finish();
        }
    }
}

impl AuditReporter for Reporter {
    fn info(&mut self, message: &str) {
        if self.is_text() && !self.quiet {
            self.emit(message);
        }
    }

    fn warn(&mut self, message: &str) {
        self.warnings.write_warning(&mut self.out, message);
    }

    fn finish(&mut self, report: &AuditReport) {
        if !self.is_text() {
            return;
        }
        if !self.quiet && !report.aborted {
            for line in self.text.format_summary(report) {
                self.emit(&line);
            }
        }
        let status = self.text.format_status(report);
        self.emit(&status);
    }
}

#[cfg(test)]
#[path = "reporter_tests.rs"]
mod tests;
