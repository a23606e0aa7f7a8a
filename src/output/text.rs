use crate::audit::{AuditReport, Finding, Severity};

use super::{ColorMode, ansi};

/// Human-readable lines for findings and the end-of-run report.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    #[must_use]
    pub fn new(mode: ColorMode) -> Self {
        Self::with_colors(mode.use_colors())
    }

    #[must_use]
    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// `⚠ [post] content/posts title: message`
    #[must_use]
    pub fn format_finding(&self, finding: &Finding) -> String {
        let (icon, color) = match finding.severity {
            Severity::Warning => ("⚠", ansi::YELLOW),
            Severity::Error => ("✖", ansi::RED),
        };
        let location = match &finding.field {
            Some(field) => format!("{} {field}", finding.path.display()),
            None => finding.path.display().to_string(),
        };

        if self.use_colors {
            format!(
                "{color}{icon}{} [{}] {}{location}{}: {}",
                ansi::RESET,
                finding.collection,
                ansi::BOLD,
                ansi::RESET,
                finding.message
            )
        } else {
            format!(
                "{icon} [{}] {location}: {}",
                finding.collection, finding.message
            )
        }
    }

    /// Final disposition: the worst severity reached, or the abort notice.
    #[must_use]
    pub fn format_status(&self, report: &AuditReport) -> String {
        if report.aborted {
            return self.paint(ansi::YELLOW, "⚠️ Audit not complete");
        }
        if report.outcome.error {
            if self.use_colors {
                return format!(
                    "{red}‼️ Audit {bold}failed{reset}{red} with errors{reset}",
                    red = ansi::RED,
                    bold = ansi::BOLD,
                    reset = ansi::RESET
                );
            }
            return "‼️ Audit failed with errors".to_string();
        }
        if report.outcome.warning {
            return self.paint(ansi::YELLOW, "⚠️ Audit passed with warnings");
        }
        self.paint(ansi::GREEN, "✅ Audit passed")
    }

    /// Counts line, plus how many documents a save changes.
    #[must_use]
    pub fn format_summary(&self, report: &AuditReport) -> Vec<String> {
        let summary = &report.summary;
        let mut lines = vec![format!(
            "Audited {} {} in {} {}",
            summary.documents,
            plural(summary.documents, "document"),
            summary.collections,
            plural(summary.collections, "collection")
        )];

        if summary.rewrites > 0 {
            let noun = plural(summary.rewrites, "document");
            let line = if report.options.clean {
                format!("{} {noun} rewritten", summary.rewrites)
            } else {
                format!(
                    "{} {noun} would be rewritten by `--clean`",
                    summary.rewrites
                )
            };
            lines.push(self.paint(ansi::CYAN, &line));
        }
        lines
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{}", ansi::RESET)
        } else {
            text.to_string()
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
