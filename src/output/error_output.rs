//! Fatal error and operator warning output on stderr.
//!
//! Format: `✖ {Type}: {message}` / `  × {detail}` / `  help: {suggestion}`.

use std::io::Write;

use crate::error::TinaError;

use super::ColorMode;
use super::ansi;

pub struct ErrorOutput {
    use_colors: bool,
}

impl ErrorOutput {
    #[must_use]
    pub fn new(mode: ColorMode) -> Self {
        Self {
            use_colors: mode.use_colors(),
        }
    }

    #[must_use]
    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Print a fatal error with its classification and suggestion.
    pub fn print_error(&self, error: &TinaError) {
        let mut stderr = std::io::stderr().lock();
        self.write_error(&mut stderr, error);
    }

    pub fn print_warning(&self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        self.write_warning(&mut stderr, message);
    }

    /// Writes `error` to `w`.
    ///
    /// The source chain is listed as detail lines.
    pub fn write_error<W: Write>(&self, w: &mut W, error: &TinaError) {
        // Write failures on stderr are not recoverable; ignore them.
        let error_type = error.error_type();
        if self.use_colors {
            let _ = writeln!(
                w,
                "{}{}✖ {error_type}:{} {error}",
                ansi::BOLD,
                ansi::RED,
                ansi::RESET
            );
        } else {
            let _ = writeln!(w, "✖ {error_type}: {error}");
        }

        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            if self.use_colors {
                let _ = writeln!(w, "  {}× {cause}{}", ansi::DIM, ansi::RESET);
            } else {
                let _ = writeln!(w, "  × {cause}");
            }
            source = cause.source();
        }

        if let Some(suggestion) = error.suggestion() {
            if self.use_colors {
                let _ = writeln!(w, "  {}help:{} {suggestion}", ansi::CYAN, ansi::RESET);
            } else {
                let _ = writeln!(w, "  help: {suggestion}");
            }
        }
    }

    pub fn write_warning<W: Write>(&self, w: &mut W, message: &str) {
        if self.use_colors {
            let _ = writeln!(w, "{}{message}{}", ansi::YELLOW, ansi::RESET);
        } else {
            let _ = writeln!(w, "{message}");
        }
    }
}

impl Default for ErrorOutput {
    fn default() -> Self {
        Self::new(ColorMode::Auto)
    }
}

#[cfg(test)]
#[path = "error_output_tests.rs"]
mod tests;
