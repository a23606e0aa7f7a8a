//! Yes/no confirmation before destructive actions.

use std::io::{BufRead, Write};

use crate::error::{Result, TinaError};

pub trait Confirm {
    /// Ask `message`; true only on an explicit yes.
    ///
    /// # Errors
    /// Returns an error if the question cannot be asked or answered.
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Asks on stderr and reads one line from stdin. End of input means no.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let stdin = std::io::stdin();
        let mut stderr = std::io::stderr().lock();
        ask(&mut stdin.lock(), &mut stderr, message)
    }
}

/// Confirms without asking, for non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        tracing::info!(question = message, "confirmed by --yes");
        Ok(true)
    }
}

/// Prompt on `output` and parse the answer read from `input`.
///
/// # Errors
/// Returns [`TinaError::Prompt`] if writing or reading fails.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, message: &str) -> Result<bool> {
    write!(output, "? {message} (y/N) ")
        .and_then(|()| output.flush())
        .map_err(|e| TinaError::Prompt(e.to_string()))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| TinaError::Prompt(e.to_string()))?;
    if read == 0 {
        let _ = writeln!(output);
        return Ok(false);
    }
    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn answer(input: &str) -> bool {
        let mut output = Vec::new();
        ask(&mut Cursor::new(input), &mut output, "Continue?").unwrap()
    }

    #[test]
    fn yes_answers_confirm() {
        assert!(answer("y\n"));
        assert!(answer("YES\n"));
        assert!(answer("  yes  \n"));
    }

    #[test]
    fn anything_else_declines() {
        assert!(!answer("n\n"));
        assert!(!answer("\n"));
        assert!(!answer("sure\n"));
    }

    #[test]
    fn assume_yes_always_confirms() {
        assert!(AssumeYes.confirm("Do you want to continue?").unwrap());
    }

    #[test]
    fn end_of_input_declines() {
        assert!(!answer(""));
    }

    #[test]
    fn question_is_written_to_output() {
        let mut output = Vec::new();
        ask(&mut Cursor::new("n\n"), &mut output, "Do you want to continue?").unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "? Do you want to continue? (y/N) ");
    }
}
