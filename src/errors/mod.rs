use crate::span::Source;

use colored::*;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, io};

pub type SolverResult<T = ()> = Result<T, SolverError>;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SolverErrorKind {
    EmptyConjunction,
    Internal,
    Parse,
    IO,
}

impl fmt::Display for SolverErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SolverErrorKind::EmptyConjunction => "constraint error",
                SolverErrorKind::Internal => "internal solver error",
                SolverErrorKind::Parse => "parse error",
                SolverErrorKind::IO => "i/o error",
            }
        )
    }
}

/// A defect in how the solver was called or in the solver itself. Type errors
/// in the program being checked are reported as [`Diagnostic`]s instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolverError {
    pub msg: String,
    pub kind: SolverErrorKind,
}

impl SolverError {
    pub fn new<S: Into<String>>(kind: SolverErrorKind, msg: S) -> SolverError {
        SolverError {
            msg: msg.into(),
            kind,
        }
    }

    pub fn empty_conjunction() -> SolverError {
        SolverError::new(
            SolverErrorKind::EmptyConjunction,
            "a conjunction needs at least one constraint",
        )
    }

    pub fn internal<S: Into<String>>(msg: S) -> SolverError {
        SolverError::new(SolverErrorKind::Internal, msg)
    }

    pub fn parse<S: Into<String>>(msg: S) -> SolverError {
        SolverError::new(SolverErrorKind::Parse, msg)
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}

impl std::error::Error for SolverError {}

impl From<io::Error> for SolverError {
    fn from(err: io::Error) -> SolverError {
        SolverError::new(SolverErrorKind::IO, err.to_string())
    }
}

impl From<serde_json::Error> for SolverError {
    fn from(err: serde_json::Error) -> SolverError {
        SolverError::parse(err.to_string())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Info => "info",
            }
        )
    }
}

/// A located, human-readable report of a constraint that could not be satisfied
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub src: Source,
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.src, self.severity, self.message)
    }
}

const ELLIPSIS: &'static str = "...";

impl Diagnostic {
    pub fn error<S: Into<String>>(src: Source, message: S) -> Diagnostic {
        Diagnostic {
            src,
            message: message.into(),
            severity: Severity::Error,
        }
    }

    /// Prints the diagnostic with an excerpt of its source file to stderr. The
    /// excerpt is skipped when the file cannot be read.
    pub fn emit(&self) {
        let header = format!("{}:", self.severity);
        let header = match self.severity {
            Severity::Error => header.bold().red(),
            Severity::Warning => header.bold().yellow(),
            Severity::Info => header.bold().blue(),
        };
        eprintln!("{} {}", header, self.message.bold());

        let arrow = "-->".bold();
        let span = self.src.span;
        let contents = match fs::read_to_string(&self.src.filepath) {
            Ok(contents) => contents,
            Err(err) => {
                log::debug!("[emit] could not read {}: {}", self.src.filepath, err);
                eprintln!(" {} {}", arrow, self.src);
                eprintln!();
                return;
            }
        };

        let line_count = span.lines();
        let max_num_width = if line_count == 1 {
            (span.end.lineno + 1).to_string().len() + 1
        } else {
            ELLIPSIS.len() + 1
        };
        let full_spacing = " ".repeat(max_num_width);
        let pipe = "|".bold();

        eprintln!("{}{} {}", " ".repeat(max_num_width - 1), arrow, self.src);
        eprintln!("{}{}", full_spacing, pipe);

        let lines = contents.lines().skip(span.start.lineno).take(line_count);
        let red_slash = "/".bold().red();
        let red_pipe = "|".bold().red();
        for (i, line) in lines.enumerate() {
            let lineno_str = (span.start.lineno + i + 1).to_string();
            let spacing = " ".repeat(max_num_width.saturating_sub(lineno_str.len()));
            if line_count == 1 {
                eprintln!("{}{}{} {}", lineno_str.bold(), spacing, pipe, line);
                let indent = " ".repeat(span.start.col);
                let indicator = "^".repeat(span.width()).bold().red();
                eprintln!("{}{} {}{}", full_spacing, pipe, indent, indicator);
                break;
            }

            if line_count > 3 && i > 1 && i < line_count - 2 {
                if i == 2 {
                    eprintln!("{} {} {} {}", ELLIPSIS.bold(), pipe, red_pipe, ELLIPSIS);
                }
                continue;
            }

            let prefix = if i == 0 { &red_slash } else { &red_pipe };
            eprintln!("{}{}{} {} {}", lineno_str.bold(), spacing, pipe, prefix, line);
        }

        if line_count > 1 {
            let indent = "_".repeat(span.end.col + 1).bold().red();
            eprintln!("{}{} {}{}{}", full_spacing, pipe, red_pipe, indent, "^".bold().red());
        }
        eprintln!()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn displays_location_and_message() {
        let diag = Diagnostic::error(
            Source::new("start.yarn", Span::at(2, 4, 6)),
            "`Number` and `String` can't be unified",
        );
        assert_eq!(
            diag.to_string(),
            "start.yarn:3:5: error: `Number` and `String` can't be unified"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: SolverError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind, SolverErrorKind::IO);
        assert_eq!(err.to_string(), "i/o error: gone");
    }
}
