use std::fmt;

use serde::{Deserialize, Serialize};

mod source;

pub use source::Source;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Pos {
    pub lineno: usize,
    pub col: usize,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn at(lineno: usize, col: usize, len: usize) -> Span {
        Span {
            start: Pos { lineno, col },
            end: Pos {
                lineno,
                col: col + len,
            },
        }
    }

    pub fn lines(&self) -> usize {
        (self.end.lineno.saturating_sub(self.start.lineno)) + 1
    }

    /// Number of columns covered by a single-line span
    pub fn width(&self) -> usize {
        if self.lines() == 1 {
            self.end.col.saturating_sub(self.start.col).max(1)
        } else {
            1
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.start)
    }
}

impl From<Pos> for Span {
    fn from(p: Pos) -> Span {
        Span { start: p, end: p }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.lineno + 1, self.col + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_one_based_positions() {
        let span = Span::at(0, 4, 3);
        assert_eq!(span.to_string(), "1:5");
        assert_eq!(span.width(), 3);
        assert_eq!(span.lines(), 1);
    }

    #[test]
    fn multiline_spans_have_unit_width() {
        let span = Span {
            start: Pos { lineno: 1, col: 2 },
            end: Pos { lineno: 3, col: 5 },
        };
        assert_eq!(span.lines(), 3);
        assert_eq!(span.width(), 1);
    }
}
