use serde::{Deserialize, Serialize};

use super::Span;

#[derive(Clone, Debug, Default, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Source {
    pub filepath: String,
    #[serde(default)]
    pub span: Span,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.filepath.is_empty() {
            write!(f, "<unknown>:{}", self.span)
        } else {
            write!(f, "{}:{}", self.filepath, self.span)
        }
    }
}

impl Source {
    pub fn new<S: Into<String>>(filepath: S, span: Span) -> Source {
        Source {
            filepath: filepath.into(),
            span,
        }
    }
}
