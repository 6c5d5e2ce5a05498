use smol_str::SmolStr;

use crate::constants::{DEFAULT_INDENT, MAX_DEPTH};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
    Tab,
    Custom(SmolStr),
}

impl Indent {
    pub fn spaces(count: usize) -> Self {
        Indent::Spaces(count)
    }

    /// The text written once per depth level.
    pub fn unit(&self) -> SmolStr {
        match self {
            Indent::Spaces(count) => SmolStr::new(" ".repeat(*count)),
            Indent::Tab => SmolStr::new_static("\t"),
            Indent::Custom(unit) => unit.clone(),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(DEFAULT_INDENT.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub indent: Indent,
    pub trailing_newline: bool,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            trailing_newline: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Deepest child block nesting accepted before the parse fails.
    pub max_depth: usize,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}
