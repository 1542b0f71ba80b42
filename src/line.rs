//! Source line tracking
//!
//! mlogx is line oriented, so a "location" is a whole line of a file rather than a byte range.
//! Every emitted line keeps the line it was compiled from and the raw line it originally came
//! from, so diagnostics can point at the source even after several rewrite passes.

use std::fmt;

/// A line of source text with its position in a file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Line {
    /// The text of the line
    pub text: String,
    /// Line number (1-indexed, 0 for synthesized lines)
    pub line_number: usize,
    /// Name of the file the line came from
    pub source_filename: String,
}

impl Line {
    pub fn new(text: impl Into<String>, line_number: usize, source_filename: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line_number,
            source_filename: source_filename.into(),
        }
    }

    /// A line that does not come from a file, e.g. code injected by `#require`
    pub fn synthetic(label: &str) -> Self {
        Self::new(label, 0, label)
    }

    /// Same position, different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line_number: self.line_number,
            source_filename: self.source_filename.clone(),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source_filename, self.line_number)
    }
}

/// An emitted line together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledLine {
    /// The emitted target-language text
    pub text: String,
    /// The cleaned line (after constant substitution) that produced this output
    pub compiled_source: Line,
    /// The raw line from the file
    pub original_source: Line,
}

impl CompiledLine {
    pub fn new(text: impl Into<String>, compiled_source: Line, original_source: Line) -> Self {
        Self {
            text: text.into(),
            compiled_source,
            original_source,
        }
    }
}

/// Attach the same pair of source lines to every emitted line
pub fn add_sources_to_code(code: Vec<String>, compiled_source: &Line, original_source: &Line) -> Vec<CompiledLine> {
    code.into_iter()
        .map(|text| CompiledLine::new(text, compiled_source.clone(), original_source.clone()))
        .collect()
}

/// Format a line for diagnostics: `prefix` + `file:line` and the text, indented
pub fn format_line_with_prefix(line: &Line, prefix: &str) -> String {
    format!("{}at {}:{} `{}`", prefix, line.source_filename, line.line_number, line.text)
}
