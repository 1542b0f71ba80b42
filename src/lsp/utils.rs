//! Utility functions for LSP operations
//!
//! mlogx diagnostics point at whole lines, so positions only need line lookups and the word
//! under the cursor.

use ropey::Rope;
use tower_lsp::lsp_types::{Position, Range};

/// Line lookups over a document
#[derive(Debug, Clone)]
pub struct LineIndex {
    rope: Rope,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Text of a 0-indexed line without its line ending
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let text = self.rope.line(line).to_string();
        Some(text.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Range covering a 1-indexed source line, clamped to the document
    pub fn source_line_range(&self, line_number: usize) -> Range {
        let line = line_number.saturating_sub(1).min(self.rope.len_lines().saturating_sub(1));
        let width = self.line_text(line).map_or(0, |text| text.chars().count());
        Range {
            start: Position {
                line: line as u32,
                character: 0,
            },
            end: Position {
                line: line as u32,
                character: width as u32,
            },
        }
    }

    /// The argument under the cursor, with its range. Arguments are separated by spaces and
    /// semicolons.
    pub fn word_at(&self, position: Position) -> Option<(String, Range)> {
        let text = self.line_text(position.line as usize)?;
        let chars: Vec<char> = text.chars().collect();
        let cursor = (position.character as usize).min(chars.len());
        let is_word = |c: &char| !c.is_whitespace() && *c != ';';

        let start = chars[..cursor].iter().rposition(|c| !is_word(c)).map_or(0, |i| i + 1);
        let end = chars[cursor..].iter().position(|c| !is_word(c)).map_or(chars.len(), |i| cursor + i);
        if start >= end {
            return None;
        }
        let word: String = chars[start..end].iter().collect();
        let range = Range {
            start: Position {
                line: position.line,
                character: start as u32,
            },
            end: Position {
                line: position.line,
                character: end as u32,
            },
        };
        Some((word, range))
    }

    /// The partial word ending at the cursor
    pub fn prefix_at(&self, position: Position) -> String {
        let Some(text) = self.line_text(position.line as usize) else {
            return String::new();
        };
        let chars: Vec<char> = text.chars().collect();
        let cursor = (position.character as usize).min(chars.len());
        let start = chars[..cursor]
            .iter()
            .rposition(|c| c.is_whitespace() || *c == ';')
            .map_or(0, |i| i + 1);
        chars[start..cursor].iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_line_range() {
        let index = LineIndex::new("set x 5\nprint x\n");
        let range = index.source_line_range(2);
        assert_eq!(range.start, Position { line: 1, character: 0 });
        assert_eq!(range.end, Position { line: 1, character: 7 });

        // Past the end clamps to the last line
        assert_eq!(index.source_line_range(40).start.line, 2);
    }

    #[test]
    fn test_word_at() {
        let index = LineIndex::new("set x 5; print x");
        let (word, range) = index.word_at(Position { line: 0, character: 11 }).unwrap();
        assert_eq!(word, "print");
        assert_eq!(range.start.character, 9);
        assert_eq!(range.end.character, 14);
        assert!(index.word_at(Position { line: 3, character: 0 }).is_none());
    }

    #[test]
    fn test_prefix_at() {
        let index = LineIndex::new("  ucon");
        assert_eq!(index.prefix_at(Position { line: 0, character: 6 }), "ucon");
        assert_eq!(index.prefix_at(Position { line: 0, character: 2 }), "");
    }
}
