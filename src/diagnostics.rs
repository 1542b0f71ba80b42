//! Diagnostic records
//!
//! The compiler never prints. Everything worth telling the user becomes a [`Diagnostic`] that
//! the caller renders: the CLI through `tracing`, the language server as LSP diagnostics.

use crate::line::{format_line_with_prefix, Line};
use std::fmt;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Warn,
    Err,
}

/// Something the compiler reports about a program
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    UnknownRequire { name: String },
    UnknownCompilerConst { name: String, line: Line },
    IfConditionNotBoolean { condition: String, line: Line },
    /// A line failed to compile and was skipped
    LineFailed { message: String, line: Line },
    UnclosedBlock { block: String, line: Line },
    /// The source of a compiled line matches no overload, so type hints are lost
    InvalidUncompiledLine { compiled: String, line: Line },
    VariableConflictingTypes {
        name: String,
        types: Vec<String>,
        first: Line,
        conflicting: Line,
    },
    VariableUndefined { name: String, line: Line },
    VariableTypeMismatch {
        name: String,
        found: String,
        expected: Vec<String>,
        line: Line,
        definition: Line,
    },
    JumpLabelRedefined { label: String, definitions: Vec<Line> },
    JumpLabelMissing { label: String, usages: Vec<Line> },
    ProgramTooLong { length: usize },
    BlankLineGenerated { line: Line },
    CannotPortInvalidLine { line: Line },
    LineInvalid { line: String },
}

impl Diagnostic {
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::LineFailed { .. }
            | Diagnostic::UnclosedBlock { .. }
            | Diagnostic::InvalidUncompiledLine { .. }
            | Diagnostic::ProgramTooLong { .. }
            | Diagnostic::LineInvalid { .. } => Level::Err,
            _ => Level::Warn,
        }
    }

    /// The source line the diagnostic is about, when there is exactly one
    pub fn line(&self) -> Option<&Line> {
        match self {
            Diagnostic::UnknownCompilerConst { line, .. }
            | Diagnostic::IfConditionNotBoolean { line, .. }
            | Diagnostic::LineFailed { line, .. }
            | Diagnostic::UnclosedBlock { line, .. }
            | Diagnostic::InvalidUncompiledLine { line, .. }
            | Diagnostic::VariableUndefined { line, .. }
            | Diagnostic::VariableTypeMismatch { line, .. }
            | Diagnostic::BlankLineGenerated { line }
            | Diagnostic::CannotPortInvalidLine { line } => Some(line),
            Diagnostic::VariableConflictingTypes { conflicting, .. } => Some(conflicting),
            _ => None,
        }
    }

    /// Every source line the diagnostic mentions
    pub fn lines(&self) -> Vec<&Line> {
        match self {
            Diagnostic::JumpLabelRedefined { definitions, .. } => definitions.iter().collect(),
            Diagnostic::JumpLabelMissing { usages, .. } => usages.iter().collect(),
            _ => self.line().into_iter().collect(),
        }
    }
}

fn write_lines(f: &mut fmt::Formatter<'_>, lines: &[Line]) -> fmt::Result {
    for line in lines {
        write!(f, "\n{}", format_line_with_prefix(line, ""))?;
    }
    Ok(())
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownRequire { name } => write!(f, "Unknown require {}", name),
            Diagnostic::UnknownCompilerConst { name, .. } => write!(f, "Unknown compiler const \"{}\"", name),
            Diagnostic::IfConditionNotBoolean { condition, .. } => write!(
                f,
                "Condition in &if statement was \"{}\", expected true or false.",
                condition
            ),
            Diagnostic::LineFailed { message, line } => {
                write!(f, "{}\n{}", message, format_line_with_prefix(line, ""))
            }
            Diagnostic::UnclosedBlock { block, line } => {
                write!(f, "{} was not closed.\n{}", block, format_line_with_prefix(line, ""))
            }
            Diagnostic::InvalidUncompiledLine { compiled, line } => write!(
                f,
                "Tried to type check a line (`{}` => `{}`) with invalid uncompiled command definition. \
                 This may cause issues with type checking. This is an error with mlogx.",
                line.text, compiled
            ),
            Diagnostic::VariableConflictingTypes {
                name,
                types,
                first,
                conflicting,
            } => write!(
                f,
                "Variable \"{}\" was defined with {} different types. ([{}])\n\tFirst definition:\n{}\n\tFirst conflicting definition:\n{}",
                name,
                types.len(),
                types.join(", "),
                format_line_with_prefix(first, "\t\t"),
                format_line_with_prefix(conflicting, "\t\t")
            ),
            Diagnostic::VariableUndefined { name, line } => write!(
                f,
                "Variable \"{}\" seems to be undefined.\n{}",
                name,
                format_line_with_prefix(line, "")
            ),
            Diagnostic::VariableTypeMismatch {
                name,
                found,
                expected,
                line,
                definition,
            } => {
                let expected: Vec<String> = expected.iter().map(|t| format!("\"{}\"", t)).collect();
                write!(
                    f,
                    "Variable \"{}\" is of type \"{}\", but the command requires it to be of type {}\n{}\n\tFirst definition:\n{}",
                    name,
                    found,
                    expected.join(" or "),
                    format_line_with_prefix(line, ""),
                    format_line_with_prefix(definition, "\t\t")
                )
            }
            Diagnostic::JumpLabelRedefined { label, definitions } => {
                write!(f, "Jump label \"{}\" was defined {} times.", label, definitions.len())?;
                write_lines(f, definitions)
            }
            Diagnostic::JumpLabelMissing { label, usages } => {
                write!(f, "Jump label \"{}\" is missing.", label)?;
                write_lines(f, usages)
            }
            Diagnostic::ProgramTooLong { length } => write!(
                f,
                "Program length ({}) exceeded 999 lines. Running it in-game will silently fail.",
                length
            ),
            Diagnostic::BlankLineGenerated { line } => write!(
                f,
                "mlogx generated a blank line. This should not happen.\n{}",
                format_line_with_prefix(line, "")
            ),
            Diagnostic::CannotPortInvalidLine { line } => write!(
                f,
                "Line cannot be ported as it is not valid for any known command definition\n{}",
                format_line_with_prefix(line, "")
            ),
            Diagnostic::LineInvalid { line } => write!(f, "Line \"{}\" is invalid.", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let line = Line::new("print x", 2, "main.mlogx");
        let undefined = Diagnostic::VariableUndefined {
            name: "x".into(),
            line: line.clone(),
        };
        assert_eq!(undefined.to_string(), "Variable \"x\" seems to be undefined.\nat main.mlogx:2 `print x`");
        assert_eq!(undefined.level(), Level::Warn);
        assert_eq!(undefined.line(), Some(&line));
    }

    #[test]
    fn test_label_diagnostics_list_every_line() {
        let missing = Diagnostic::JumpLabelMissing {
            label: "loop".into(),
            usages: vec![Line::new("jump loop always", 1, "a"), Line::new("jump loop always", 5, "a")],
        };
        assert_eq!(missing.lines().len(), 2);
        assert_eq!(missing.to_string().lines().count(), 3);
        assert_eq!(missing.line(), None);
    }

    #[test]
    fn test_levels() {
        assert_eq!(Diagnostic::ProgramTooLong { length: 1000 }.level(), Level::Err);
        assert_eq!(Diagnostic::UnknownRequire { name: "x".into() }.level(), Level::Warn);
        assert!(Level::Err > Level::Warn);
    }
}
