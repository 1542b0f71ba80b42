//! Compiler error definitions
//!
//! [`CompileError`] stops compilation of a line or of a whole file; [`CommandError`] explains
//! why a line failed to match one particular overload and is only ever collected.

use crate::lexer::LexerError;
use std::fmt;
use thiserror::Error;

/// Result type for compilation steps
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that stop compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    /// The line matched none of the overloads of its command
    #[error("{message}")]
    NoMatchingOverload { message: String },

    /// A block directive's arguments were well formed but unusable
    #[error("{message}")]
    InvalidDirective { message: String },

    #[error("No block to end")]
    NoBlockToEnd,

    #[error("There were unclosed blocks.")]
    UnclosedBlocks { count: usize },

    #[error("Invalid type hint \"{hint}\": no such type")]
    InvalidTypeHint { hint: String },

    #[error("Type checking aborted because the program contains invalid commands.")]
    InvalidCommands { line: String },

    /// A replace rule produced a line the grammar rejects
    #[error("Line `{source_line}` compiled to invalid statement `{output}`. This is an error with mlogx.")]
    InvalidReplacement { source_line: String, output: String },

    #[error("Line `{line}` contains a jump label. This code is only meant for direct processor output.")]
    UnexpectedJumpLabel { line: String },
}

impl CompileError {
    pub fn no_matching_overload(message: impl Into<String>) -> Self {
        Self::NoMatchingOverload { message: message.into() }
    }

    pub fn invalid_directive(message: impl Into<String>) -> Self {
        Self::InvalidDirective { message: message.into() }
    }

    /// Fatal errors abort the whole file; the rest only abort the current line. A block
    /// opener that cannot open is fatal: its `}` has nothing to close.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompileError::NoBlockToEnd
                | CompileError::InvalidDirective { .. }
                | CompileError::UnclosedBlocks { .. }
                | CompileError::InvalidTypeHint { .. }
                | CompileError::InvalidCommands { .. }
                | CompileError::InvalidReplacement { .. }
                | CompileError::UnexpectedJumpLabel { .. }
        )
    }
}

/// Which overload check a line failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandErrorKind {
    /// The command name is unknown
    NoCommand,
    /// Wrong number of arguments for the overload
    ArgumentCount,
    /// A fixed sub-keyword did not match
    BadStructure,
    /// An argument has the wrong type
    Type,
}

/// Why a line does not match one overload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    pub kind: CommandErrorKind,
    pub message: String,
}

impl CommandError {
    pub fn new(kind: CommandErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn no_command(name: &str) -> Self {
        Self::new(CommandErrorKind::NoCommand, format!("Unknown command \"{}\"", name))
    }

    pub fn argument_count(name: &str) -> Self {
        Self::new(
            CommandErrorKind::ArgumentCount,
            format!("Incorrect number of arguments for command \"{}\", see `mlogx info {}`", name, name),
        )
    }

    pub fn bad_structure(found: &str, expected: &str) -> Self {
        Self::new(
            CommandErrorKind::BadStructure,
            format!("Incorrect argument: \"{}\" should be \"{}\"", found, expected),
        )
    }

    pub fn type_mismatch(value: &str, expected: &str, found: &str) -> Self {
        Self::new(
            CommandErrorKind::Type,
            format!(
                "Type mismatch: value \"{}\" was expected to be of type \"{}\", but was of type \"{}\"",
                value, expected, found
            ),
        )
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Build the error for a line that matched no overload.
///
/// A single error is reported as is. With several, verbose mode lists all of them; otherwise the
/// first type error is shown with a note, or a generic message if there is no type error.
pub fn no_overload_error(command: &str, errors: &[CommandError], verbose: bool) -> CompileError {
    if let [only] = errors {
        return CompileError::no_matching_overload(only.message.clone());
    }
    if verbose {
        let listing: Vec<String> = errors.iter().map(|e| format!("\t{}", e.message)).collect();
        return CompileError::no_matching_overload(format!(
            "Line did not match any overloads for command {}:\n{}",
            command,
            listing.join("\n")
        ));
    }
    match errors.iter().find(|e| e.kind == CommandErrorKind::Type) {
        Some(first) => CompileError::no_matching_overload(format!(
            "{}\nErrors for other overloads not displayed.",
            first.message
        )),
        None => CompileError::no_matching_overload(format!(
            "Line did not match any overloads for command {}",
            command
        )),
    }
}
