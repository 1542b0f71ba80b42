//! mlogx Compiler
//!
//! Compiles mlogx, an extended form of Mindustry's processor logic, down to plain logic that
//! an in-game processor can run.
//!
//! # Architecture
//!
//! ```text
//! Source lines (.mlogx)
//!       │
//!       ▼
//! ┌──────────────┐
//! │    Lexer     │  → cleaned statements, argument lists
//! └──────────────┘
//!       │
//!       ▼
//! ┌──────────────┐
//! │ Block stack  │  → namespaces, &for unrolling, &if elision
//! └──────────────┘
//!       │
//!       ▼
//! ┌──────────────┐
//! │Line compiler │  → overload resolution, replace rules (.mlog lines)
//! └──────────────┘
//!       │
//!       ▼
//! ┌──────────────┐
//! │  Type check  │  → warnings, unused label removal
//! └──────────────┘
//! ```

pub mod args;
pub mod blocks;
pub mod check;
pub mod commands;
pub mod compile;
pub mod constants;
pub mod diagnostics;
pub mod directives;
pub mod error;
pub mod lexer;
pub mod line;
pub mod port;
pub mod settings;
pub mod token;
pub mod types;

// Re-exports for convenience
pub use check::TypeCheckingData;
pub use commands::Grammar;
pub use compile::{CompileOutput, Compiler};
pub use constants::{build_compiler_constants, parse_icons, ConstValue, Constants};
pub use diagnostics::{Diagnostic, Level};
pub use error::{CompileError, CompileResult};
pub use line::{CompiledLine, Line};
pub use port::PortingMode;
pub use settings::Settings;

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File extension for mlogx source files
pub const FILE_EXTENSION: &str = "mlogx";

/// Longest program a processor will run
pub const MAX_LINES: usize = 999;

/// Appended to single-file output unless `removeCompilerMark` is set
pub const COMPILER_MARK: [&str; 2] = ["print \"Made with mlogx\"", "print \"github.com/BalaM314/mlogx/\""];
