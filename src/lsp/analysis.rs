//! Document analysis for the LSP server
//!
//! Runs the compiler over a document and converts what it reports into LSP types.

use mlogx::commands::is_compiler_command;
use mlogx::{
    build_compiler_constants, CompileError, Compiler, Constants, Diagnostic as CompilerDiagnostic, Grammar, Level,
    Settings, TypeCheckingData,
};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, Diagnostic, DiagnosticSeverity, Hover, HoverContents, MarkupContent,
    MarkupKind, Position, Range,
};

use crate::utils::LineIndex;

/// Result of compiling a document
#[derive(Debug)]
pub struct AnalysisResult {
    /// Name the document was compiled under
    pub filename: String,
    pub diagnostics: Vec<CompilerDiagnostic>,
    /// Set when compilation of the whole file was aborted
    pub error: Option<CompileError>,
    /// Number of lines the document compiles to
    pub output_len: usize,
}

/// Compile a document with default settings
pub fn analyze(grammar: &Grammar, source: &str, filename: &str) -> AnalysisResult {
    let settings = Settings::default().with_filename(filename);
    let constants = build_compiler_constants(&Constants::new(), &settings);
    let program: Vec<String> = source.lines().map(String::from).collect();

    let mut compiler = Compiler::new(grammar, &settings, &constants);
    let result = compiler.compile(&program, TypeCheckingData::new());
    let diagnostics = compiler.into_diagnostics();
    let (error, output_len) = match result {
        Ok(output) => (None, output.program.len()),
        Err(e) => (Some(e), 0),
    };

    AnalysisResult {
        filename: filename.to_string(),
        diagnostics,
        error,
        output_len,
    }
}

fn severity(level: Level) -> DiagnosticSeverity {
    match level {
        Level::Err => DiagnosticSeverity::ERROR,
        Level::Warn => DiagnosticSeverity::WARNING,
    }
}

fn lsp_diagnostic(range: Range, severity: DiagnosticSeverity, message: String) -> Diagnostic {
    Diagnostic {
        range,
        severity: Some(severity),
        code: None,
        code_description: None,
        source: Some("mlogx".to_string()),
        message,
        related_information: None,
        tags: None,
        data: None,
    }
}

/// Convert analysis results to LSP diagnostics.
///
/// A compiler diagnostic is published once for every line of this document it mentions.
/// Diagnostics about synthesized lines are dropped, except for a file-level error, which is
/// shown on the first line.
pub fn to_diagnostics(result: &AnalysisResult, line_index: &LineIndex) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for diagnostic in &result.diagnostics {
        let message = diagnostic.to_string();
        for line in diagnostic.lines() {
            if line.line_number == 0 || line.source_filename != result.filename {
                continue;
            }
            diagnostics.push(lsp_diagnostic(
                line_index.source_line_range(line.line_number),
                severity(diagnostic.level()),
                message.clone(),
            ));
        }
    }

    // Unclosed blocks already point at the lines that opened them
    if let Some(error) = &result.error {
        if !matches!(error, CompileError::UnclosedBlocks { .. }) {
            diagnostics.push(lsp_diagnostic(
                line_index.source_line_range(1),
                DiagnosticSeverity::ERROR,
                error.to_string(),
            ));
        }
    }

    diagnostics
}

/// Show the overloads of the command under the cursor
pub fn get_hover(grammar: &Grammar, line_index: &LineIndex, position: Position) -> Option<Hover> {
    let (word, range) = line_index.word_at(position)?;
    let description = grammar.describe(&word)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: format!("```mlogx\n{}\n```", description),
        }),
        range: Some(range),
    })
}

/// Command and block directive names starting with the word being typed
pub fn get_completions(grammar: &Grammar, line_index: &LineIndex, position: Position) -> Vec<CompletionItem> {
    let prefix = line_index.prefix_at(position);
    grammar
        .command_names()
        .filter(|name| name.starts_with(&prefix))
        .map(|name| CompletionItem {
            label: name.to_string(),
            kind: Some(if is_compiler_command(name) {
                CompletionItemKind::KEYWORD
            } else {
                CompletionItemKind::FUNCTION
            }),
            detail: grammar.describe(name).and_then(|d| d.lines().next().map(String::from)),
            ..Default::default()
        })
        .collect()
}
