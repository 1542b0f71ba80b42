//! Block stack
//!
//! `namespace`, `&for` and `&if` open blocks that stay on a stack until the matching `}`.
//! While open, a block sees every statement twice: before compilation (where it may swallow
//! the statement) and after (where it may rewrite the output).
//!
//! - A namespace prefixes the variables of every emitted line with the enclosing namespace
//!   names, outermost first: `x` inside `a` inside `b` becomes `_a_b_x`.
//! - A for-loop captures its body unchanged and hands it back when closed, to be compiled once
//!   per value.
//! - An if-statement with a false condition swallows its body.

use crate::args::Arg;
use crate::commands::{transform_command, BlockDirective, CompilerCommandDefinition, Grammar, Overload};
use crate::diagnostics::Diagnostic;
use crate::error::{CompileError, CompileResult};
use crate::lexer::{get_jump_label, split_line_into_arguments};
use crate::line::{CompiledLine, Line};
use crate::types::typeof_arg;
use crate::MAX_LINES;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Namespace {
    pub name: String,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub variable: String,
    pub values: Vec<String>,
    /// Captured `(cleaned, source)` statement pairs
    pub body: Vec<(Line, Line)>,
    /// Nesting depth of blocks opened inside the captured body
    pub depth: usize,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: bool,
    pub depth: usize,
    pub line: Line,
}

/// An open block
#[derive(Debug, Clone, PartialEq)]
pub enum StackElement {
    Namespace(Namespace),
    ForLoop(ForLoop),
    If(IfStatement),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Namespace,
    ForLoop,
    If,
}

impl StackElement {
    pub fn kind(&self) -> BlockKind {
        match self {
            StackElement::Namespace(_) => BlockKind::Namespace,
            StackElement::ForLoop(_) => BlockKind::ForLoop,
            StackElement::If(_) => BlockKind::If,
        }
    }

    /// The line that opened the block
    pub fn line(&self) -> &Line {
        match self {
            StackElement::Namespace(ns) => &ns.line,
            StackElement::ForLoop(fl) => &fl.line,
            StackElement::If(stmt) => &stmt.line,
        }
    }

    /// How the block is named in diagnostics
    pub fn describe(&self) -> String {
        match self {
            StackElement::Namespace(ns) => format!("Namespace \"{}\"", ns.name),
            StackElement::ForLoop(fl) => format!("For loop with variable \"{}\"", fl.variable),
            StackElement::If(_) => "&if statement".to_string(),
        }
    }
}

pub fn has_element(stack: &[StackElement], kind: BlockKind) -> bool {
    stack.iter().any(|el| el.kind() == kind)
}

/// The innermost open for-loop
pub fn top_for_loop(stack: &[StackElement]) -> Option<&ForLoop> {
    stack.iter().rev().find_map(|el| match el {
        StackElement::ForLoop(fl) => Some(fl),
        _ => None,
    })
}

/// What to do with a statement after the pre-compile hooks ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precompile {
    Compile,
    Skip,
}

/// What closing a block produces
#[derive(Debug, Clone, PartialEq)]
pub enum BlockEnd {
    Nothing,
    /// Compile `body` once per value with `variable` bound to it
    Replay {
        variable: String,
        values: Vec<String>,
        body: Vec<(Line, Line)>,
    },
}

/// Open a block from a statement that matched a compiler command
pub fn on_begin(
    definition: &CompilerCommandDefinition,
    tokens: &[String],
    line: &Line,
    diagnostics: &mut Vec<Diagnostic>,
) -> CompileResult<StackElement> {
    let arg = |i: usize| tokens.get(i).cloned().unwrap_or_default();
    let element = match definition.directive {
        BlockDirective::Namespace => StackElement::Namespace(Namespace {
            name: arg(1),
            line: line.clone(),
        }),
        BlockDirective::ForRange => {
            let lower = parse_bound(&arg(3))?;
            let upper = parse_bound(&arg(4))?;
            let count = i128::from(upper) - i128::from(lower) + 1;
            if count > MAX_LINES as i128 {
                return Err(CompileError::invalid_directive(format!(
                    "For loop range {}..{} has {} values, more than a program can hold",
                    lower, upper, count
                )));
            }
            StackElement::ForLoop(ForLoop {
                variable: arg(1),
                values: (lower..=upper).map(|i| i.to_string()).collect(),
                body: Vec::new(),
                depth: 0,
                line: line.clone(),
            })
        }
        BlockDirective::ForEach => StackElement::ForLoop(ForLoop {
            variable: arg(1),
            values: tokens
                .get(3..tokens.len().saturating_sub(1))
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            body: Vec::new(),
            depth: 0,
            line: line.clone(),
        }),
        BlockDirective::If => {
            let condition = arg(1);
            let value = match condition.as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    diagnostics.push(Diagnostic::IfConditionNotBoolean {
                        condition,
                        line: line.clone(),
                    });
                    false
                }
            };
            StackElement::If(IfStatement {
                condition: value,
                depth: 0,
                line: line.clone(),
            })
        }
    };
    debug!(block = %element.describe(), line = %line, "opened block");
    Ok(element)
}

/// Largest integer an f64 holds exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Parse a `&for` bound in any integral form a number argument accepts: decimal, `0x`, `0b`
/// or packed color `%rrggbb`.
fn parse_bound(token: &str) -> CompileResult<i64> {
    let invalid = || CompileError::invalid_directive(format!("Invalid for loop bound \"{}\": expected an integer", token));
    let (digits, radix) = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        (hex, 16)
    } else if let Some(binary) = token.strip_prefix("0b").or_else(|| token.strip_prefix("0B")) {
        (binary, 2)
    } else if let Some(color) = token.strip_prefix('%') {
        (color, 16)
    } else {
        return token
            .parse::<f64>()
            .ok()
            .filter(|n| n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER)
            .map(|n| n as i64)
            .ok_or_else(invalid);
    };
    i64::from_str_radix(digits, radix).map_err(|_| invalid())
}

/// Whether a statement opens a block
fn opens_block(text: &str) -> bool {
    match split_line_into_arguments(text) {
        Ok(tokens) => {
            tokens.first().map_or(false, |t| crate::commands::is_compiler_command(t))
                && tokens.last().map_or(false, |t| t == "{")
        }
        Err(_) => false,
    }
}

/// Run every open block's pre-compile hook, innermost first.
///
/// A for-loop takes the statement into its body and an if-statement with a false condition
/// drops it; in both cases nested blocks are counted so only the block's own `}` gets through.
pub fn on_precompile(stack: &mut [StackElement], cleaned: &Line, source: &Line) -> Precompile {
    let closes = cleaned.text == "}";
    let opens = !closes && opens_block(&cleaned.text);

    for element in stack.iter_mut().rev() {
        match element {
            StackElement::Namespace(_) => {}
            StackElement::If(stmt) if stmt.condition => {}
            StackElement::If(stmt) => {
                return match (opens, closes, stmt.depth) {
                    (_, true, 0) => Precompile::Compile,
                    (_, true, _) => {
                        stmt.depth -= 1;
                        Precompile::Skip
                    }
                    (true, _, _) => {
                        stmt.depth += 1;
                        Precompile::Skip
                    }
                    _ => Precompile::Skip,
                };
            }
            StackElement::ForLoop(fl) => {
                if closes && fl.depth == 0 {
                    return Precompile::Compile;
                }
                if closes {
                    fl.depth -= 1;
                } else if opens {
                    fl.depth += 1;
                }
                fl.body.push((cleaned.clone(), source.clone()));
                return Precompile::Skip;
            }
        }
    }
    Precompile::Compile
}

/// Run the post-compile hooks, innermost first.
///
/// The innermost namespace prefixes with the whole stack at once, so outer namespaces leave
/// its output alone.
pub fn on_postcompile(grammar: &Grammar, stack: &[StackElement], output: Vec<CompiledLine>) -> Vec<CompiledLine> {
    if !has_element(stack, BlockKind::Namespace) {
        return output;
    }
    output
        .into_iter()
        .map(|line| {
            let text = add_namespaces_to_output(grammar, &line.text, stack);
            CompiledLine { text, ..line }
        })
        .collect()
}

fn add_namespaces_to_output(grammar: &Grammar, text: &str, stack: &[StackElement]) -> String {
    if let Some(label) = get_jump_label(text) {
        return format!("{}:", add_namespaces_to_variable(label, stack));
    }
    let Ok(args) = split_line_into_arguments(text) else {
        return text.to_string();
    };
    match grammar.resolve_command(&args).0.first() {
        Some(definition) => add_namespaces_to_line(grammar, &args, *definition, stack),
        None => text.to_string(),
    }
}

/// Close a block
pub fn on_end(element: StackElement) -> BlockEnd {
    debug!(block = %element.describe(), "closed block");
    match element {
        StackElement::ForLoop(fl) => BlockEnd::Replay {
            variable: fl.variable,
            values: fl.values,
            body: fl.body,
        },
        _ => BlockEnd::Nothing,
    }
}

/// `name` with one `_segment` per enclosing namespace
pub fn add_namespaces_to_variable(name: &str, stack: &[StackElement]) -> String {
    let mut output = String::new();
    for element in stack {
        if let StackElement::Namespace(ns) = element {
            output.push('_');
            output.push_str(&ns.name);
        }
    }
    output.push('_');
    output.push_str(name);
    output
}

/// Whether a token in this slot names a variable that should be namespaced
fn is_namespaceable(grammar: &Grammar, token: &str, arg: &Arg) -> bool {
    token != "_"
        && arg.is_generic
        && typeof_arg(token) == "variable"
        && (grammar.types.accepts_variable(arg) || arg.is_output || arg.ty == "jumpAddress")
}

/// Rewrite every variable of a statement with `transform`
pub fn transform_variables<T>(grammar: &Grammar, args: &[String], overload: &impl Overload, transform: T) -> Vec<String>
where
    T: Fn(&str) -> String,
{
    transform_command(args, overload, transform, |token, arg| is_namespaceable(grammar, token, arg))
}

pub fn add_namespaces_to_line(grammar: &Grammar, args: &[String], overload: &impl Overload, stack: &[StackElement]) -> String {
    transform_variables(grammar, args, overload, |name| add_namespaces_to_variable(name, stack)).join(" ")
}

/// Give a file-local `__name` a prefix derived from the file name, outside the main file
pub fn prepend_filename_to_arg(arg: &str, is_main: bool, filename: &str) -> String {
    if is_main || !arg.starts_with("__") {
        return arg.to_string();
    }
    let stem = filename.split('.').next().unwrap_or(filename);
    format!("__{}{}", stem, arg)
}
