//! Porting plain Mindustry logic to mlogx
//!
//! Processor output spells out every argument and jumps to line numbers. [`port_code`] trims it
//! down to the shorter mlogx forms and [`add_jump_labels`] replaces numeric jump targets with
//! named labels.

use crate::commands::{transform_command, Grammar};
use crate::check::get_jump_label_used;
use crate::diagnostics::Diagnostic;
use crate::error::{CompileError, CompileResult};
use crate::lexer::{clean_line, get_jump_label, remove_comments, split_line_into_arguments};
use crate::line::Line;
use indexmap::IndexMap;
use tracing::trace;

/// How far to go when porting. Each mode includes the ones before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, clap::ValueEnum)]
pub enum PortingMode {
    /// Only drop trailing `0` arguments the command does not need
    RemoveZeroes,
    /// Also use the shorthand forms of commands
    #[default]
    ShortenSyntax,
}

/// Leading indentation and trailing `#` comment of a raw line
fn surroundings(line: &str) -> (&str, &str) {
    let indent_len = line.len() - line.trim_start_matches([' ', '\t']).len();
    let code = remove_comments(line);
    let comment = match line.get(code.len()..) {
        Some(rest) if line.starts_with(code.as_str()) && rest.starts_with('#') => rest,
        _ => "",
    };
    (&line[..indent_len], comment)
}

/// Port a program line by line, keeping indentation and `#` comments
pub fn port_code(grammar: &Grammar, program: &[String], mode: PortingMode) -> (Vec<String>, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let ported = program
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let cleaned = clean_line(line);
            if cleaned.is_empty() {
                return line.clone();
            }
            let (indent, comment) = surroundings(line);
            let mut args = match split_line_into_arguments(&cleaned) {
                Ok(args) => args,
                Err(_) => Vec::new(),
            };

            let mut definition = grammar.resolve_command(&args).0.first().copied();
            while definition.is_none() && args.len() > 1 && args.last().map_or(false, |a| a == "0") {
                args.pop();
                definition = grammar.resolve_command(&args).0.first().copied();
            }

            match definition {
                None => {
                    diagnostics.push(Diagnostic::CannotPortInvalidLine {
                        line: Line::new(cleaned, index + 1, "unknown.mlogx"),
                    });
                    line.clone()
                }
                Some(definition) => {
                    let body = match definition.port() {
                        Some(port) => port(&args, mode),
                        None => args.join(" "),
                    };
                    trace!(from = %cleaned, to = %body, "ported line");
                    match comment {
                        "" => format!("{}{}", indent, body),
                        _ => format!("{}{} {}", indent, body, comment),
                    }
                }
            }
        })
        .collect();
    (ported, diagnostics)
}

/// Replace numeric jump targets with generated `jump_N_` labels.
///
/// Jumps to line `0` are left alone. The input must be raw processor output: a line that
/// already defines a label is an error.
pub fn add_jump_labels(grammar: &Grammar, code: &[String]) -> CompileResult<(Vec<String>, Vec<Diagnostic>)> {
    let cleaned: Vec<String> = code.iter().map(|line| clean_line(line)).filter(|line| !line.is_empty()).collect();
    if let Some(line) = cleaned.iter().find(|line| get_jump_label(line).is_some()) {
        return Err(CompileError::UnexpectedJumpLabel { line: line.clone() });
    }

    let mut jumps: IndexMap<String, String> = IndexMap::new();
    for line in &cleaned {
        let Some(target) = get_jump_label_used(grammar, line) else {
            continue;
        };
        if target == "0" {
            jumps.insert(target, "0".to_string());
        } else if target.parse::<usize>().is_ok() && !jumps.contains_key(&target) {
            let label = format!("jump_{}_", jumps.values().filter(|l| *l != "0").count());
            jumps.insert(target, label);
        }
    }

    let mut diagnostics = Vec::new();
    let mut transformed = Vec::with_capacity(cleaned.len());
    for line in &cleaned {
        let Ok(args) = split_line_into_arguments(line) else {
            diagnostics.push(Diagnostic::LineInvalid { line: line.clone() });
            continue;
        };
        match grammar.resolve_command(&args).0.first() {
            Some(definition) if definition.name == "jump" && definition.replace().is_none() => {
                let relabelled = transform_command(
                    &args,
                    *definition,
                    |target| jumps.get(target).cloned().unwrap_or_else(|| target.to_string()),
                    |_, arg| arg.is_generic && arg.ty == "jumpAddress",
                );
                transformed.push(relabelled.join(" "));
            }
            Some(_) => transformed.push(line.clone()),
            None => diagnostics.push(Diagnostic::LineInvalid { line: line.clone() }),
        }
    }

    let mut output = Vec::with_capacity(transformed.len() + jumps.len());
    for (index, line) in transformed.into_iter().enumerate() {
        if let Some(label) = jumps.get(&index.to_string()).filter(|l| *l != "0") {
            output.push(format!("{}: #AUTOGENERATED", label));
        }
        output.push(line);
    }
    Ok((output, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_port_keeps_indentation_and_comments() {
        let grammar = Grammar::standard();
        let (ported, diagnostics) = port_code(
            &grammar,
            &program(&["\top add x x 1 # increment", "", "print \"a # b\""]),
            PortingMode::ShortenSyntax,
        );
        assert_eq!(ported, program(&["\top add x 1 # increment", "", "print \"a # b\""]));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_port_removes_zeroes() {
        let grammar = Grammar::standard();
        let (ported, _) = port_code(&grammar, &program(&["ucontrol move 10 20 0 0 0"]), PortingMode::RemoveZeroes);
        assert_eq!(ported, program(&["ucontrol move 10 20"]));
    }

    #[test]
    fn test_port_modes() {
        let grammar = Grammar::standard();
        let code = program(&["jump 5 always x false", "op add x x 1"]);
        let (shortened, _) = port_code(&grammar, &code, PortingMode::ShortenSyntax);
        assert_eq!(shortened, program(&["jump 5 always", "op add x 1"]));
        let (kept, _) = port_code(&grammar, &code, PortingMode::RemoveZeroes);
        assert_eq!(kept, code);
    }

    #[test]
    fn test_port_invalid_line() {
        let grammar = Grammar::standard();
        let (ported, diagnostics) = port_code(&grammar, &program(&["amogus sus"]), PortingMode::ShortenSyntax);
        assert_eq!(ported, program(&["amogus sus"]));
        assert!(matches!(diagnostics.as_slice(), [Diagnostic::CannotPortInvalidLine { .. }]));
    }

    #[test]
    fn test_add_jump_labels() {
        let grammar = Grammar::standard();
        let (output, diagnostics) = add_jump_labels(
            &grammar,
            &program(&["set x 5", "jump 3 lessThan x 10", "op add x x 1", "print x", "jump 0 always"]),
        )
        .unwrap();
        assert_eq!(
            output,
            program(&[
                "set x 5",
                "jump jump_0_ lessThan x 10",
                "op add x x 1",
                "jump_0_: #AUTOGENERATED",
                "print x",
                "jump 0 always",
            ])
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_add_jump_labels_rejects_labels() {
        let grammar = Grammar::standard();
        assert!(matches!(
            add_jump_labels(&grammar, &program(&["loop:", "jump loop always"])),
            Err(CompileError::UnexpectedJumpLabel { .. })
        ));
    }

    #[test]
    fn test_add_jump_labels_reports_invalid_lines() {
        let grammar = Grammar::standard();
        let (output, diagnostics) = add_jump_labels(&grammar, &program(&["amogus", "end"])).unwrap();
        assert_eq!(output, program(&["end"]));
        assert_eq!(diagnostics, vec![Diagnostic::LineInvalid { line: "amogus".into() }]);
    }
}
