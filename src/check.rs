//! Type checking and jump label resolution
//!
//! Runs over emitted lines as they are produced, recording every variable definition and usage
//! and every jump label defined or used. Nothing is reported until the whole program has been
//! seen: [`collect_type_errors`] then turns the recorded data into warnings.

use crate::args::align_args;
use crate::commands::{CommandDefinition, Grammar, Overload, VariableRules};
use crate::diagnostics::Diagnostic;
use crate::error::{CompileError, CompileResult};
use crate::lexer::{clean_line, get_jump_label, split_line_into_arguments};
use crate::line::{CompiledLine, Line};
use crate::types::{typeof_arg, TypeRegistry};
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    pub variable_type: String,
    pub line: Line,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableUsage {
    /// The variable must be of one of these types
    pub acceptable_types: Vec<String>,
    pub line: Line,
}

/// Everything the type checker knows about a program
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeCheckingData {
    pub variable_definitions: IndexMap<String, Vec<VariableDefinition>>,
    pub variable_usages: IndexMap<String, Vec<VariableUsage>>,
    pub jump_labels_defined: IndexMap<String, Vec<Line>>,
    pub jump_labels_used: IndexMap<String, Vec<Line>>,
}

fn merge_map<T>(into: &mut IndexMap<String, Vec<T>>, from: IndexMap<String, Vec<T>>) {
    for (name, entries) in from {
        into.entry(name).or_default().extend(entries);
    }
}

impl TypeCheckingData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine data from another compilation: keys are unioned, per-key lists appended.
    pub fn merge(&mut self, other: TypeCheckingData) {
        merge_map(&mut self.variable_definitions, other.variable_definitions);
        merge_map(&mut self.variable_usages, other.variable_usages);
        merge_map(&mut self.jump_labels_defined, other.jump_labels_defined);
        merge_map(&mut self.jump_labels_used, other.jump_labels_used);
    }

    pub fn define_variable(&mut self, name: impl Into<String>, variable_type: impl Into<String>, line: Line) {
        self.variable_definitions
            .entry(name.into())
            .or_default()
            .push(VariableDefinition {
                variable_type: variable_type.into(),
                line,
            });
    }
}

/// Record what one emitted line defines and uses.
///
/// A compiled line that matches no overload aborts type checking of the program.
pub fn type_check_line(
    grammar: &Grammar,
    compiled: &CompiledLine,
    data: &mut TypeCheckingData,
    diagnostics: &mut Vec<Diagnostic>,
) -> CompileResult<()> {
    let text = compiled.text.as_str();
    let source = &compiled.compiled_source;

    if clean_line(text).is_empty() {
        diagnostics.push(Diagnostic::BlankLineGenerated { line: source.clone() });
        return Ok(());
    }
    if let Some(label) = get_jump_label(text) {
        data.jump_labels_defined
            .entry(label.to_string())
            .or_default()
            .push(source.clone());
        return Ok(());
    }

    let compiled_args = split_line_into_arguments(text)?;
    let compiled_definitions = grammar.resolve_command(&compiled_args).0;
    if compiled_definitions.is_empty() {
        return Err(CompileError::InvalidCommands { line: text.to_string() });
    }

    let uncompiled_args = split_line_into_arguments(&source.text).unwrap_or_default();
    let uncompiled_definition = grammar.resolve_command(&uncompiled_args).0.first().copied();
    if uncompiled_definition.is_none() {
        diagnostics.push(Diagnostic::InvalidUncompiledLine {
            compiled: text.to_string(),
            line: source.clone(),
        });
    }

    if let Some(label) = get_jump_label_used(grammar, text) {
        data.jump_labels_used.entry(label).or_default().push(source.clone());
    }

    let uncompiled = uncompiled_definition.map(|def| (tail(&uncompiled_args), def));
    for definition in compiled_definitions {
        for (name, variable_type) in get_variables_defined(&grammar.types, tail(&compiled_args), definition, uncompiled)? {
            data.define_variable(name, variable_type, source.clone());
        }
    }

    for (name, acceptable_types) in get_all_possible_variables_used(grammar, text) {
        data.variable_usages.entry(name).or_default().push(VariableUsage {
            acceptable_types,
            line: source.clone(),
        });
    }
    Ok(())
}

fn tail(args: &[String]) -> &[String] {
    args.get(1..).unwrap_or_default()
}

/// Variables defined by a statement, as `(name, type)`. `args` excludes the command name.
///
/// Output slots define a variable of the slot's type. `set` instead infers the type from the
/// assigned value, or takes it from the `:type` hint of the line it was compiled from.
pub fn get_variables_defined(
    types: &TypeRegistry,
    args: &[String],
    definition: &CommandDefinition,
    uncompiled: Option<(&[String], &CommandDefinition)>,
) -> CompileResult<Vec<(String, String)>> {
    if let Some(VariableRules::InferFromValue) = definition.variable_rules() {
        let (Some(name), Some(value)) = (args.first(), args.get(1)) else {
            return Ok(Vec::new());
        };
        if let Some(hint) = uncompiled.and_then(|(args, def)| type_hint(args, def)) {
            if !types.is_generic(hint) {
                return Err(CompileError::InvalidTypeHint { hint: hint.to_string() });
            }
            return Ok(vec![(name.clone(), normalize_variable_type(hint).to_string())]);
        }
        return Ok(vec![(name.clone(), normalize_variable_type(typeof_arg(value)).to_string())]);
    }

    let Some(slots) = align_args(definition.args(), args.len()) else {
        return Ok(Vec::new());
    };
    Ok(args
        .iter()
        .zip(slots)
        .filter(|(_, arg)| arg.is_generic && arg.is_output)
        .map(|(token, arg)| (token.clone(), arg.ty.clone()))
        .collect())
}

/// The type named by a `:type` argument of a statement
fn type_hint<'a>(args: &'a [String], definition: &CommandDefinition) -> Option<&'a str> {
    let slots = align_args(definition.args(), args.len())?;
    args.iter()
        .zip(slots)
        .find(|(_, arg)| arg.is_generic && arg.ty == "ctype")
        .and_then(|(token, _)| token.strip_prefix(':'))
}

fn normalize_variable_type(ty: &str) -> &str {
    match ty {
        "variable" => "any",
        other => other,
    }
}

/// Variables a statement reads, as `(name, type)`, for one overload. `args` excludes the
/// command name.
pub fn get_variables_used(types: &TypeRegistry, args: &[String], definition: &impl Overload) -> Vec<(String, String)> {
    let Some(slots) = align_args(definition.args(), args.len()) else {
        return Vec::new();
    };
    args.iter()
        .zip(slots)
        .filter(|(token, arg)| types.accepts_variable(arg) && typeof_arg(token) == "variable")
        .map(|(token, arg)| (token.clone(), arg.ty.clone()))
        .collect()
}

/// Variables a line reads under any of its matching overloads, with every type they could be
/// read as.
pub fn get_all_possible_variables_used(grammar: &Grammar, line: &str) -> Vec<(String, Vec<String>)> {
    let Ok(tokens) = split_line_into_arguments(line) else {
        return Vec::new();
    };
    let mut variables: IndexMap<String, Vec<String>> = IndexMap::new();
    for definition in grammar.resolve_command(&tokens).0 {
        for (name, ty) in get_variables_used(&grammar.types, tail(&tokens), definition) {
            let types = variables.entry(name).or_default();
            if !types.contains(&ty) {
                types.push(ty);
            }
        }
    }
    variables.into_iter().collect()
}

/// The jump target of a line, if it jumps
pub fn get_jump_label_used(grammar: &Grammar, line: &str) -> Option<String> {
    let tokens = split_line_into_arguments(line).ok()?;
    let definition = *grammar.resolve_command(&tokens).0.first()?;
    let args = tail(&tokens);
    let slots = align_args(definition.args(), args.len())?;
    args.iter()
        .zip(slots)
        .find(|(_, arg)| arg.is_generic && arg.ty == "jumpAddress")
        .map(|(token, _)| token.clone())
}

fn normalize_conflict_type(ty: &str) -> Option<&str> {
    match ty {
        "any" | "variable" | "null" => None,
        "boolean" => Some("number"),
        other => Some(other),
    }
}

/// Raw numeric jump targets are always valid
fn is_numeric_label(label: &str) -> bool {
    let digits = label.trim_start().trim_start_matches(['+', '-']);
    digits.starts_with(|c: char| c.is_ascii_digit())
}

/// Turn the recorded data into warnings
pub fn collect_type_errors(types: &TypeRegistry, data: &TypeCheckingData) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (name, definitions) in &data.variable_definitions {
        let mut distinct: Vec<&str> = Vec::new();
        for ty in definitions.iter().filter_map(|d| normalize_conflict_type(&d.variable_type)) {
            if !distinct.contains(&ty) {
                distinct.push(ty);
            }
        }
        if distinct.len() > 1 {
            let first_of = |ty: &str| {
                definitions
                    .iter()
                    .find(|d| normalize_conflict_type(&d.variable_type) == Some(ty))
                    .map(|d| d.line.clone())
            };
            if let (Some(first), Some(conflicting)) = (first_of(distinct[0]), first_of(distinct[1])) {
                diagnostics.push(Diagnostic::VariableConflictingTypes {
                    name: name.clone(),
                    types: distinct.iter().map(|t| t.to_string()).collect(),
                    first,
                    conflicting,
                });
            }
        }
    }

    for (name, usages) in &data.variable_usages {
        if name == "_" {
            continue;
        }
        for usage in usages {
            match data.variable_definitions.get(name).and_then(|defs| defs.first()) {
                None => diagnostics.push(Diagnostic::VariableUndefined {
                    name: name.clone(),
                    line: usage.line.clone(),
                }),
                Some(definition)
                    if !types.is_input_accepted_by_any_type(&definition.variable_type, &usage.acceptable_types) =>
                {
                    diagnostics.push(Diagnostic::VariableTypeMismatch {
                        name: name.clone(),
                        found: definition.variable_type.clone(),
                        expected: usage.acceptable_types.clone(),
                        line: usage.line.clone(),
                        definition: definition.line.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    for (label, definitions) in &data.jump_labels_defined {
        if definitions.len() > 1 {
            diagnostics.push(Diagnostic::JumpLabelRedefined {
                label: label.clone(),
                definitions: definitions.clone(),
            });
        }
    }

    for (label, usages) in &data.jump_labels_used {
        if !data.jump_labels_defined.contains_key(label) && !is_numeric_label(label) {
            diagnostics.push(Diagnostic::JumpLabelMissing {
                label: label.clone(),
                usages: usages.clone(),
            });
        }
    }

    diagnostics
}

/// Drop the definitions of labels nothing jumps to
pub fn remove_unused_jumps(program: Vec<CompiledLine>, jump_labels_used: &IndexMap<String, Vec<Line>>) -> Vec<CompiledLine> {
    program
        .into_iter()
        .filter(|line| match get_jump_label(&line.text) {
            Some(label) => jump_labels_used.get(label).map_or(false, |uses| !uses.is_empty()),
            None => true,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::add_sources_to_code;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|a| a.to_string()).collect()
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    fn line(text: &str) -> Line {
        Line::new(text, 1, "test.mlogx")
    }

    fn compiled(text: &str, source: &str, number: usize) -> CompiledLine {
        let source = Line::new(source, number, "test.mlogx");
        CompiledLine::new(text, source.clone(), source)
    }

    fn check(program: &[(&str, &str)]) -> (TypeCheckingData, Vec<Diagnostic>) {
        let grammar = Grammar::standard();
        let mut data = TypeCheckingData::new();
        let mut diagnostics = Vec::new();
        for (i, (text, source)) in program.iter().enumerate() {
            type_check_line(&grammar, &compiled(text, source, i + 1), &mut data, &mut diagnostics).unwrap();
        }
        (data, diagnostics)
    }

    #[test]
    fn test_get_variables_defined() {
        let grammar = Grammar::standard();
        let c = &grammar.commands;
        assert_eq!(
            get_variables_defined(&grammar.types, &strings(&["x", "cell1", "4"]), &c["read"][0], None).unwrap(),
            pairs(&[("x", "number")])
        );
        assert_eq!(
            get_variables_defined(
                &grammar.types,
                &strings(&["building", "core", "true", "outX", "outY", "found", "building"]),
                &c["ulocate"][3],
                None
            )
            .unwrap(),
            pairs(&[("outX", "number"), ("outY", "number"), ("found", "boolean"), ("building", "building")])
        );
    }

    #[test]
    fn test_set_infers_type() {
        let grammar = Grammar::standard();
        let set = &grammar.commands["set"][0];
        assert_eq!(
            get_variables_defined(&grammar.types, &strings(&["core", "nucleus1"]), set, None).unwrap(),
            pairs(&[("core", "building")])
        );
        assert_eq!(
            get_variables_defined(&grammar.types, &strings(&["amogus", "\"sus\""]), set, None).unwrap(),
            pairs(&[("amogus", "string")])
        );
        assert_eq!(
            get_variables_defined(&grammar.types, &strings(&["amogus", "otherVar"]), set, None).unwrap(),
            pairs(&[("amogus", "any")])
        );
    }

    #[test]
    fn test_set_type_hints() {
        let grammar = Grammar::standard();
        let c = &grammar.commands;
        let hinted = strings(&["thing", ":building", "null"]);
        assert_eq!(
            get_variables_defined(&grammar.types, &strings(&["thing", "null"]), &c["set"][0], Some((hinted.as_slice(), &c["set"][1])))
                .unwrap(),
            pairs(&[("thing", "building")])
        );
        let hinted = strings(&["amogus", ":number", "otherVar"]);
        assert_eq!(
            get_variables_defined(
                &grammar.types,
                &strings(&["amogus", "otherVar"]),
                &c["set"][0],
                Some((hinted.as_slice(), &c["set"][1]))
            )
            .unwrap(),
            pairs(&[("amogus", "number")])
        );
        let hinted = strings(&["amogus", ":sus", "otherVar"]);
        assert_eq!(
            get_variables_defined(
                &grammar.types,
                &strings(&["amogus", "otherVar"]),
                &c["set"][0],
                Some((hinted.as_slice(), &c["set"][1]))
            ),
            Err(CompileError::InvalidTypeHint { hint: "sus".into() })
        );
    }

    #[test]
    fn test_get_variables_used() {
        let grammar = Grammar::standard();
        let c = &grammar.commands;
        assert_eq!(
            get_variables_used(&grammar.types, &strings(&["x", "cell1", "y"]), &c["read"][0]),
            pairs(&[("y", "number")])
        );
        assert!(get_variables_used(
            &grammar.types,
            &strings(&["building", "core", "true", "outX", "outY", "found", "building"]),
            &c["ulocate"][3]
        )
        .is_empty());
    }

    #[test]
    fn test_get_all_possible_variables_used() {
        let grammar = Grammar::standard();
        let used = |line: &str| get_all_possible_variables_used(&grammar, line);
        let entry = |name: &str, types: &[&str]| (name.to_string(), strings(types));

        assert_eq!(used("read x cell1 y"), vec![entry("y", &["number"])]);
        assert_eq!(
            used("ucontrol within x y 10 close"),
            vec![entry("x", &["number"]), entry("y", &["number"])]
        );
        assert!(used("ulocate building core true outX outY found building").is_empty());
        assert_eq!(used("sensor x thing @x"), vec![entry("thing", &["building", "unit"])]);
        assert_eq!(
            used("sensor building.x building @x"),
            vec![entry("building", &["building", "unit"])]
        );
    }

    #[test]
    fn test_get_jump_label_used() {
        let grammar = Grammar::standard();
        assert_eq!(get_jump_label_used(&grammar, "jump label always"), Some("label".to_string()));
        assert_eq!(get_jump_label_used(&grammar, "jump 5 lessThan x 4"), Some("5".to_string()));
        assert_eq!(get_jump_label_used(&grammar, "set label \"greaterThan\""), None);
    }

    #[test]
    fn test_remove_unused_jumps() {
        let source = line("");
        let mut used = IndexMap::new();
        used.insert("label5".to_string(), vec![line("jump label5 always")]);

        let program = add_sources_to_code(strings(&["label5:", "jump label5 always"]), &source, &source);
        assert_eq!(remove_unused_jumps(program.clone(), &used), program);

        let with_unused = add_sources_to_code(strings(&["label5:", "jump label5 always", "label6:"]), &source, &source);
        assert_eq!(remove_unused_jumps(with_unused, &used), program);
    }

    #[test]
    fn test_conflicting_types() {
        let grammar = Grammar::standard();
        let (data, _) = check(&[("set x 5", "set x 5"), ("set x \"hello\"", "set x \"hello\"")]);
        let errors = collect_type_errors(&grammar.types, &data);
        assert_eq!(errors.len(), 1);
        match &errors[0] {
            Diagnostic::VariableConflictingTypes { first, conflicting, .. } => {
                assert_eq!(first.line_number, 1);
                assert_eq!(conflicting.line_number, 2);
            }
            other => panic!("unexpected diagnostic {:?}", other),
        }

        let (data, _) = check(&[("set x true", "set x true"), ("set x 5", "set x 5")]);
        assert!(collect_type_errors(&grammar.types, &data).is_empty());
    }

    #[test]
    fn test_undefined_and_mismatched_variables() {
        let grammar = Grammar::standard();
        let (data, _) = check(&[("print x", "print x"), ("print _", "print _")]);
        let errors = collect_type_errors(&grammar.types, &data);
        assert_eq!(errors, vec![Diagnostic::VariableUndefined { name: "x".into(), line: Line::new("print x", 1, "test.mlogx") }]);

        let (data, _) = check(&[("set x \"hello\"", "set x \"hello\""), ("ubind x", "ubind x")]);
        let errors = collect_type_errors(&grammar.types, &data);
        assert!(matches!(errors.as_slice(), [Diagnostic::VariableTypeMismatch { .. }]));
    }

    #[test]
    fn test_jump_labels() {
        let grammar = Grammar::standard();
        let (data, _) = check(&[
            ("loop:", "loop:"),
            ("loop:", "loop:"),
            ("jump loop always", "jump loop always"),
            ("jump 0 always", "jump 0 always"),
            ("jump missing always", "jump missing always"),
        ]);
        let errors = collect_type_errors(&grammar.types, &data);
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], Diagnostic::JumpLabelRedefined { label, definitions } if label == "loop" && definitions.len() == 2));
        assert!(matches!(&errors[1], Diagnostic::JumpLabelMissing { label, .. } if label == "missing"));
    }

    #[test]
    fn test_invalid_compiled_line_aborts() {
        let grammar = Grammar::standard();
        let mut data = TypeCheckingData::new();
        let mut diagnostics = Vec::new();
        let result = type_check_line(&grammar, &compiled("amogus sus", "amogus sus", 1), &mut data, &mut diagnostics);
        assert!(matches!(result, Err(CompileError::InvalidCommands { .. })));
    }

    #[test]
    fn test_invalid_uncompiled_line_is_reported() {
        let (_, diagnostics) = check(&[("print x", "amogus")]);
        assert!(matches!(diagnostics.as_slice(), [Diagnostic::InvalidUncompiledLine { .. }]));
    }

    #[test]
    fn test_merge() {
        let mut a = TypeCheckingData::new();
        a.define_variable("x", "number", line("set x 5"));
        let mut b = TypeCheckingData::new();
        b.define_variable("x", "string", line("set x \"a\""));
        b.define_variable("y", "unit", line("set y @unit"));
        b.jump_labels_used.insert("loop".into(), vec![line("jump loop always")]);
        a.merge(b);
        assert_eq!(a.variable_definitions["x"].len(), 2);
        assert_eq!(a.variable_definitions["x"][1].variable_type, "string");
        assert!(a.variable_definitions.contains_key("y"));
        assert_eq!(a.jump_labels_used["loop"].len(), 1);
    }
}
