//! Command grammar and overload resolution
//!
//! A command name maps to an ordered list of overloads. Resolution checks a statement against
//! every overload in three stages (argument count, fixed sub-keywords, argument types) and
//! keeps the ones that pass, in table order. The first match is used for code generation.
//!
//! Block directives (`namespace`, `&for`, `&if`) live in a separate table with the same
//! resolution rules.

mod table;

use crate::args::{align_args, Arg};
use crate::error::{CommandError, CommandErrorKind, CompileResult};
use crate::lexer::split_line_into_arguments;
use crate::port::PortingMode;
use crate::types::{typeof_arg, TypeRegistry};
use indexmap::IndexMap;

pub type ReplaceFn = fn(&[String]) -> Vec<String>;
pub type PortFn = fn(&[String], PortingMode) -> String;

/// A rewrite from one statement to one or more statements
#[derive(Debug, Clone, Copy)]
pub enum Replace {
    /// Output lines with `%n` standing for token `n` (the command name is `%0`)
    Template(&'static [&'static str]),
    Custom(ReplaceFn),
}

impl Replace {
    pub fn apply(&self, args: &[String]) -> Vec<String> {
        match self {
            Replace::Template(lines) => lines.iter().map(|line| fill_template(line, args)).collect(),
            Replace::Custom(f) => f(args),
        }
    }
}

fn fill_template(template: &str, args: &[String]) -> String {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek().and_then(|d| d.to_digit(10))) {
            ('%', Some(n)) => {
                chars.next();
                output.push_str(args.get(n as usize).map_or("", String::as_str));
            }
            _ => output.push(c),
        }
    }
    output
}

/// How variable definitions are read from a statement, when the default rule does not apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRules {
    /// `set`: the variable takes the type of the assigned value, or the `:type` hint
    InferFromValue,
}

/// What a command does beyond being emitted as is
#[derive(Debug, Clone, Copy)]
pub enum CommandKind {
    Plain,
    Replace(Replace),
    Port(PortFn),
    VariableRules(VariableRules),
}

/// One overload of an ordinary command
#[derive(Debug, Clone)]
pub struct CommandDefinition {
    pub name: String,
    pub args: Vec<Arg>,
    pub description: &'static str,
    pub kind: CommandKind,
}

impl CommandDefinition {
    pub fn replace(&self) -> Option<&Replace> {
        match &self.kind {
            CommandKind::Replace(replace) => Some(replace),
            _ => None,
        }
    }

    pub fn port(&self) -> Option<PortFn> {
        match self.kind {
            CommandKind::Port(port) => Some(port),
            _ => None,
        }
    }

    pub fn variable_rules(&self) -> Option<VariableRules> {
        match self.kind {
            CommandKind::VariableRules(rules) => Some(rules),
            _ => None,
        }
    }
}

/// The block a compiler command opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockDirective {
    Namespace,
    ForRange,
    ForEach,
    If,
}

/// One overload of a block directive
#[derive(Debug, Clone)]
pub struct CompilerCommandDefinition {
    pub name: String,
    pub args: Vec<Arg>,
    pub description: &'static str,
    pub directive: BlockDirective,
}

/// Anything that can be matched against a statement
pub trait Overload {
    fn name(&self) -> &str;
    fn args(&self) -> &[Arg];
    fn description(&self) -> &str;

    /// The overload in `name [arg:type] (optional:type)` form
    fn signature(&self) -> String {
        let mut signature = self.name().to_string();
        for arg in self.args() {
            signature.push(' ');
            signature.push_str(&arg.to_string());
        }
        signature
    }

    /// A statement this overload accepts, built from each type's example token
    fn render(&self, types: &TypeRegistry) -> String {
        let mut line = self.name().to_string();
        for arg in self.args() {
            line.push(' ');
            line.push_str(arg.example(types));
        }
        line
    }
}

impl Overload for CommandDefinition {
    fn name(&self) -> &str {
        &self.name
    }
    fn args(&self) -> &[Arg] {
        &self.args
    }
    fn description(&self) -> &str {
        self.description
    }
}

impl Overload for CompilerCommandDefinition {
    fn name(&self) -> &str {
        &self.name
    }
    fn args(&self) -> &[Arg] {
        &self.args
    }
    fn description(&self) -> &str {
        self.description
    }
}

/// Matching overloads and, when requested, why the others failed
pub type Resolution<'g, O> = (Vec<&'g O>, Vec<CommandError>);

/// Whether a statement opens or names a block directive
pub fn is_compiler_command(name: &str) -> bool {
    name.starts_with('&') || name == "namespace"
}

/// The full grammar: types, commands and block directives
#[derive(Debug, Clone)]
pub struct Grammar {
    pub types: TypeRegistry,
    pub commands: IndexMap<String, Vec<CommandDefinition>>,
    pub compiler_commands: IndexMap<String, Vec<CompilerCommandDefinition>>,
}

impl Grammar {
    /// The Mindustry logic command set with the mlogx extensions
    pub fn standard() -> Self {
        let types = TypeRegistry::default();
        let commands = table::commands(&types);
        let compiler_commands = table::compiler_commands(&types);
        Self {
            types,
            commands,
            compiler_commands,
        }
    }

    /// Check tokens against one overload: argument count, then fixed keywords, then types.
    pub fn check_overload<O: Overload>(&self, tokens: &[String], overload: &O) -> Result<(), CommandError> {
        let Some((name, rest)) = tokens.split_first() else {
            return Err(CommandError::no_command(""));
        };
        if name != overload.name() {
            return Err(CommandError::no_command(name));
        }
        let slots = align_args(overload.args(), rest.len())
            .ok_or_else(|| CommandError::argument_count(name))?;

        for (token, arg) in rest.iter().zip(&slots) {
            if !arg.is_generic && *token != arg.ty {
                return Err(CommandError::bad_structure(token, &arg.ty));
            }
        }
        for (token, arg) in rest.iter().zip(&slots) {
            if !self.types.is_arg_valid_for(token, arg) {
                return Err(CommandError::type_mismatch(token, &arg.ty, typeof_arg(token)));
            }
        }
        Ok(())
    }

    fn resolve<'g, O: Overload>(&self, tokens: &[String], overloads: Option<&'g Vec<O>>) -> Resolution<'g, O> {
        let Some(overloads) = overloads else {
            let name = tokens.first().map_or("", String::as_str);
            return (Vec::new(), vec![CommandError::no_command(name)]);
        };
        let mut matches = Vec::new();
        let mut errors = Vec::new();
        for overload in overloads {
            match self.check_overload(tokens, overload) {
                Ok(()) => matches.push(overload),
                Err(error) => errors.push(error),
            }
        }
        (matches, errors)
    }

    /// Resolve already split tokens against the command table
    pub fn resolve_command(&self, tokens: &[String]) -> Resolution<'_, CommandDefinition> {
        let overloads = tokens.first().and_then(|name| self.commands.get(name));
        self.resolve(tokens, overloads)
    }

    /// Resolve already split tokens against the block directive table
    pub fn resolve_compiler_command(&self, tokens: &[String]) -> Resolution<'_, CompilerCommandDefinition> {
        let overloads = tokens.first().and_then(|name| self.compiler_commands.get(name));
        self.resolve(tokens, overloads)
    }

    /// Every overload a line matches, in table order. Unsplittable lines match nothing.
    pub fn get_command_definitions(&self, line: &str) -> Vec<&CommandDefinition> {
        match split_line_into_arguments(line) {
            Ok(tokens) => self.resolve_command(&tokens).0,
            Err(_) => Vec::new(),
        }
    }

    /// Matching overloads plus one error per failing overload
    pub fn get_command_definitions_with_errors(&self, line: &str) -> CompileResult<Resolution<'_, CommandDefinition>> {
        let tokens = split_line_into_arguments(line)?;
        Ok(self.resolve_command(&tokens))
    }

    /// The overload used for code generation
    pub fn get_command_definition(&self, line: &str) -> Option<&CommandDefinition> {
        self.get_command_definitions(line).into_iter().next()
    }

    pub fn get_compiler_command_definitions(&self, line: &str) -> CompileResult<Resolution<'_, CompilerCommandDefinition>> {
        let tokens = split_line_into_arguments(line)?;
        Ok(self.resolve_compiler_command(&tokens))
    }

    /// Check a line against one specific overload
    pub fn is_command<O: Overload>(&self, line: &str, overload: &O) -> Result<(), CommandError> {
        let tokens = split_line_into_arguments(line)
            .map_err(|e| CommandError::new(CommandErrorKind::NoCommand, e.to_string()))?;
        self.check_overload(&tokens, overload)
    }

    /// Every overload of a command with its description
    pub fn describe(&self, name: &str) -> Option<String> {
        let lines: Vec<String> = match self.commands.get(name) {
            Some(overloads) => overloads.iter().map(describe_overload).collect(),
            None => self.compiler_commands.get(name)?.iter().map(describe_overload).collect(),
        };
        Some(lines.join("\n"))
    }

    /// Names of every command and block directive
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().chain(self.compiler_commands.keys()).map(String::as_str)
    }
}

fn describe_overload<O: Overload>(overload: &O) -> String {
    format!("{}\n\t{}", overload.signature(), overload.description())
}

/// Rewrite the tokens of a statement whose slot passes `filter`.
///
/// `args[0]` is the command name and is never touched. Statements that do not fit the
/// overload's arity come back unchanged.
pub fn transform_command<T, F>(args: &[String], overload: &impl Overload, transform: T, filter: F) -> Vec<String>
where
    T: Fn(&str) -> String,
    F: Fn(&str, &Arg) -> bool,
{
    let Some((name, rest)) = args.split_first() else {
        return Vec::new();
    };
    let Some(slots) = align_args(overload.args(), rest.len()) else {
        return args.to_vec();
    };
    let mut output = vec![name.clone()];
    for (token, arg) in rest.iter().zip(slots) {
        output.push(if filter(token, arg) { transform(token) } else { token.clone() });
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &str) -> Vec<String> {
        split_line_into_arguments(line).unwrap()
    }

    fn kinds(errors: &[CommandError]) -> Vec<CommandErrorKind> {
        errors.iter().map(|e| e.kind).collect()
    }

    fn same<O>(found: &[&O], expected: &[&O]) -> bool {
        found.len() == expected.len() && found.iter().zip(expected).all(|(a, b)| std::ptr::eq(*a, *b))
    }

    #[test]
    fn test_get_command_definitions() {
        let grammar = Grammar::standard();
        let c = &grammar.commands;
        assert!(same(&grammar.get_command_definitions("read x cell1 4"), &[&c["read"][0]]));
        assert!(same(
            &grammar.get_command_definitions("ulocate building core true outX outY found core"),
            &[&c["ulocate"][3]]
        ));
        assert!(same(
            &grammar.get_command_definitions("sensor x thing @x"),
            &[&c["sensor"][0], &c["sensor"][1]]
        ));
        assert!(same(&grammar.get_command_definitions("print x"), &[&c["print"][0]]));
    }

    #[test]
    fn test_no_valid_definitions() {
        let grammar = Grammar::standard();
        assert!(grammar.get_command_definitions("amogus").is_empty());
        assert!(grammar.get_command_definitions("print sussy baka").is_empty());
        assert!(grammar.get_command_definitions("drawflush 5").is_empty());
        assert!(grammar.get_command_definitions("ulocate ore @this outX outY found").is_empty());
    }

    #[test]
    fn test_errors_for_failing_overloads() {
        let grammar = Grammar::standard();
        use CommandErrorKind::*;

        let (found, errors) = grammar.get_command_definitions_with_errors("amogus").unwrap();
        assert!(found.is_empty());
        assert_eq!(kinds(&errors), vec![NoCommand]);

        let (found, errors) = grammar.get_command_definitions_with_errors("jump label always").unwrap();
        assert!(same(&found, &[&grammar.commands["jump"][0]]));
        assert_eq!(kinds(&errors), vec![ArgumentCount, ArgumentCount]);

        let (found, errors) = grammar.get_command_definitions_with_errors("lookup amogus output 3").unwrap();
        assert!(found.is_empty());
        assert_eq!(kinds(&errors), vec![BadStructure; 4]);

        let (found, errors) = grammar.get_command_definitions_with_errors("drawflush 5").unwrap();
        assert!(found.is_empty());
        assert_eq!(kinds(&errors), vec![Type]);
    }

    #[test]
    fn test_is_command() {
        let grammar = Grammar::standard();
        let set = &grammar.commands["set"];
        assert_eq!(grammar.is_command("set x 5", &set[0]), Ok(()));
        assert_eq!(grammar.is_command("set x :number 5", &set[1]), Ok(()));
        assert_eq!(
            grammar.is_command("set x 5", &set[1]).map_err(|e| e.kind),
            Err(CommandErrorKind::ArgumentCount)
        );
        assert_eq!(
            grammar.is_command("set x :number 5", &set[0]).map_err(|e| e.kind),
            Err(CommandErrorKind::ArgumentCount)
        );
        assert_eq!(
            grammar
                .is_command("ulocate or3 @copper ore.x ore.y ore.found", &grammar.commands["ulocate"][0])
                .map_err(|e| e.kind),
            Err(CommandErrorKind::BadStructure)
        );
    }

    #[test]
    fn test_compiler_command_definitions() {
        let grammar = Grammar::standard();
        let cc = &grammar.compiler_commands;
        use CommandErrorKind::*;

        let (found, errors) = grammar.get_compiler_command_definitions("&if x {").unwrap();
        assert!(same(&found, &[&cc["&if"][0]]));
        assert!(errors.is_empty());

        let (found, errors) = grammar.get_compiler_command_definitions("&for x in 0 5 {").unwrap();
        assert!(same(&found, &[&cc["&for"][0]]));
        assert_eq!(kinds(&errors), vec![BadStructure]);

        let (found, errors) = grammar.get_compiler_command_definitions("&for x of a b c d f {").unwrap();
        assert!(same(&found, &[&cc["&for"][1]]));
        assert_eq!(kinds(&errors), vec![ArgumentCount]);

        let (found, _) = grammar.get_compiler_command_definitions("namespace amogus {").unwrap();
        assert!(same(&found, &[&cc["namespace"][0]]));
    }

    #[test]
    fn test_invalid_compiler_commands() {
        let grammar = Grammar::standard();
        use CommandErrorKind::*;
        let errors_of = |line: &str| {
            let (found, errors) = grammar.get_compiler_command_definitions(line).unwrap();
            assert!(found.is_empty(), "{}", line);
            kinds(&errors)
        };
        assert_eq!(errors_of("&for x in sussybakas {"), vec![ArgumentCount, BadStructure]);
        assert_eq!(errors_of("&for x in 0 5 e"), vec![BadStructure, BadStructure]);
        assert_eq!(errors_of("namespace @unit {"), vec![Type]);
        assert_eq!(errors_of("set x 5"), vec![NoCommand]);
    }

    #[test]
    fn test_every_overload_accepts_its_own_rendering() {
        let grammar = Grammar::standard();
        for overload in grammar.commands.values().flatten() {
            let line = overload.render(&grammar.types);
            assert_eq!(grammar.is_command(&line, overload), Ok(()), "{}", line);
        }
        for overload in grammar.compiler_commands.values().flatten() {
            let line = overload.render(&grammar.types);
            assert_eq!(grammar.is_command(&line, overload), Ok(()), "{}", line);
        }
    }

    #[test]
    fn test_replace_templates() {
        let replace = Replace::Template(&["op %1 %2 %2 %3"]);
        assert_eq!(replace.apply(&tokens("op add x 1")), vec!["op add x x 1"]);
    }

    #[test]
    fn test_transform_command() {
        let grammar = Grammar::standard();
        let upper = |s: &str| s.to_uppercase();
        let fixed = |_: &str, arg: &Arg| !arg.is_generic;
        assert_eq!(
            transform_command(&tokens("set x 5"), &grammar.commands["set"][0], upper, fixed),
            tokens("set x 5")
        );
        assert_eq!(
            transform_command(
                &tokens("ulocate building core true outX outY found building"),
                &grammar.commands["ulocate"][3],
                upper,
                fixed
            ),
            tokens("ulocate BUILDING core true outX outY found building")
        );
        assert_eq!(
            transform_command(
                &tokens("jump 5 lessThan x 4"),
                &grammar.commands["jump"][1],
                |s: &str| format!("jump_{}_", s),
                |_: &str, arg: &Arg| arg.is_generic && arg.ty == "jumpAddress"
            ),
            tokens("jump jump_5_ lessThan x 4")
        );
    }

    #[test]
    fn test_describe() {
        let grammar = Grammar::standard();
        let text = grammar.describe("read").unwrap();
        assert!(text.starts_with("read [output:*number] [building:building] [address:number]"));
        assert!(grammar.describe("&for").is_some());
        assert!(grammar.describe("amogus").is_none());
    }
}
