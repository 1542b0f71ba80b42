//! Program compiler
//!
//! Folds a program through the block stack and the line compiler one statement at a time,
//! type checking emitted lines as they come out. Per-line failures are recorded as diagnostics
//! and the next line is compiled; structural failures abort the file.

use crate::blocks::{
    has_element, on_begin, on_end, on_postcompile, on_precompile, prepend_filename_to_arg, BlockEnd, BlockKind,
    Precompile, StackElement,
};
use crate::check::{collect_type_errors, remove_unused_jumps, type_check_line, TypeCheckingData, VariableDefinition};
use crate::commands::{is_compiler_command, Grammar};
use crate::constants::{replace_compiler_constants, ConstValue, Constants};
use crate::diagnostics::Diagnostic;
use crate::directives::{
    function_parameter_line, get_parameters, parse_preprocessor_directives, required_var_code, required_variable_line,
};
use crate::error::{no_overload_error, CompileError, CompileResult};
use crate::lexer::{clean_line, get_jump_label, split_line_into_arguments, split_line_on_semicolons};
use crate::line::{add_sources_to_code, CompiledLine, Line};
use crate::settings::{Mode, Settings};
use crate::MAX_LINES;
use tracing::{debug, trace};

/// The result of compiling one program
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput {
    pub program: Vec<CompiledLine>,
    pub type_data: TypeCheckingData,
}

impl CompileOutput {
    /// The emitted program text
    pub fn lines(&self) -> Vec<String> {
        self.program.iter().map(|line| line.text.clone()).collect()
    }
}

/// What compiling a single statement produced
enum Statement {
    /// Fresh output, still to be post-processed and type checked
    Emitted(Vec<CompiledLine>),
    /// Output of a replayed for-loop body, already post-processed and type checked
    Replayed(Vec<CompiledLine>),
}

/// Split a program into `(cleaned statement, source line)` pairs, dropping blank lines
pub fn clean_program(program: &[String], filename: &str) -> Vec<(Line, Line)> {
    let mut output = Vec::new();
    for (index, text) in program.iter().enumerate() {
        let source = Line::new(text.as_str(), index + 1, filename);
        let cleaned = clean_line(text);
        if cleaned.is_empty() {
            continue;
        }
        for statement in split_line_on_semicolons(&cleaned) {
            output.push((source.with_text(statement), source.clone()));
        }
    }
    output
}

/// Compiles one program. Diagnostics accumulate on the compiler and stay available after a
/// failed compilation.
pub struct Compiler<'g> {
    grammar: &'g Grammar,
    settings: &'g Settings,
    constants: &'g Constants,
    is_main: bool,
    diagnostics: Vec<Diagnostic>,
    type_data: TypeCheckingData,
    has_invalid_statements: bool,
}

impl<'g> Compiler<'g> {
    pub fn new(grammar: &'g Grammar, settings: &'g Settings, constants: &'g Constants) -> Self {
        Self {
            grammar,
            settings,
            constants,
            is_main: true,
            diagnostics: Vec::new(),
            type_data: TypeCheckingData::new(),
            has_invalid_statements: false,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Compile a program. `prior` seeds the type checker, e.g. with data from other files of
    /// the same project.
    pub fn compile(&mut self, program: &[String], prior: TypeCheckingData) -> CompileResult<CompileOutput> {
        let directives = parse_preprocessor_directives(program);
        self.is_main = directives.program_type == "main" || self.settings.compiler_options.mode == Mode::Single;
        self.has_invalid_statements = false;

        self.type_data = prior;
        self.type_data
            .define_variable("@counter", "number", Line::synthetic("[processor variable]"));
        for (name, ty) in get_parameters(program) {
            self.type_data.define_variable(name, ty, function_parameter_line());
        }

        let mut output = Vec::new();
        for name in &directives.required {
            match required_var_code(name) {
                Some((code, ty)) => {
                    let source = required_variable_line();
                    let code = code.iter().map(|line| line.to_string()).collect();
                    output.extend(add_sources_to_code(code, &source, &source));
                    self.type_data.variable_definitions.insert(
                        name.clone(),
                        vec![VariableDefinition {
                            variable_type: ty.to_string(),
                            line: source,
                        }],
                    );
                }
                None => self.diagnostics.push(Diagnostic::UnknownRequire { name: name.clone() }),
            }
        }

        let mut stack = Vec::new();
        let constants = self.constants;
        for (cleaned, source) in clean_program(program, &self.settings.filename) {
            self.fold_statement(&mut stack, cleaned, source, constants, &mut output)?;
        }

        if !stack.is_empty() {
            for element in &stack {
                self.diagnostics.push(Diagnostic::UnclosedBlock {
                    block: element.describe(),
                    line: element.line().clone(),
                });
            }
            return Err(CompileError::UnclosedBlocks { count: stack.len() });
        }

        let options = &self.settings.compiler_options;
        if options.check_types && !self.has_invalid_statements {
            let errors = collect_type_errors(&self.grammar.types, &self.type_data);
            self.diagnostics.extend(errors);
        }
        let program = if options.remove_unused_jump_labels {
            remove_unused_jumps(output, &self.type_data.jump_labels_used)
        } else {
            output
        };
        if program.len() > MAX_LINES {
            self.diagnostics.push(Diagnostic::ProgramTooLong { length: program.len() });
        }

        Ok(CompileOutput {
            program,
            type_data: std::mem::take(&mut self.type_data),
        })
    }

    /// Compile one statement into `output`. Errors that only concern this line are recorded.
    fn fold_statement(
        &mut self,
        stack: &mut Vec<StackElement>,
        cleaned: Line,
        source: Line,
        constants: &Constants,
        output: &mut Vec<CompiledLine>,
    ) -> CompileResult<()> {
        match self.process_statement(stack, cleaned, &source, constants) {
            Ok(lines) => {
                output.extend(lines);
                Ok(())
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                self.diagnostics.push(Diagnostic::LineFailed {
                    message: err.to_string(),
                    line: source,
                });
                Ok(())
            }
        }
    }

    fn process_statement(
        &mut self,
        stack: &mut Vec<StackElement>,
        cleaned: Line,
        source: &Line,
        constants: &Constants,
    ) -> CompileResult<Vec<CompiledLine>> {
        if on_precompile(stack, &cleaned, source) == Precompile::Skip {
            return Ok(Vec::new());
        }
        match self.compile_line(stack, cleaned, source, constants)? {
            Statement::Replayed(lines) => Ok(lines),
            Statement::Emitted(lines) => {
                let lines = on_postcompile(self.grammar, stack, lines);
                self.type_check(&lines, source)?;
                Ok(lines)
            }
        }
    }

    fn type_check(&mut self, lines: &[CompiledLine], source: &Line) -> CompileResult<()> {
        for line in lines {
            trace!(line = %line.text, "emitted");
            match type_check_line(self.grammar, line, &mut self.type_data, &mut self.diagnostics) {
                Ok(()) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    self.diagnostics.push(Diagnostic::LineFailed {
                        message: err.to_string(),
                        line: source.clone(),
                    });
                    self.has_invalid_statements = true;
                }
            }
        }
        Ok(())
    }

    /// Compile a cleaned statement: substitute constants, then emit a label, close a block,
    /// open a block or emit the command's output.
    fn compile_line(
        &mut self,
        stack: &mut Vec<StackElement>,
        cleaned: Line,
        source: &Line,
        constants: &Constants,
    ) -> CompileResult<Statement> {
        let grammar = self.grammar;
        let substitution = replace_compiler_constants(&cleaned.text, constants, has_element(stack, BlockKind::ForLoop));
        for name in substitution.unresolved {
            self.diagnostics.push(Diagnostic::UnknownCompilerConst {
                name,
                line: source.clone(),
            });
        }
        let cleaned = cleaned.with_text(substitution.text);

        if get_jump_label(&cleaned.text).is_some() {
            let label = CompiledLine::new(cleaned.text.clone(), cleaned, source.clone());
            return Ok(Statement::Emitted(vec![label]));
        }

        let args: Vec<String> = split_line_into_arguments(&cleaned.text)?
            .iter()
            .map(|arg| prepend_filename_to_arg(arg, self.is_main, &self.settings.filename))
            .collect();
        let Some(command) = args.first() else {
            return Ok(Statement::Emitted(Vec::new()));
        };
        let verbose = self.settings.compiler_options.verbose;

        if command == "}" {
            return self.end_block(stack, constants);
        }

        if is_compiler_command(command) {
            let (definitions, errors) = grammar.resolve_compiler_command(&args);
            let Some(definition) = definitions.first() else {
                return Err(no_overload_error(command, &errors, verbose));
            };
            let element = on_begin(definition, &args, &cleaned, &mut self.diagnostics)?;
            stack.push(element);
            return Ok(Statement::Emitted(Vec::new()));
        }

        let (definitions, errors) = grammar.resolve_command(&args);
        let Some(definition) = definitions.first() else {
            return Err(no_overload_error(command, &errors, verbose));
        };
        let lines = match definition.replace() {
            Some(replace) => replace
                .apply(&args)
                .into_iter()
                .map(|line| match grammar.get_command_definition(&line) {
                    Some(_) => Ok(line),
                    None => Err(CompileError::InvalidReplacement {
                        source_line: cleaned.text.clone(),
                        output: line,
                    }),
                })
                .collect::<CompileResult<Vec<_>>>()?,
            None => vec![args.join(" ")],
        };
        Ok(Statement::Emitted(add_sources_to_code(lines, &cleaned, source)))
    }

    /// Pop the innermost block. A for-loop's body is compiled once per value here.
    fn end_block(&mut self, stack: &mut Vec<StackElement>, constants: &Constants) -> CompileResult<Statement> {
        let element = stack.pop().ok_or(CompileError::NoBlockToEnd)?;
        let BlockEnd::Replay { variable, values, body } = on_end(element) else {
            return Ok(Statement::Emitted(Vec::new()));
        };

        let mut output = Vec::new();
        for value in values {
            debug!(variable = %variable, value = %value, statements = body.len(), "replaying for loop");
            let mut loop_constants = constants.clone();
            loop_constants.insert(variable.clone(), ConstValue::String(value));
            let mut loop_stack = stack.clone();
            for (cleaned, source) in &body {
                self.fold_statement(&mut loop_stack, cleaned.clone(), source.clone(), &loop_constants, &mut output)?;
            }
        }
        Ok(Statement::Replayed(output))
    }
}
