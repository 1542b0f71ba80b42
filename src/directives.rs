//! Preprocessor directives
//!
//! `#` starts a comment, so directives never reach the compiler proper. They are read from the
//! raw program before compilation starts.

use crate::line::Line;

/// Directives collected from a program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directives {
    /// `#program_type <type>`, `unknown` if absent
    pub program_type: String,
    /// `#require a, b`
    pub required: Vec<String>,
    /// `#author <text>`, `unknown` if absent
    pub author: String,
}

impl Default for Directives {
    fn default() -> Self {
        Self {
            program_type: "unknown".to_string(),
            required: Vec::new(),
            author: "unknown".to_string(),
        }
    }
}

/// The argument of `#name arg`, if the line is exactly that directive
fn directive<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let rest = line.trim().strip_prefix('#')?.strip_prefix(name)?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim())
}

pub fn parse_preprocessor_directives(program: &[String]) -> Directives {
    let mut directives = Directives::default();
    for line in program {
        if let Some(program_type) = directive(line, "program_type") {
            directives.program_type = program_type.to_string();
        } else if let Some(required) = directive(line, "require") {
            directives.required.extend(
                required
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from),
            );
        } else if let Some(author) = directive(line, "author") {
            directives.author = author.to_string();
        }
    }
    directives
}

/// `(name, type)` pairs declared by `#function name(a:type, b:type)`
pub fn get_parameters(program: &[String]) -> Vec<(String, String)> {
    let Some(declaration) = program.iter().find_map(|line| directive(line, "function")) else {
        return Vec::new();
    };
    let Some(params) = declaration
        .split_once('(')
        .and_then(|(_, rest)| rest.rsplit_once(')'))
        .map(|(params, _)| params)
    else {
        return Vec::new();
    };
    params
        .split(',')
        .filter_map(|param| {
            let (name, ty) = param.trim().split_once(':')?;
            Some((name.trim().to_string(), ty.trim().to_string()))
        })
        .collect()
}

/// Source of a `#function` parameter's definition
pub fn function_parameter_line() -> Line {
    Line::new("[function parameter]", 1, "[function parameter]")
}

/// Source of code injected by `#require`
pub fn required_variable_line() -> Line {
    Line::synthetic("[#require'd variable]")
}

/// The code defining a `#require`able variable, and the variable's type
pub fn required_var_code(name: &str) -> Option<(&'static [&'static str], &'static str)> {
    match name {
        "cookie" => Some((&["op mul cookie @thisx @maph", "op add cookie @thisy cookie"], "number")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_required_vars() {
        assert_eq!(parse_preprocessor_directives(&program(&["#require cookie"])).required, vec!["cookie"]);
        assert_eq!(
            parse_preprocessor_directives(&program(&[
                "#require core, thing",
                "#sussy baka",
                "set x false",
                "#required that stuff be done",
            ]))
            .required,
            vec!["core", "thing"]
        );
    }

    #[test]
    fn test_author() {
        assert_eq!(parse_preprocessor_directives(&program(&["#author amogus"])).author, "amogus");
        assert_eq!(
            parse_preprocessor_directives(&program(&["#author sussy baka", "#sussy baka", "set x false"])).author,
            "sussy baka"
        );
        assert_eq!(parse_preprocessor_directives(&[]).author, "unknown");
    }

    #[test]
    fn test_program_type() {
        assert_eq!(parse_preprocessor_directives(&program(&["#program_type main"])).program_type, "main");
        assert_eq!(
            parse_preprocessor_directives(&program(&[
                "#sussy baka",
                "#program_type main",
                "set x false",
                "#required that stuff be done",
            ]))
            .program_type,
            "main"
        );
        assert_eq!(parse_preprocessor_directives(&program(&["set x 5"])).program_type, "unknown");
    }

    #[test]
    fn test_get_parameters() {
        assert_eq!(
            get_parameters(&program(&["#function move_unit_precise(dest.x:number, u:unit)"])),
            vec![
                ("dest.x".to_string(), "number".to_string()),
                ("u".to_string(), "unit".to_string())
            ]
        );
        assert!(get_parameters(&program(&["#sussy amogus"])).is_empty());
        assert!(get_parameters(&program(&["#function nothing()"])).is_empty());
    }

    #[test]
    fn test_required_var_code() {
        let (code, ty) = required_var_code("cookie").unwrap();
        assert_eq!(code.len(), 2);
        assert_eq!(ty, "number");
        assert!(required_var_code("core").is_none());
    }
}
