//! Compiler constants
//!
//! Compile-time values referenced from source as `$name` or `$(name)`. The table keeps insertion
//! order, which decides which constant is tried first during substitution.

use crate::settings::Settings;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a compiler constant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<ConstValue>),
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Bool(b) => write!(f, "{}", b),
            ConstValue::Number(n) => write!(f, "{}", n),
            ConstValue::String(s) => write!(f, "{}", s),
            ConstValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ConstValue {
    fn from(s: &str) -> Self {
        ConstValue::String(s.to_string())
    }
}

impl From<String> for ConstValue {
    fn from(s: String) -> Self {
        ConstValue::String(s)
    }
}

impl From<f64> for ConstValue {
    fn from(n: f64) -> Self {
        ConstValue::Number(n)
    }
}

impl From<bool> for ConstValue {
    fn from(b: bool) -> Self {
        ConstValue::Bool(b)
    }
}

/// Constant table, in lookup order
pub type Constants = IndexMap<String, ConstValue>;

/// Result of substituting constants into a line
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub text: String,
    /// Names of `$(name)` references left unresolved (only collected outside loop bodies)
    pub unresolved: Vec<String>,
}

/// Substitute compiler constants into a line.
///
/// Constants are tried in table order. For each one, the earliest occurrence of `$(name)` or
/// bare `$name` is replaced, once, before moving on. Bare references are prefix matches, so
/// with `e` ahead of `err` in the table, `$err` becomes the value of `e` followed by `rr`.
pub fn replace_compiler_constants(text: &str, constants: &Constants, inside_loop: bool) -> Substitution {
    let mut text = text.to_string();

    for (name, value) in constants {
        let parenthesized = format!("$({})", name);
        let bare = format!("${}", name);
        let hit = match (text.find(&parenthesized), text.find(&bare)) {
            (Some(p), Some(b)) if b < p => Some((b, bare.len())),
            (Some(p), _) => Some((p, parenthesized.len())),
            (None, Some(b)) => Some((b, bare.len())),
            (None, None) => None,
        };
        if let Some((start, len)) = hit {
            text.replace_range(start..start + len, &value.to_string());
        }
    }

    let unresolved = if inside_loop { Vec::new() } else { unresolved_references(&text) };
    Substitution { text, unresolved }
}

/// Names of every `$(name)` reference in a line
fn unresolved_references(text: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("$(") {
        let after = &rest[start + 2..];
        match after.find(')') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !name.contains(char::is_whitespace) {
                    names.push(name.to_string());
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}

/// Parse icon definitions of the form `63734=craters|block-craters-ui` into `_craters` constants
pub fn parse_icons(lines: &[String]) -> Constants {
    let mut icons = Constants::new();
    for line in lines {
        let Some((code, rest)) = line.trim().split_once('=') else {
            continue;
        };
        let name = rest.split('|').next().unwrap_or_default();
        let icon = code.trim().parse::<u32>().ok().and_then(char::from_u32);
        if let (Some(icon), false) = (icon, name.is_empty()) {
            icons.insert(format!("_{}", name), ConstValue::String(icon.to_string()));
        }
    }
    icons
}

/// Build the constant table for one compilation: icons, then `name`, `authors` and `filename`
/// from the settings, then the user's constants.
pub fn build_compiler_constants(icons: &Constants, settings: &Settings) -> Constants {
    let mut constants = icons.clone();
    constants.insert("name".into(), settings.name.clone().into());
    constants.insert("authors".into(), settings.authors.join(", ").into());
    constants.insert("filename".into(), settings.filename.clone().into());
    for (name, value) in &settings.compiler_constants {
        constants.insert(name.clone(), value.clone());
    }
    constants
}
