//! Command argument descriptors
//!
//! Arguments are written in a compact form:
//! - `name:type` a generic argument of a registered type
//! - `name:type?` optional
//! - `name:*type` an output variable
//! - `...name:type` a spread that takes every remaining token
//! - `keyword` (or `name:keyword` where `keyword` is not a type) a fixed sub-keyword

use crate::types::TypeRegistry;
use std::fmt;

/// One argument slot of a command overload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    /// A GAT name when `is_generic`, otherwise the literal the token must equal
    pub ty: String,
    pub optional: bool,
    pub is_generic: bool,
    pub is_output: bool,
    pub is_spread: bool,
}

impl Arg {
    pub fn parse(spec: &str, types: &TypeRegistry) -> Self {
        let (spec, is_spread) = match spec.strip_prefix("...") {
            Some(rest) => (rest, true),
            None => (spec, false),
        };
        let (spec, optional) = match spec.strip_suffix('?') {
            Some(rest) => (rest, true),
            None => (spec, false),
        };
        let (name, ty) = spec.split_once(':').unwrap_or((spec, spec));
        let (ty, is_output) = match ty.strip_prefix('*') {
            Some(rest) => (rest, true),
            None => (ty, false),
        };
        let is_generic = types.is_generic(ty);

        Self {
            name: name.to_string(),
            ty: ty.to_string(),
            optional,
            is_generic,
            is_output: is_output && is_generic,
            is_spread,
        }
    }

    /// Parse a space-separated argument list
    pub fn parse_list(specs: &str, types: &TypeRegistry) -> Vec<Self> {
        specs.split_whitespace().map(|spec| Self::parse(spec, types)).collect()
    }

    /// A token that fills this slot
    pub fn example<'a>(&'a self, types: &'a TypeRegistry) -> &'a str {
        if !self.is_generic {
            return &self.ty;
        }
        types.get(&self.ty).map_or(self.ty.as_str(), |gat| gat.example)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_generic {
            return write!(f, "{}", self.ty);
        }
        let (open, close) = if self.optional { ("(", ")") } else { ("[", "]") };
        write!(
            f,
            "{}{}{}:{}{}{}",
            open,
            if self.is_spread { "..." } else { "" },
            self.name,
            if self.is_output { "*" } else { "" },
            self.ty,
            close
        )
    }
}

/// Assign each of `count` tokens to the argument slot it fills.
///
/// Returns `None` when the count does not fit: too few tokens for the required slots, or too
/// many with no spread to absorb them. Slots after a spread are filled from the end.
pub fn align_args(args: &[Arg], count: usize) -> Option<Vec<&Arg>> {
    match args.iter().position(|a| a.is_spread) {
        Some(spread) => {
            let head = &args[..spread];
            let tail = &args[spread + 1..];
            if count < head.len() + tail.len() {
                return None;
            }
            let middle = count - head.len() - tail.len();
            let mut slots: Vec<&Arg> = head.iter().collect();
            slots.extend(std::iter::repeat(&args[spread]).take(middle));
            slots.extend(tail.iter());
            Some(slots)
        }
        None => {
            let required = args.iter().filter(|a| !a.optional).count();
            if count < required || count > args.len() {
                return None;
            }
            Some(args[..count].iter().collect())
        }
    }
}
