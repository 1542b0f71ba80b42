//! Argument type lattice
//!
//! Every command argument has a generic argument type (GAT): a named validator plus the set of
//! other types it accepts as input. The registry precomputes the full acceptance graph once;
//! after that it is read-only and shared by reference.
//!
//! Two rules are hard-coded on top of the declared relation:
//! - `any` accepts and is accepted by every type
//! - `boolean` and `number` accept each other

mod builtins;

pub use builtins::is_building_link;

use crate::args::Arg;
use crate::token::Shape;
use builtins::*;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// How a GAT recognizes a token on its own
#[derive(Debug, Clone, Copy)]
pub enum Validator {
    /// A fixed set of allowed spellings
    Keywords(&'static [&'static str]),
    /// Tokens of one of these structural shapes
    Shapes(&'static [Shape]),
    /// Anything the function accepts
    Predicate(fn(&str) -> bool),
}

impl Validator {
    pub fn matches(&self, token: &str) -> bool {
        match self {
            Validator::Keywords(words) => words.contains(&token),
            Validator::Shapes(shapes) => Shape::of(token).map_or(false, |s| shapes.contains(&s)),
            Validator::Predicate(f) => f(token),
        }
    }
}

/// A generic argument type
#[derive(Debug, Clone)]
pub struct Gat {
    pub name: &'static str,
    pub validator: Validator,
    /// Types this one directly accepts as input
    pub accepts: &'static [&'static str],
    /// Whether a variable may stand in for a value of this type
    pub accepts_variables: bool,
    /// A token that is valid for this type, for rendering overloads
    pub example: &'static str,
}

/// The registered GATs and their transitive acceptance graph
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    gats: IndexMap<&'static str, Gat>,
    accepted: HashMap<&'static str, HashSet<&'static str>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(builtins::builtin_gats())
    }
}

impl TypeRegistry {
    pub fn new(gats: Vec<Gat>) -> Self {
        let gats: IndexMap<&'static str, Gat> = gats.into_iter().map(|g| (g.name, g)).collect();

        let mut accepted = HashMap::new();
        for (&name, gat) in &gats {
            let mut reachable = HashSet::new();
            let mut pending: Vec<&'static str> = gat.accepts.to_vec();
            while let Some(next) = pending.pop() {
                if reachable.insert(next) {
                    if let Some(inner) = gats.get(next) {
                        pending.extend_from_slice(inner.accepts);
                    }
                }
            }
            if gat.accepts_variables {
                reachable.insert("null");
            }
            accepted.insert(name, reachable);
        }

        Self { gats, accepted }
    }

    pub fn get(&self, name: &str) -> Option<&Gat> {
        self.gats.get(name)
    }

    /// Whether a name is a registered GAT
    pub fn is_generic(&self, name: &str) -> bool {
        self.gats.contains_key(name)
    }

    /// Whether a value of type `input` may be used where `target` is expected
    pub fn type_is_accepted(&self, input: &str, target: &str) -> bool {
        input == target
            || input == "any"
            || target == "any"
            || matches!((input, target), ("boolean", "number") | ("number", "boolean"))
            || self.accepted.get(target).map_or(false, |set| set.contains(input))
    }

    pub fn are_any_of_inputs_accepted_by_type<S: AsRef<str>>(&self, inputs: &[S], target: &str) -> bool {
        inputs.iter().any(|input| self.type_is_accepted(input.as_ref(), target))
    }

    pub fn is_input_accepted_by_any_type<S: AsRef<str>>(&self, input: &str, targets: &[S]) -> bool {
        targets.iter().any(|target| self.type_is_accepted(input, target.as_ref()))
    }

    /// Whether a variable can be passed to this argument. Output slots never count.
    pub fn accepts_variable(&self, arg: &Arg) -> bool {
        arg.is_generic && !arg.is_output && self.get(&arg.ty).map_or(false, |g| g.accepts_variables)
    }

    /// Whether a token is valid for a type.
    ///
    /// Non-generic types only match their own spelling. Otherwise the type's validator is tried
    /// first, then the token's classified type is checked against the acceptance graph. A
    /// plain variable is valid wherever the type accepts variables.
    pub fn is_arg_valid_for_type(&self, token: &str, ty: &str) -> bool {
        if token.is_empty() {
            return false;
        }
        let Some(gat) = self.get(ty) else {
            return token == ty;
        };
        if gat.name == "any" || gat.validator.matches(token) {
            return true;
        }
        match typeof_arg(token) {
            "variable" => gat.accepts_variables,
            classified => self.type_is_accepted(classified, ty),
        }
    }

    /// Whether a token is valid for an argument slot
    pub fn is_arg_valid_for(&self, token: &str, arg: &Arg) -> bool {
        if arg.is_generic {
            self.is_arg_valid_for_type(token, &arg.ty)
        } else {
            token == arg.ty
        }
    }
}

/// Classify a token by its structural form.
///
/// Tokens that are not literals, engine values, operator names or linked buildings are
/// `variable`.
pub fn typeof_arg(token: &str) -> &'static str {
    match Shape::of(token) {
        Some(Shape::String) => return "string",
        Some(Shape::Number) => return "number",
        Some(Shape::Ctype) => return "ctype",
        Some(Shape::EngineConst) => return typeof_engine_value(token),
        _ => {}
    }
    match token {
        "true" | "false" => "boolean",
        "null" => "null",
        _ if OPERAND_TEST.contains(&token) => "operandTest",
        _ if OPERAND_DOUBLE.contains(&token) => "operandDouble",
        _ if OPERAND_SINGLE.contains(&token) => "operandSingle",
        _ if is_building_link(token) => "building",
        _ => "variable",
    }
}

fn typeof_engine_value(token: &str) -> &'static str {
    let tables: [(&[&str], &'static str); 7] = [
        (NUMERIC_ENGINE_VALUES, "number"),
        (TEAMS, "team"),
        (SENSOR_PROPERTIES, "senseable"),
        (ITEMS, "itemType"),
        (LIQUIDS, "liquidType"),
        (UNITS, "unitType"),
        (BLOCKS, "buildingType"),
    ];
    match token {
        "@unit" => "unit",
        "@this" => "building",
        _ => tables
            .iter()
            .find(|(table, _)| table.contains(&token))
            .map_or("any", |(_, ty)| *ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typeof_arg() {
        let cases = [
            ("@unit", "unit"),
            ("@thisx", "number"),
            ("@this", "building"),
            ("greaterThanEq", "operandTest"),
            ("-50.2", "number"),
            ("\"amogus\"", "string"),
            (":number", "ctype"),
            ("@malis", "team"),
            ("cell1", "building"),
            ("true", "boolean"),
            ("x", "variable"),
        ];
        for (token, expected) in cases {
            assert_eq!(typeof_arg(token), expected, "{}", token);
        }
    }

    #[test]
    fn test_valid_types() {
        let types = TypeRegistry::default();
        let cases = [
            ("@unit", "unit"),
            ("@thisx", "number"),
            ("@this", "building"),
            ("greaterThanEq", "operandTest"),
            ("-50.2", "number"),
            ("\"amogus\"", "string"),
            ("sussyFlarogus", "unit"),
            (":number", "ctype"),
            ("add", "operandDouble"),
            ("cos", "operandSingle"),
            ("@green", "team"),
            ("amogus", "team"),
            ("equal", "operandDouble"),
        ];
        for (token, ty) in cases {
            assert!(types.is_arg_valid_for_type(token, ty), "{} should be {}", token, ty);
        }
    }

    #[test]
    fn test_invalid_types() {
        let types = TypeRegistry::default();
        let cases = [
            ("@unit", "building"),
            ("@thisx", "operandTest"),
            ("@this", "string"),
            ("greaterThanEq", "buildingGroup"),
            ("-50.2", "unit"),
            ("\"amogus\"", "number"),
            (":number", "variable"),
            ("", "any"),
        ];
        for (token, ty) in cases {
            assert!(!types.is_arg_valid_for_type(token, ty), "{} should not be {}", token, ty);
        }
    }

    #[test]
    fn test_literal_types() {
        let types = TypeRegistry::default();
        assert!(types.is_arg_valid_for_type("amogus", "amogus"));
        assert!(!types.is_arg_valid_for_type("sus", "amogus"));
    }

    #[test]
    fn test_type_is_accepted() {
        let types = TypeRegistry::default();
        assert!(types.type_is_accepted("number", "number"));
        assert!(types.type_is_accepted("operandSingle", "operandSingle"));
        assert!(types.type_is_accepted("boolean", "number"));
        assert!(types.type_is_accepted("number", "boolean"));
        assert!(types.type_is_accepted("any", "jumpAddress"));
        assert!(types.type_is_accepted("unit", "any"));
        assert!(types.type_is_accepted("itemType", "senseable"));
        assert!(types.type_is_accepted("null", "building"));
        assert!(!types.type_is_accepted("number", "string"));
        assert!(!types.type_is_accepted("operandSingle", "ctype"));
        assert!(!types.type_is_accepted("senseable", "itemType"));
    }

    #[test]
    fn test_any_of_inputs() {
        let types = TypeRegistry::default();
        assert!(types.are_any_of_inputs_accepted_by_type(&["building", "type", "number"], "number"));
        assert!(types.are_any_of_inputs_accepted_by_type(&["any", "operandTest"], "number"));
        assert!(!types.are_any_of_inputs_accepted_by_type(&["building", "type"], "number"));
        assert!(!types.are_any_of_inputs_accepted_by_type(&["jumpAddress", "unit"], "boolean"));
        assert!(types.is_input_accepted_by_any_type("number", &["any", "operandTest"]));
        assert!(types.is_input_accepted_by_any_type("itemType", &["senseable"]));
        assert!(!types.is_input_accepted_by_any_type("boolean", &["jumpAddress", "unit"]));
    }

    #[test]
    fn test_accepts_variable() {
        let types = TypeRegistry::default();
        assert!(types.accepts_variable(&Arg::parse("target:unit", &types)));
        assert!(types.accepts_variable(&Arg::parse("target:number", &types)));
        assert!(!types.accepts_variable(&Arg::parse("target:*unit", &types)));
        assert!(!types.accepts_variable(&Arg::parse("thing:buildingGroup", &types)));
        assert!(!types.accepts_variable(&Arg::parse("thing:ctype", &types)));
        assert!(!types.accepts_variable(&Arg::parse("thing:unitSortCriteria", &types)));
    }
}
