//! Built-in generic argument types and the engine's keyword tables.

use super::{Gat, Validator};
use crate::token::Shape;

pub const TEAMS: &[&str] = &["@derelict", "@sharded", "@crux", "@malis", "@green", "@blue"];

/// Read-only processor values that evaluate to numbers
pub const NUMERIC_ENGINE_VALUES: &[&str] = &[
    "@thisx", "@thisy", "@ipt", "@counter", "@links", "@time", "@tick", "@second", "@minute",
    "@waveNumber", "@waveTime", "@mapw", "@maph",
];

pub const ITEMS: &[&str] = &[
    "@copper", "@lead", "@metaglass", "@graphite", "@sand", "@coal", "@titanium", "@thorium",
    "@scrap", "@silicon", "@plastanium", "@phase-fabric", "@surge-alloy", "@spore-pod",
    "@blast-compound", "@pyratite",
];

pub const LIQUIDS: &[&str] = &["@water", "@slag", "@oil", "@cryofluid"];

pub const UNITS: &[&str] = &[
    "@dagger", "@mace", "@fortress", "@scepter", "@reign", "@nova", "@pulsar", "@quasar",
    "@vela", "@corvus", "@crawler", "@atrax", "@spiroct", "@arkyid", "@toxopid", "@flare",
    "@horizon", "@zenith", "@antumbra", "@eclipse", "@mono", "@poly", "@mega", "@quad", "@oct",
    "@risso", "@minke", "@bryde", "@sei", "@omura", "@retusa", "@oxynoe", "@cyerce",
    "@aegires", "@navanax", "@alpha", "@beta", "@gamma",
];

pub const BLOCKS: &[&str] = &[
    "@air", "@solid", "@conveyor", "@titanium-conveyor", "@junction", "@router", "@sorter",
    "@inverted-sorter", "@overflow-gate", "@underflow-gate", "@bridge-conveyor", "@unloader",
    "@container", "@vault", "@core-shard", "@core-foundation", "@core-nucleus", "@duo",
    "@scatter", "@hail", "@lancer", "@arc", "@wave", "@salvo", "@ripple", "@cyclone",
    "@fuse", "@spectre", "@meltdown", "@foreshadow", "@memory-cell", "@memory-bank",
    "@message", "@switch", "@micro-processor", "@logic-processor", "@hyper-processor",
    "@logic-display", "@large-logic-display", "@power-node", "@battery", "@mender",
    "@thorium-reactor", "@impact-reactor",
];

/// Properties readable with `sensor`
pub const SENSOR_PROPERTIES: &[&str] = &[
    "@totalItems", "@firstItem", "@totalLiquids", "@totalPower", "@itemCapacity",
    "@liquidCapacity", "@powerCapacity", "@powerNetStored", "@powerNetCapacity", "@powerNetIn",
    "@powerNetOut", "@ammo", "@totalAmmo", "@ammoCapacity", "@health", "@maxHealth", "@heat",
    "@efficiency", "@progress", "@timescale", "@rotation", "@x", "@y", "@shootX", "@shootY",
    "@size", "@dead", "@range", "@shooting", "@boosting", "@mineX", "@mineY", "@mining",
    "@speed", "@team", "@type", "@flag", "@controlled", "@controller", "@name",
    "@payloadCount", "@payloadType", "@enabled", "@config", "@color",
];

pub const OPERAND_TEST: &[&str] = &[
    "equal", "notEqual", "lessThan", "lessThanEq", "greaterThan", "greaterThanEq",
    "strictEqual", "always",
];

pub const OPERAND_DOUBLE: &[&str] = &[
    "add", "sub", "mul", "div", "idiv", "mod", "pow", "equal", "notEqual", "land", "lessThan",
    "lessThanEq", "greaterThan", "greaterThanEq", "strictEqual", "shl", "shr", "or", "and",
    "xor", "max", "min", "angle", "len", "noise",
];

pub const OPERAND_SINGLE: &[&str] = &[
    "not", "abs", "log", "log10", "floor", "ceil", "sqrt", "rand", "sin", "cos", "tan", "asin",
    "acos", "atan",
];

pub const BUILDING_GROUPS: &[&str] = &[
    "core", "storage", "generator", "turret", "factory", "repair", "rally", "battery",
    "reactor",
];

pub const UNIT_SORT_CRITERIA: &[&str] = &["distance", "health", "shield", "armor", "maxHealth"];

pub const TARGET_CLASSES: &[&str] = &[
    "any", "enemy", "ally", "player", "attacker", "flying", "boss", "ground",
];

pub const LOCATE_FINDS: &[&str] = &["ore", "building", "spawn", "damaged"];

/// Name stems the game uses when linking a block to a processor (`cell1`, `nucleus2`, ...)
pub const BUILDING_LINK_STEMS: &[&str] = &[
    "cell", "bank", "message", "switch", "display", "processor", "shard", "foundation",
    "nucleus", "conveyor", "junction", "router", "sorter", "gate", "bridge", "unloader",
    "container", "vault", "duo", "scatter", "hail", "lancer", "arc", "wave", "salvo", "ripple",
    "cyclone", "fuse", "spectre", "meltdown", "foreshadow", "node", "battery", "mender",
    "reactor", "door", "factory", "smelter", "drill",
];

/// Whether a token names a processor-linked building, e.g. `cell1`
pub fn is_building_link(token: &str) -> bool {
    let stem = token.trim_end_matches(|c: char| c.is_ascii_digit());
    stem.len() < token.len() && BUILDING_LINK_STEMS.contains(&stem)
}

fn is_jump_address(token: &str) -> bool {
    token.parse::<u32>().is_ok() || Shape::of(token) == Some(Shape::Identifier)
}

/// `variable.property`, the `sensor` shorthand
fn is_property_access(token: &str) -> bool {
    match token.rsplit_once('.') {
        Some((variable, property)) => {
            !variable.is_empty()
                && Shape::of(variable) == Some(Shape::Identifier)
                && SENSOR_PROPERTIES.iter().any(|p| p[1..] == *property)
        }
        None => false,
    }
}

fn is_building(token: &str) -> bool {
    token == "@this" || is_building_link(token)
}

fn anything(_: &str) -> bool {
    true
}

macro_rules! gat {
    ($name:expr, $validator:expr, accepts: [$($accepts:expr),*], variables: $vars:expr, example: $example:expr) => {
        Gat {
            name: $name,
            validator: $validator,
            accepts: &[$($accepts),*],
            accepts_variables: $vars,
            example: $example,
        }
    };
}

/// Every built-in generic argument type, in registration order
pub fn builtin_gats() -> Vec<Gat> {
    use Validator::*;
    vec![
        gat!("any", Predicate(anything), accepts: [], variables: true, example: "x"),
        gat!("null", Keywords(&["null"]), accepts: [], variables: true, example: "null"),
        gat!("variable", Shapes(&[Shape::Identifier]), accepts: [], variables: true, example: "x"),
        gat!("number", Shapes(&[Shape::Number]), accepts: [], variables: true, example: "5"),
        gat!("boolean", Keywords(&["true", "false"]), accepts: [], variables: true, example: "true"),
        gat!("string", Shapes(&[Shape::String]), accepts: [], variables: true, example: "\"text\""),
        gat!("itemType", Keywords(ITEMS), accepts: [], variables: true, example: "@copper"),
        gat!("liquidType", Keywords(LIQUIDS), accepts: [], variables: true, example: "@water"),
        gat!("unitType", Keywords(UNITS), accepts: [], variables: true, example: "@flare"),
        gat!("buildingType", Keywords(BLOCKS), accepts: [], variables: true, example: "@router"),
        gat!(
            "type",
            Keywords(&[]),
            accepts: ["itemType", "liquidType", "unitType", "buildingType"],
            variables: true,
            example: "@copper"
        ),
        gat!("building", Predicate(is_building), accepts: [], variables: true, example: "cell1"),
        gat!("unit", Keywords(&["@unit"]), accepts: [], variables: true, example: "@unit"),
        gat!("team", Keywords(TEAMS), accepts: [], variables: true, example: "@sharded"),
        gat!(
            "senseable",
            Keywords(SENSOR_PROPERTIES),
            accepts: ["itemType", "liquidType", "unit", "building"],
            variables: true,
            example: "@x"
        ),
        gat!("jumpAddress", Predicate(is_jump_address), accepts: [], variables: false, example: "label"),
        gat!("operandTest", Keywords(OPERAND_TEST), accepts: [], variables: false, example: "lessThan"),
        gat!("operandDouble", Keywords(OPERAND_DOUBLE), accepts: [], variables: false, example: "add"),
        gat!("operandSingle", Keywords(OPERAND_SINGLE), accepts: [], variables: false, example: "abs"),
        gat!("ctype", Shapes(&[Shape::Ctype]), accepts: [], variables: false, example: ":number"),
        gat!("buildingGroup", Keywords(BUILDING_GROUPS), accepts: [], variables: false, example: "core"),
        gat!(
            "unitSortCriteria",
            Keywords(UNIT_SORT_CRITERIA),
            accepts: [],
            variables: false,
            example: "distance"
        ),
        gat!("targetClass", Keywords(TARGET_CLASSES), accepts: [], variables: false, example: "enemy"),
        gat!("locateFind", Keywords(LOCATE_FINDS), accepts: [], variables: false, example: "ore"),
        gat!(
            "propertyAccess",
            Predicate(is_property_access),
            accepts: [],
            variables: false,
            example: "building.x"
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_building_links() {
        assert!(is_building_link("cell1"));
        assert!(is_building_link("nucleus12"));
        assert!(!is_building_link("cell"));
        assert!(!is_building_link("x1"));
    }

    #[test]
    fn test_property_access() {
        assert!(is_property_access("building.x"));
        assert!(is_property_access("core.totalItems"));
        assert!(!is_property_access("building.sus"));
        assert!(!is_property_access(".x"));
        assert!(!is_property_access("x"));
    }

    #[test]
    fn test_examples_match_their_validators() {
        for gat in builtin_gats() {
            if let Validator::Keywords(&[]) = gat.validator {
                continue;
            }
            assert!(gat.validator.matches(gat.example), "{}", gat.name);
        }
    }
}
