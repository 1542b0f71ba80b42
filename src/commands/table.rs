//! The command table: Mindustry logic plus the mlogx shorthands.

use super::{
    BlockDirective, CommandDefinition, CommandKind, CompilerCommandDefinition, PortFn, Replace, ReplaceFn,
    VariableRules,
};
use crate::args::Arg;
use crate::port::PortingMode;
use crate::types::TypeRegistry;
use indexmap::IndexMap;

struct Entry {
    args: &'static str,
    description: &'static str,
    kind: CommandKind,
}

fn plain(args: &'static str, description: &'static str) -> Entry {
    Entry { args, description, kind: CommandKind::Plain }
}

fn replace(args: &'static str, description: &'static str, lines: &'static [&'static str]) -> Entry {
    Entry { args, description, kind: CommandKind::Replace(Replace::Template(lines)) }
}

fn custom(args: &'static str, description: &'static str, f: ReplaceFn) -> Entry {
    Entry { args, description, kind: CommandKind::Replace(Replace::Custom(f)) }
}

fn port(args: &'static str, description: &'static str, f: PortFn) -> Entry {
    Entry { args, description, kind: CommandKind::Port(f) }
}

fn entries() -> Vec<(&'static str, Vec<Entry>)> {
    vec![
        ("read", vec![plain(
            "output:*number building:building address:number",
            "Reads a value at the specified address in a memory cell.",
        )]),
        ("write", vec![plain(
            "value:number building:building address:number",
            "Writes a value to the specified address in a memory cell.",
        )]),
        ("print", vec![plain("message:any", "Appends a value to the message buffer.")]),
        ("draw", vec![
            plain("clear r:number g:number b:number", "Clears the display."),
            plain("color r:number g:number b:number a:number", "Sets the draw color."),
            plain("col color:number", "Sets the draw color from a packed color."),
            plain("stroke width:number", "Sets the line width."),
            plain("line x1:number y1:number x2:number y2:number", "Draws a line."),
            plain("rect x:number y:number width:number height:number", "Draws a filled rectangle."),
            plain("lineRect x:number y:number width:number height:number", "Draws a rectangle outline."),
            plain("poly x:number y:number sides:number radius:number rotation:number", "Draws a filled polygon."),
            plain("linePoly x:number y:number sides:number radius:number rotation:number", "Draws a polygon outline."),
            plain(
                "triangle x1:number y1:number x2:number y2:number x3:number y3:number",
                "Draws a filled triangle.",
            ),
            plain("image x:number y:number image:type size:number rotation:number", "Draws an item, liquid, unit or block icon."),
        ]),
        ("drawflush", vec![plain("display:building", "Flushes the draw buffer to a display.")]),
        ("printflush", vec![plain("messageblock:building", "Flushes the message buffer to a message block.")]),
        ("getlink", vec![plain("output:*building n:number", "Gets the nth linked building.")]),
        ("control", vec![
            plain("enabled building:building enabled:boolean", "Enables or disables a building."),
            plain("shoot building:building x:number y:number shoot:boolean", "Aims a turret at a position."),
            plain("shootp building:building unit:unit shoot:boolean", "Aims a turret at a unit with velocity prediction."),
            plain("config building:building config:any", "Sets the configuration of a building."),
            plain("color building:building color:number", "Sets the color of an illuminator."),
        ]),
        ("radar", vec![plain(
            "targetClass1:targetClass targetClass2:targetClass targetClass3:targetClass sortCriteria:unitSortCriteria turret:building sortOrder:number output:*unit",
            "Finds a unit near a building.",
        )]),
        ("sensor", vec![
            plain("output:*any building:building value:senseable", "Reads a property of a building."),
            plain("output:*any unit:unit value:senseable", "Reads a property of a unit."),
            custom(
                "output:*propertyAccess",
                "Reads `variable.property` into a variable of that name.",
                sensor_shorthand,
            ),
        ]),
        ("set", vec![
            Entry {
                args: "variable:*any value:any",
                description: "Sets a variable.",
                kind: CommandKind::VariableRules(VariableRules::InferFromValue),
            },
            replace(
                "variable:*any type:ctype value:any",
                "Sets a variable, declaring its type.",
                &["set %1 %3"],
            ),
        ]),
        ("op", vec![
            port(
                "operandDouble:operandDouble output:*number arg1:number arg2:number",
                "Performs an operation on two values.",
                port_op_double,
            ),
            port(
                "operandSingle:operandSingle output:*number arg1:number zero:0?",
                "Performs an operation on one value.",
                port_op_single,
            ),
            replace(
                "operandDouble:operandDouble output:*number arg2:number",
                "Performs an operation on a variable in place.",
                &["op %1 %2 %2 %3"],
            ),
            replace(
                "operandSingle:operandSingle output:*number",
                "Performs an operation on a variable in place.",
                &["op %1 %2 %2 0"],
            ),
        ]),
        ("wait", vec![plain("seconds:number", "Waits for a number of seconds.")]),
        ("lookup", vec![
            plain("block output:*buildingType n:number", "Looks up a block type by id."),
            plain("unit output:*unitType n:number", "Looks up a unit type by id."),
            plain("item output:*itemType n:number", "Looks up an item type by id."),
            plain("liquid output:*liquidType n:number", "Looks up a liquid type by id."),
        ]),
        ("packcolor", vec![plain(
            "output:*number r:number g:number b:number a:number",
            "Packs a color into a single number.",
        )]),
        ("end", vec![plain("", "Jumps back to the start of the program.")]),
        ("stop", vec![plain("", "Halts the processor.")]),
        ("noop", vec![plain("", "Does nothing.")]),
        ("jump", vec![
            plain("jumpAddress:jumpAddress always", "Jumps to a label."),
            port(
                "jumpAddress:jumpAddress operandTest:operandTest var1:any var2:any",
                "Jumps to a label if a condition holds.",
                port_jump,
            ),
            replace(
                "jumpAddress:jumpAddress var1:any operandTest:operandTest var2:any",
                "Jumps to a label if a condition holds, with the operator in the middle.",
                &["jump %1 %3 %2 %4"],
            ),
        ]),
        ("ubind", vec![plain("unitType:unitType", "Binds the next unit of a type.")]),
        ("ucontrol", vec![
            plain("idle", "Stops moving but keeps the current action."),
            plain("stop", "Stops moving and mining."),
            plain("move x:number y:number", "Moves to a position."),
            plain("approach x:number y:number radius:number", "Moves to within a radius of a position."),
            plain("boost enable:boolean", "Starts or stops boosting."),
            plain("pathfind x:number y:number", "Pathfinds to a position."),
            plain("target x:number y:number shoot:boolean", "Shoots at a position."),
            plain("targetp unit:unit shoot:boolean", "Shoots at a unit with velocity prediction."),
            plain("itemDrop building:building amount:number", "Drops items into a building."),
            plain("itemTake building:building item:itemType amount:number", "Takes items from a building."),
            plain("payDrop", "Drops the current payload."),
            plain("payTake takeUnits:boolean", "Picks up a payload."),
            plain("payEnter", "Enters the building below."),
            plain("mine x:number y:number", "Mines the ore at a position."),
            plain("flag value:number", "Sets the unit's flag."),
            plain(
                "build x:number y:number block:buildingType rotation:number config:any",
                "Builds a block.",
            ),
            plain(
                "getBlock x:number y:number type:*buildingType building:*building",
                "Reads the block at a position.",
            ),
            plain("within x:number y:number radius:number result:*boolean", "Checks whether the unit is near a position."),
            plain("unbind", "Gives control back to the unit's AI."),
        ]),
        ("uradar", vec![
            port(
                "targetClass1:targetClass targetClass2:targetClass targetClass3:targetClass sortCriteria:unitSortCriteria zero:0 sortOrder:number output:*unit",
                "Finds a unit near the bound unit.",
                port_uradar,
            ),
            replace(
                "targetClass1:targetClass targetClass2:targetClass targetClass3:targetClass sortCriteria:unitSortCriteria sortOrder:number output:*unit",
                "Finds a unit near the bound unit.",
                &["uradar %1 %2 %3 %4 0 %5 %6"],
            ),
        ]),
        ("ulocate", vec![
            replace(
                "ore ore:itemType outX:*number outY:*number found:*boolean",
                "Finds an ore.",
                &["ulocate ore core true %2 %3 %4 %5 _"],
            ),
            replace(
                "spawn outX:*number outY:*number found:*boolean building:*building",
                "Finds an enemy spawn.",
                &["ulocate spawn core true @copper %2 %3 %4 %5"],
            ),
            replace(
                "damaged outX:*number outY:*number found:*boolean building:*building",
                "Finds a damaged building.",
                &["ulocate damaged core true @copper %2 %3 %4 %5"],
            ),
            replace(
                "building group:buildingGroup enemy:boolean outX:*number outY:*number found:*boolean building:*building",
                "Finds a building.",
                &["ulocate building %2 %3 @copper %4 %5 %6 %7"],
            ),
            port(
                "find:locateFind group:buildingGroup enemy:boolean ore:itemType outX:*number outY:*number found:*boolean building:*building",
                "Finds an ore, spawn or building.",
                port_ulocate,
            ),
        ]),
        ("call", vec![replace(
            "function:jumpAddress",
            "Jumps to a label, storing the return address.",
            &["set _stack1 @counter", "op add _stack1 _stack1 2", "jump %1 always"],
        )]),
        ("return", vec![replace("", "Returns to the address stored by `call`.", &["set @counter _stack1"])]),
        ("increment", vec![replace(
            "variable:*number amount:number",
            "Adds an amount to a variable.",
            &["op add %1 %1 %2"],
        )]),
    ]
}

fn sensor_shorthand(args: &[String]) -> Vec<String> {
    let target = args.get(1).map_or("", String::as_str);
    match target.rsplit_once('.') {
        Some((variable, property)) => vec![format!("sensor {} {} @{}", target, variable, property)],
        None => vec![args.join(" ")],
    }
}

fn port_op_double(args: &[String], mode: PortingMode) -> String {
    match args {
        [_, operand, output, a, b] if output == a && mode >= PortingMode::ShortenSyntax => {
            format!("op {} {} {}", operand, output, b)
        }
        _ => args.join(" "),
    }
}

fn port_op_single(args: &[String], mode: PortingMode) -> String {
    match args {
        [_, operand, output, a] | [_, operand, output, a, _]
            if output == a && mode >= PortingMode::ShortenSyntax =>
        {
            format!("op {} {}", operand, output)
        }
        _ => args.join(" "),
    }
}

fn port_jump(args: &[String], mode: PortingMode) -> String {
    match args {
        [_, label, test, ..] if test == "always" && mode >= PortingMode::ShortenSyntax => {
            format!("jump {} always", label)
        }
        _ => args.join(" "),
    }
}

fn port_uradar(args: &[String], mode: PortingMode) -> String {
    if mode < PortingMode::ShortenSyntax {
        return args.join(" ");
    }
    args.iter()
        .enumerate()
        .filter(|(i, _)| *i != 5)
        .map(|(_, arg)| arg.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn port_ulocate(args: &[String], mode: PortingMode) -> String {
    if mode < PortingMode::ShortenSyntax {
        return args.join(" ");
    }
    match args {
        [_, find, _, _, ore, x, y, found, _] if find == "ore" => format!("ulocate ore {} {} {} {}", ore, x, y, found),
        [_, find, _, _, _, x, y, found, building] if find == "spawn" || find == "damaged" => {
            format!("ulocate {} {} {} {} {}", find, x, y, found, building)
        }
        [_, find, group, enemy, _, x, y, found, building] if find == "building" => {
            format!("ulocate building {} {} {} {} {} {}", group, enemy, x, y, found, building)
        }
        _ => args.join(" "),
    }
}

pub(super) fn commands(types: &TypeRegistry) -> IndexMap<String, Vec<CommandDefinition>> {
    entries()
        .into_iter()
        .map(|(name, overloads)| {
            let definitions = overloads
                .into_iter()
                .map(|entry| CommandDefinition {
                    name: name.to_string(),
                    args: Arg::parse_list(entry.args, types),
                    description: entry.description,
                    kind: entry.kind,
                })
                .collect();
            (name.to_string(), definitions)
        })
        .collect()
}

pub(super) fn compiler_commands(types: &TypeRegistry) -> IndexMap<String, Vec<CompilerCommandDefinition>> {
    let table: [(&str, &[(&str, &'static str, BlockDirective)]); 3] = [
        ("namespace", &[(
            "name:variable {",
            "Prefixes every variable inside the block with the namespace name.",
            BlockDirective::Namespace,
        )]),
        ("&for", &[
            (
                "variable:variable in lowerBound:number upperBound:number {",
                "Repeats the block for every integer from lowerBound to upperBound inclusive.",
                BlockDirective::ForRange,
            ),
            (
                "variable:variable of ...elements:any {",
                "Repeats the block once per listed element.",
                BlockDirective::ForEach,
            ),
        ]),
        ("&if", &[(
            "condition:boolean {",
            "Compiles the block only if the condition is true.",
            BlockDirective::If,
        )]),
    ];

    table
        .iter()
        .map(|(name, overloads)| {
            let definitions = overloads
                .iter()
                .map(|(args, description, directive)| CompilerCommandDefinition {
                    name: name.to_string(),
                    args: Arg::parse_list(args, types),
                    description: *description,
                    directive: *directive,
                })
                .collect();
            (name.to_string(), definitions)
        })
        .collect()
}
