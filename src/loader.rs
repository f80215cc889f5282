//! Transforms a DOM-like [`Element`] tree into a validated [`InstructionTable`] and
//! [`LabelTable`].
//!
//! This is the "hard engineering" half described by the spec alongside the executor:
//! every structural rule here rejects a malformed program with
//! [`Error::SourceStructure`] before a single instruction ever runs.

use crate::dom::Element;
use crate::error::Error;
use crate::instruction::{Arg, ArgType, Instruction, InstructionTable, Opcode};
use crate::label::LabelTable;

use std::str::FromStr;

/// The result of a successful load: the ordered instructions and the label map
/// built from their `LABEL` instructions.
pub struct Program {
    pub instructions: InstructionTable,
    pub labels: LabelTable,
}

/// Loads a `program` element tree into a [`Program`].
///
/// # Errors
/// [`Error::SourceStructure`] for any structural or lexical malformation (§4.1
/// rules 1-7); [`Error::Semantic`] for a duplicate `LABEL` name.
pub fn load(root: &Element) -> Result<Program, Error> {
    if root.name != "program" {
        return Err(structure(format!(
            "root element must be 'program', found '{}'",
            root.name
        )));
    }

    let mut instructions = InstructionTable::new();
    let mut labels = LabelTable::new();

    for child in &root.children {
        if child.name != "instruction" {
            return Err(structure(format!(
                "unexpected root child element '{}'",
                child.name
            )));
        }

        let instruction = load_instruction(child)?;

        if instructions.contains(instruction.order) {
            return Err(structure(format!(
                "duplicate instruction order {}",
                instruction.order
            )));
        }

        if instruction.opcode == Opcode::LABEL {
            let name = instruction
                .args
                .first()
                .map(|a| a.lexeme.as_str())
                .ok_or_else(|| structure("LABEL requires one argument".to_string()))?;
            labels.insert(name, instruction.order)?;
        }

        instructions.insert(instruction);
    }

    Ok(Program {
        instructions,
        labels,
    })
}

fn load_instruction(element: &Element) -> Result<Instruction, Error> {
    let order_attr = element
        .attr("order")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| structure("instruction missing non-empty 'order' attribute".to_string()))?;
    let opcode_attr = element
        .attr("opcode")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| structure("instruction missing non-empty 'opcode' attribute".to_string()))?;

    let order: u32 = order_attr.parse().map_err(|_| {
        structure(format!("instruction order '{}' is not numeric", order_attr))
    })?;
    if order < 1 {
        return Err(structure(format!(
            "instruction order {} must be >= 1",
            order
        )));
    }

    let opcode_str = opcode_attr.to_uppercase();
    let opcode = Opcode::from_str(&opcode_str)
        .map_err(|_| structure(format!("unknown opcode '{}'", opcode_attr)))?;

    let args = load_args(element)?;

    Ok(Instruction {
        order,
        opcode,
        args,
    })
}

/// Enforces the `arg1`/`arg2`/`arg3` gap rule: `arg2` requires `arg1`, `arg3`
/// requires both `arg1` and `arg2`. Any other child element name is ignored.
fn load_args(element: &Element) -> Result<Vec<Arg>, Error> {
    let mut slots: [Option<&Element>; 3] = [None, None, None];

    for child in &element.children {
        let slot = match child.name.as_str() {
            "arg1" => 0,
            "arg2" => 1,
            "arg3" => 2,
            _ => continue,
        };
        if slots[slot].is_some() {
            return Err(structure(format!("duplicate '{}' element", child.name)));
        }
        slots[slot] = Some(child);
    }

    if slots[1].is_some() && slots[0].is_none() {
        return Err(structure("arg2 present without arg1".to_string()));
    }
    if slots[2].is_some() && (slots[0].is_none() || slots[1].is_none()) {
        return Err(structure("arg3 present without arg1 and arg2".to_string()));
    }

    slots
        .iter()
        .flatten()
        .map(|e| load_arg(e))
        .collect::<Result<Vec<_>, _>>()
}

fn load_arg(element: &Element) -> Result<Arg, Error> {
    let type_attr = element
        .attr("type")
        .ok_or_else(|| structure(format!("'{}' missing 'type' attribute", element.name)))?;
    let arg_type = ArgType::from_attr(type_attr)
        .ok_or_else(|| structure(format!("'{}' has unknown type '{}'", element.name, type_attr)))?;

    let lexeme = element.lexeme().to_string();

    if arg_type == ArgType::Int && lexeme.parse::<i64>().is_err() {
        return Err(structure(format!(
            "'{}' has non-numeric int lexeme '{}'",
            element.name, lexeme
        )));
    }

    Ok(Arg { arg_type, lexeme })
}

fn structure(message: String) -> Error {
    Error::SourceStructure(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instr(order: &str, opcode: &str) -> Element {
        Element::new("instruction")
            .with_attr("order", order)
            .with_attr("opcode", opcode)
    }

    fn arg(name: &str, ty: &str, text: &str) -> Element {
        Element::new(name).with_attr("type", ty).with_text(text)
    }

    #[test]
    fn rejects_wrong_root_name() {
        let root = Element::new("not_program");
        assert!(matches!(load(&root), Err(Error::SourceStructure(_))));
    }

    #[test]
    fn rejects_non_instruction_child() {
        let root = Element::new("program").with_child(Element::new("bogus"));
        assert!(matches!(load(&root), Err(Error::SourceStructure(_))));
    }

    #[test]
    fn rejects_duplicate_order() {
        let root = Element::new("program")
            .with_child(instr("1", "CREATEFRAME"))
            .with_child(instr("1", "PUSHFRAME"));
        assert!(matches!(load(&root), Err(Error::SourceStructure(_))));
    }

    #[test]
    fn rejects_arg_gap() {
        let root = Element::new("program").with_child(
            instr("1", "DEFVAR").with_child(arg("arg2", "var", "GF@x")),
        );
        assert!(matches!(load(&root), Err(Error::SourceStructure(_))));
    }

    #[test]
    fn rejects_non_numeric_int_lexeme() {
        let root = Element::new("program").with_child(
            instr("1", "PUSHS").with_child(arg("arg1", "int", "not-a-number")),
        );
        assert!(matches!(load(&root), Err(Error::SourceStructure(_))));
    }

    #[test]
    fn collects_label_table() {
        let root = Element::new("program")
            .with_child(
                instr("1", "LABEL").with_child(arg("arg1", "label", "L")),
            )
            .with_child(instr("2", "JUMP").with_child(arg("arg1", "label", "L")));

        let program = load(&root).unwrap();
        assert_eq!(program.labels.resolve("L"), Ok(1));
        assert_eq!(program.instructions.last_order(), 2);
    }

    #[test]
    fn rejects_duplicate_label() {
        let root = Element::new("program")
            .with_child(instr("1", "LABEL").with_child(arg("arg1", "label", "L")))
            .with_child(instr("2", "LABEL").with_child(arg("arg1", "label", "L")));
        assert!(matches!(load(&root), Err(Error::Semantic(_))));
    }

    #[test]
    fn opcode_is_case_normalized() {
        let root = Element::new("program").with_child(instr("1", "createframe"));
        let program = load(&root).unwrap();
        assert_eq!(program.instructions.get(1).unwrap().opcode, Opcode::CREATEFRAME);
    }
}
