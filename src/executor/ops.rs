//! Per-opcode handlers, dispatched from [`super::Executor::run`].
//!
//! One `match` arm per opcode, each doing its own arity check before touching
//! any state -- arity mismatches must fail before any side effect lands, so a
//! half-executed malformed instruction never happens.

use crate::error::Error;
use crate::instruction::{ArgType, Instruction, Opcode};
use crate::value::Value;

use super::{Executor, Flow};

impl<'io> Executor<'io> {
    pub(super) fn dispatch(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        use Opcode::*;

        match instruction.opcode {
            MOVE => self.op_move(instruction),
            CREATEFRAME => {
                self.check_arity(instruction, 0)?;
                self.frames.create_frame();
                Ok(Flow::Next)
            }
            PUSHFRAME => {
                self.check_arity(instruction, 0)?;
                self.frames.push_frame()?;
                Ok(Flow::Next)
            }
            POPFRAME => {
                self.check_arity(instruction, 0)?;
                self.frames.pop_frame()?;
                Ok(Flow::Next)
            }
            DEFVAR => self.op_defvar(instruction),
            CALL => self.op_call(instruction),
            RETURN => {
                self.check_arity(instruction, 0)?;
                let target = self.call_stack.pop()?;
                Ok(Flow::Jump(target))
            }
            LABEL => {
                self.check_arity(instruction, 1)?;
                Ok(Flow::Next)
            }
            JUMP => self.op_jump(instruction),
            JUMPIFEQ => self.op_jump_if(instruction, true),
            JUMPIFNEQ => self.op_jump_if(instruction, false),
            PUSHS => self.op_pushs(instruction),
            POPS => self.op_pops(instruction),
            ADD | SUB | MUL | IDIV => self.op_arith(instruction),
            LT | GT => self.op_order(instruction),
            EQ => self.op_eq(instruction),
            AND | OR => self.op_bool_binop(instruction),
            NOT => self.op_not(instruction),
            INT2CHAR => self.op_int2char(instruction),
            STRI2INT => self.op_stri2int(instruction),
            READ => self.op_read(instruction),
            WRITE => self.op_write(instruction),
            CONCAT => self.op_concat(instruction),
            STRLEN => self.op_strlen(instruction),
            GETCHAR => self.op_getchar(instruction),
            SETCHAR => self.op_setchar(instruction),
            TYPE => self.op_type(instruction),
            DPRINT => self.op_dprint(instruction),
            BREAK => {
                self.check_arity(instruction, 0)?;
                self.stderr
                    .write(&format!("-- BREAK at instruction {} --\n", self.ip))?;
                Ok(Flow::Next)
            }
            EXIT => self.op_exit(instruction),
        }
    }

    fn op_move(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 2)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let value = self.resolve_symb(&self.arg(instruction, 1)?, false)?;
        self.frames.set(&dest, value)?;
        Ok(Flow::Next)
    }

    fn op_defvar(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let var = self.resolve_var(&self.arg(instruction, 0)?)?;
        self.frames.define(&var)?;
        Ok(Flow::Next)
    }

    fn op_call(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let target = self.resolve_label(&self.arg(instruction, 0)?)?;
        self.call_stack.push(self.ip + 1);
        Ok(Flow::Jump(target))
    }

    fn op_jump(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let target = self.resolve_label(&self.arg(instruction, 0)?)?;
        Ok(Flow::Jump(target))
    }

    fn op_jump_if(&mut self, instruction: &Instruction, branch_on_equal: bool) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let target = self.resolve_label(&self.arg(instruction, 0)?)?;
        let lhs = self.resolve_symb(&self.arg(instruction, 1)?, false)?;
        let rhs = self.resolve_symb(&self.arg(instruction, 2)?, false)?;
        let equal = values_equal(&lhs, &rhs)?;
        if equal == branch_on_equal {
            Ok(Flow::Jump(target))
        } else {
            Ok(Flow::Next)
        }
    }

    fn op_pushs(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let value = self.resolve_symb(&self.arg(instruction, 0)?, false)?;
        self.data_stack.push(value);
        Ok(Flow::Next)
    }

    fn op_pops(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let value = self.data_stack.pop()?;
        self.frames.set(&dest, value)?;
        Ok(Flow::Next)
    }

    fn op_arith(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let lhs = as_int(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        let rhs = as_int(self.resolve_symb(&self.arg(instruction, 2)?, false)?)?;

        let result = match instruction.opcode {
            Opcode::ADD => lhs.wrapping_add(rhs),
            Opcode::SUB => lhs.wrapping_sub(rhs),
            Opcode::MUL => lhs.wrapping_mul(rhs),
            Opcode::IDIV => {
                if rhs == 0 {
                    return Err(Error::OperandValue("division by zero".to_string()));
                }
                lhs / rhs
            }
            _ => unreachable!(),
        };

        self.frames.set(&dest, Value::Int(result))?;
        Ok(Flow::Next)
    }

    fn op_order(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let lhs = self.resolve_symb(&self.arg(instruction, 1)?, false)?;
        let rhs = self.resolve_symb(&self.arg(instruction, 2)?, false)?;

        let ordering = compare_ordered(&lhs, &rhs)?;
        let result = match instruction.opcode {
            Opcode::LT => ordering == std::cmp::Ordering::Less,
            Opcode::GT => ordering == std::cmp::Ordering::Greater,
            _ => unreachable!(),
        };

        self.frames.set(&dest, Value::Bool(result))?;
        Ok(Flow::Next)
    }

    fn op_eq(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let lhs = self.resolve_symb(&self.arg(instruction, 1)?, false)?;
        let rhs = self.resolve_symb(&self.arg(instruction, 2)?, false)?;
        let result = values_equal(&lhs, &rhs)?;
        self.frames.set(&dest, Value::Bool(result))?;
        Ok(Flow::Next)
    }

    fn op_bool_binop(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let lhs = as_bool(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        let rhs = as_bool(self.resolve_symb(&self.arg(instruction, 2)?, false)?)?;
        let result = match instruction.opcode {
            Opcode::AND => lhs && rhs,
            Opcode::OR => lhs || rhs,
            _ => unreachable!(),
        };
        self.frames.set(&dest, Value::Bool(result))?;
        Ok(Flow::Next)
    }

    fn op_not(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 2)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let operand = as_bool(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        self.frames.set(&dest, Value::Bool(!operand))?;
        Ok(Flow::Next)
    }

    fn op_int2char(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 2)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let code = as_int(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        let code = u32::try_from(code)
            .map_err(|_| Error::StringOperation(format!("codepoint {} out of range", code)))?;
        let ch = char::from_u32(code)
            .ok_or_else(|| Error::StringOperation(format!("codepoint {} out of range", code)))?;
        self.frames.set(&dest, Value::Str(ch.to_string()))?;
        Ok(Flow::Next)
    }

    fn op_stri2int(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let string = as_str(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        let index = as_int(self.resolve_symb(&self.arg(instruction, 2)?, false)?)?;

        let ch = char_at(&string, index)
            .ok_or_else(|| Error::StringOperation(format!("index {} out of range", index)))?;
        self.frames.set(&dest, Value::Int(ch as i64))?;
        Ok(Flow::Next)
    }

    fn op_read(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 2)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let type_arg = self.arg(instruction, 1)?;
        if type_arg.arg_type != ArgType::Type {
            return Err(Error::SourceStructure(
                "READ's second argument must carry a 'type' tag".to_string(),
            ));
        }

        let value = match type_arg.lexeme.as_str() {
            "int" => self.input.read_int().map(Value::Int),
            "string" => self.input.read_string().map(Value::Str),
            "bool" => self.input.read_bool().map(Value::Bool),
            other => {
                return Err(Error::SourceStructure(format!(
                    "READ does not support type '{}'",
                    other
                )))
            }
        }
        .unwrap_or(Value::Nil);

        self.frames.set(&dest, value)?;
        Ok(Flow::Next)
    }

    fn op_write(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let value = self.resolve_symb(&self.arg(instruction, 0)?, false)?;
        let text = value
            .write_text()
            .ok_or_else(|| Error::Value("nothing to write".to_string()))?;
        self.stdout.write(&text)?;
        Ok(Flow::Next)
    }

    fn op_concat(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let lhs = as_str(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        let rhs = as_str(self.resolve_symb(&self.arg(instruction, 2)?, false)?)?;
        self.frames.set(&dest, Value::Str(lhs + &rhs))?;
        Ok(Flow::Next)
    }

    fn op_strlen(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 2)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let s = as_str(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        self.frames.set(&dest, Value::Int(s.chars().count() as i64))?;
        Ok(Flow::Next)
    }

    fn op_getchar(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let s = as_str(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        let index = as_int(self.resolve_symb(&self.arg(instruction, 2)?, false)?)?;
        let ch = char_at(&s, index)
            .ok_or_else(|| Error::StringOperation(format!("index {} out of range", index)))?;
        self.frames.set(&dest, Value::Str(ch.to_string()))?;
        Ok(Flow::Next)
    }

    fn op_setchar(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 3)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;

        let current = self.frames.get(&dest)?.clone();
        if current.is_undef() {
            return Err(Error::Value(format!(
                "variable '{}' has no assigned value",
                dest.name
            )));
        }
        let base = as_str(current).map_err(|_| {
            Error::OperandType("SETCHAR destination must already hold a string".to_string())
        })?;

        let index = as_int(self.resolve_symb(&self.arg(instruction, 1)?, false)?)?;
        let replacement = as_str(self.resolve_symb(&self.arg(instruction, 2)?, false)?)?;
        let new_char = replacement
            .chars()
            .next()
            .ok_or_else(|| Error::StringOperation("replacement string is empty".to_string()))?;

        let mut chars: Vec<char> = base.chars().collect();
        let idx = usize::try_from(index)
            .ok()
            .filter(|&i| i < chars.len())
            .ok_or_else(|| Error::StringOperation(format!("index {} out of range", index)))?;
        chars[idx] = new_char;

        self.frames
            .set(&dest, Value::Str(chars.into_iter().collect()))?;
        Ok(Flow::Next)
    }

    fn op_type(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 2)?;
        let dest = self.resolve_var(&self.arg(instruction, 0)?)?;
        let value = self.resolve_symb(&self.arg(instruction, 1)?, true)?;
        let text = value.type_of().map(|t| t.name().to_string()).unwrap_or_default();
        self.frames.set(&dest, Value::Str(text))?;
        Ok(Flow::Next)
    }

    fn op_dprint(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let value = self.resolve_symb(&self.arg(instruction, 0)?, false)?;
        if let Some(text) = value.write_text() {
            self.stderr.write(&text)?;
        }
        Ok(Flow::Next)
    }

    fn op_exit(&mut self, instruction: &Instruction) -> Result<Flow, Error> {
        self.check_arity(instruction, 1)?;
        let code = as_int(self.resolve_symb(&self.arg(instruction, 0)?, false)?)?;
        if !(0..=9).contains(&code) {
            return Err(Error::OperandValue(format!(
                "EXIT code {} out of range [0, 9]",
                code
            )));
        }
        Ok(Flow::Terminate(code as i32))
    }
}

fn as_int(value: Value) -> Result<i64, Error> {
    value
        .as_int()
        .ok_or_else(|| Error::OperandType("expected an int operand".to_string()))
}

fn as_str(value: Value) -> Result<String, Error> {
    match value {
        Value::Str(s) => Ok(s),
        _ => Err(Error::OperandType("expected a string operand".to_string())),
    }
}

fn as_bool(value: Value) -> Result<bool, Error> {
    value
        .as_bool()
        .ok_or_else(|| Error::OperandType("expected a bool operand".to_string()))
}

fn char_at(s: &str, index: i64) -> Option<char> {
    usize::try_from(index).ok().and_then(|i| s.chars().nth(i))
}

/// `EQ`/`JUMPIFEQ`/`JUMPIFNEQ` equality: same-type comparison, with `nil`
/// allowed against any type (and simply unequal unless both sides are `nil`).
fn values_equal(lhs: &Value, rhs: &Value) -> Result<bool, Error> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(a == b),
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Nil, Value::Nil) => Ok(true),
        (Value::Nil, _) | (_, Value::Nil) => Ok(false),
        _ => Err(Error::OperandType(
            "operands to a comparison must share a type, or one must be nil".to_string(),
        )),
    }
}

/// `LT`/`GT` ordering: same-type comparison; `nil` is never orderable.
fn compare_ordered(lhs: &Value, rhs: &Value) -> Result<std::cmp::Ordering, Error> {
    match (lhs, rhs) {
        (Value::Nil, _) | (_, Value::Nil) => {
            Err(Error::OperandValue("nil has no ordering".to_string()))
        }
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        _ => Err(Error::OperandType(
            "operands to LT/GT must share a type".to_string(),
        )),
    }
}
