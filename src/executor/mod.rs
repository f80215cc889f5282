//! The executor: runtime state and the instruction-pointer drive loop.
//!
//! Mirrors the teacher's `Core`/`TickResult` split (see `processor::logic`): a
//! [`Flow`] value comes back from each instruction, and the loop here decides
//! whether to step, jump, or stop -- control-flow opcodes never touch `ip`
//! directly, they just describe where it should go next.

mod ops;

use crate::error::Error;
use crate::frame::{FrameKind, FrameRegistry, Var};
use crate::instruction::{Arg, ArgType, Instruction, InstructionTable};
use crate::io::{InputPort, OutputPort};
use crate::label::LabelTable;
use crate::loader::Program;
use crate::stack::{CallStack, DataStack};
use crate::value::Value;

/// What should happen to the instruction pointer after one instruction runs.
pub(crate) enum Flow {
    /// Advance to the next instruction in program order.
    Next,
    /// Jump to this order next tick, with the post-increment suppressed.
    Jump(u32),
    /// Stop the whole program with this process exit code.
    Terminate(i32),
}

/// Owns every piece of runtime state named in the spec: the instruction
/// pointer, the frame registry, the data and call stacks, and the label/
/// instruction tables, plus the injected I/O ports.
pub struct Executor<'io> {
    instructions: InstructionTable,
    labels: LabelTable,
    frames: FrameRegistry,
    data_stack: DataStack,
    call_stack: CallStack,
    ip: u32,
    input: &'io mut dyn InputPort,
    stdout: &'io mut dyn OutputPort,
    stderr: &'io mut dyn OutputPort,
}

impl<'io> Executor<'io> {
    pub fn new(
        program: Program,
        input: &'io mut dyn InputPort,
        stdout: &'io mut dyn OutputPort,
        stderr: &'io mut dyn OutputPort,
    ) -> Executor<'io> {
        Executor {
            instructions: program.instructions,
            labels: program.labels,
            frames: FrameRegistry::new(),
            data_stack: DataStack::new(),
            call_stack: CallStack::new(),
            ip: 1,
            input,
            stdout,
            stderr,
        }
    }

    /// Runs the loaded program to completion and returns the process exit code:
    /// `0` on falling off the end, the `EXIT` opcode's operand, or the exit
    /// code mapped from the first error encountered (see [`Error::exit_code`]).
    pub fn run(&mut self) -> i32 {
        loop {
            if self.ip > self.instructions.last_order() {
                return 0;
            }

            let outcome = match self.instructions.get(self.ip) {
                Some(instruction) => {
                    let instruction = instruction.clone();
                    self.dispatch(&instruction)
                }
                None => Ok(Flow::Next),
            };

            match outcome {
                Ok(Flow::Next) => self.ip += 1,
                Ok(Flow::Jump(target)) => self.ip = target,
                Ok(Flow::Terminate(code)) => return code,
                Err(err) => {
                    // Best-effort: if the stream that just failed is the same one
                    // we're about to report the failure on, there's nothing more
                    // to do about it than return the original exit code anyway.
                    let _ = self.stderr.write(&format!("{}\n", err));
                    return err.exit_code();
                }
            }
        }
    }

    fn arg(&self, instruction: &Instruction, index: usize) -> Result<Arg, Error> {
        instruction.args.get(index).cloned().ok_or_else(|| {
            Error::SourceStructure(format!(
                "{:?} missing argument {}",
                instruction.opcode,
                index + 1
            ))
        })
    }

    fn check_arity(&self, instruction: &Instruction, expected: usize) -> Result<(), Error> {
        if instruction.args.len() != expected {
            return Err(Error::SourceStructure(format!(
                "{:?} expects {} argument(s), found {}",
                instruction.opcode,
                expected,
                instruction.args.len()
            )));
        }
        Ok(())
    }

    fn resolve_var(&self, arg: &Arg) -> Result<Var, Error> {
        if arg.arg_type != ArgType::Var {
            return Err(Error::SourceStructure(
                "expected a variable operand".to_string(),
            ));
        }
        parse_var(&arg.lexeme)
    }

    fn resolve_label(&self, arg: &Arg) -> Result<u32, Error> {
        if arg.arg_type != ArgType::Label {
            return Err(Error::SourceStructure("expected a label operand".to_string()));
        }
        self.labels.resolve(&arg.lexeme)
    }

    /// Resolves a `symb` operand to its value. Fails with [`Error::Value`] if
    /// it names a variable whose slot is still `Undef`, unless `allow_undef`.
    fn resolve_symb(&self, arg: &Arg, allow_undef: bool) -> Result<Value, Error> {
        match arg.arg_type {
            ArgType::Var => {
                let var = parse_var(&arg.lexeme)?;
                let value = self.frames.get(&var)?.clone();
                if value.is_undef() && !allow_undef {
                    return Err(Error::Value(format!(
                        "variable '{}' has no assigned value",
                        arg.lexeme
                    )));
                }
                Ok(value)
            }
            ArgType::Label | ArgType::Type => Err(Error::SourceStructure(
                "expected a value operand".to_string(),
            )),
            literal => literal_value(literal, &arg.lexeme),
        }
    }
}

fn parse_var(lexeme: &str) -> Result<Var, Error> {
    let (prefix, name) = lexeme
        .split_once('@')
        .ok_or_else(|| Error::SourceStructure(format!("malformed variable lexeme '{}'", lexeme)))?;
    let frame = FrameKind::from_prefix(prefix)
        .ok_or_else(|| Error::SourceStructure(format!("unknown frame '{}'", prefix)))?;
    Ok(Var {
        frame,
        name: name.to_string(),
    })
}

fn literal_value(arg_type: ArgType, lexeme: &str) -> Result<Value, Error> {
    match arg_type {
        ArgType::Int => lexeme
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| Error::OperandType(format!("invalid int literal '{}'", lexeme))),
        ArgType::Str => Ok(Value::Str(decode_string_escapes(lexeme))),
        ArgType::Bool => match lexeme {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Error::OperandType(format!("invalid bool literal '{}'", lexeme))),
        },
        ArgType::Nil => Ok(Value::Nil),
        ArgType::Var | ArgType::Label | ArgType::Type => {
            unreachable!("literal_value called with a non-literal arg type")
        }
    }
}

/// Replaces every `\DDD` escape (exactly three decimal digits) with the
/// character at that codepoint. Applied whenever a string literal becomes a
/// `Value::Str`, which leaves the observable `WRITE` output unchanged from
/// decoding at `WRITE` time (see spec §4.3).
fn decode_string_escapes(lexeme: &str) -> String {
    let chars: Vec<char> = lexeme.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\\' && i + 3 < chars.len() && chars[i + 1..=i + 3].iter().all(char::is_ascii_digit)
        {
            let code: u32 = chars[i + 1..=i + 3].iter().collect::<String>().parse().unwrap();
            if let Some(ch) = char::from_u32(code) {
                out.push(ch);
            }
            i += 4;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}
