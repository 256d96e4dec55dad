use crate::error::RuntimeError;
use crate::vm::chunk::{Chunk, OpCode, op_from_u8};
use crate::vm::table::Strings;
use crate::vm::value::Value;

const STACK_MAX: usize = 256;

/// A stack machine over one chunk. The VM owns the string pool for the
/// duration of the run, so concatenation results intern alongside the
/// compile-time constants.
pub struct Vm {
    stack: Vec<Value>,
    strings: Strings,
}

impl Vm {
    pub fn new(strings: Strings) -> Self {
        Self {
            stack: Vec::with_capacity(STACK_MAX),
            strings,
        }
    }

    /// Execute the chunk from the top, returning the value left on the stack
    /// by `Return`. The operand stack is reset first, so a VM can be reused
    /// across chunks.
    pub fn interpret(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        self.stack.clear();
        self.run(chunk)
    }

    fn run(&mut self, chunk: &Chunk) -> Result<Value, RuntimeError> {
        let mut ip = 0;
        loop {
            let Some(&byte) = chunk.code.get(ip) else {
                return Err(RuntimeError::new(
                    "Chunk ended without a return.",
                    chunk.lines.last().copied().unwrap_or(0),
                ));
            };
            let op_ip = ip;
            ip += 1;

            match op_from_u8(byte) {
                Some(OpCode::Constant) => {
                    let index = chunk.code[ip];
                    ip += 1;
                    self.stack.push(chunk.constants[index as usize].clone());
                }
                Some(OpCode::Nil) => self.stack.push(Value::Nil),
                Some(OpCode::True) => self.stack.push(Value::Bool(true)),
                Some(OpCode::False) => self.stack.push(Value::Bool(false)),
                Some(OpCode::Not) => {
                    let value = self.pop();
                    self.stack.push(Value::Bool(value.is_falsey()));
                }
                Some(OpCode::Negate) => {
                    let value = self.pop();
                    match value {
                        Value::Number(n) => self.stack.push(Value::Number(-n)),
                        _ => {
                            return Err(self.error("Operand must be a number.", chunk, op_ip));
                        }
                    }
                }
                Some(OpCode::Equal) => {
                    let b = self.pop();
                    let a = self.pop();
                    self.stack.push(Value::Bool(a == b));
                }
                Some(OpCode::Greater) => {
                    self.binary_op(chunk, op_ip, |a, b| Value::Bool(a > b))?;
                }
                Some(OpCode::Less) => {
                    self.binary_op(chunk, op_ip, |a, b| Value::Bool(a < b))?;
                }
                Some(OpCode::Add) => {
                    let b = self.pop();
                    let a = self.pop();
                    match (&a, &b) {
                        (Value::Number(x), Value::Number(y)) => {
                            self.stack.push(Value::Number(x + y));
                        }
                        (Value::Str(x), Value::Str(y)) => {
                            let joined = format!("{}{}", x.as_str(), y.as_str());
                            let obj = self.strings.intern(joined);
                            self.stack.push(Value::Str(obj));
                        }
                        _ => {
                            return Err(self.error(
                                "Operands must be two numbers or two strings.",
                                chunk,
                                op_ip,
                            ));
                        }
                    }
                }
                Some(OpCode::Subtract) => {
                    self.binary_op(chunk, op_ip, |a, b| Value::Number(a - b))?;
                }
                Some(OpCode::Multiply) => {
                    self.binary_op(chunk, op_ip, |a, b| Value::Number(a * b))?;
                }
                Some(OpCode::Divide) => {
                    self.binary_op(chunk, op_ip, |a, b| Value::Number(a / b))?;
                }
                Some(OpCode::Return) => {
                    return Ok(self.pop());
                }
                None => {
                    return Err(self.error(&format!("Unknown opcode {byte}."), chunk, op_ip));
                }
            }
        }
    }

    fn binary_op(
        &mut self,
        chunk: &Chunk,
        op_ip: usize,
        op: fn(f64, f64) -> Value,
    ) -> Result<(), RuntimeError> {
        let b = self.pop();
        let a = self.pop();
        match (&a, &b) {
            (Value::Number(x), Value::Number(y)) => {
                self.stack.push(op(*x, *y));
                Ok(())
            }
            _ => Err(self.error("Operands must be numbers.", chunk, op_ip)),
        }
    }

    fn pop(&mut self) -> Value {
        self.stack
            .pop()
            .expect("compiled chunks keep the operand stack balanced")
    }

    /// The faulting instruction's line is the one recorded for its opcode
    /// byte.
    fn error(&self, message: &str, chunk: &Chunk, op_ip: usize) -> RuntimeError {
        RuntimeError::new(message, chunk.lines[op_ip])
    }
}
