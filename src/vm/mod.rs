pub mod chunk;
pub mod compiler;
pub mod table;
pub mod value;
#[allow(clippy::module_inception)]
pub mod vm;

use crate::error::InterpretError;
use crate::vm::compiler::Compiler;
use crate::vm::table::Strings;
use crate::vm::value::Value;
use crate::vm::vm::Vm;

/// Compile and run one expression, returning its value. The string pool is
/// shared between the two phases: constants interned at compile time and
/// strings built at run time live in the same table.
pub fn interpret(source: &str) -> Result<Value, InterpretError> {
    let mut strings = Strings::new();
    let chunk = Compiler::new(source, &mut strings)
        .compile()
        .map_err(InterpretError::Compile)?;
    let mut vm = Vm::new(strings);
    Ok(vm.interpret(&chunk)?)
}
