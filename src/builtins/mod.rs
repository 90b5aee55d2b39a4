//! # Built-in Functions Module
//!
//! The built-in functions available to every program as if they were bound
//! in the top-level environment: `print`, `printf`, and `input`.
//!
//! Built-ins are dispatched from a table the evaluator consults *before*
//! the user-function lookup, and they receive already-evaluated argument
//! values. All console traffic goes through the [`Console`] trait so the
//! driver decides where output lands; tests inject a capturing
//! implementation instead of process stdio.

use crate::error::RuntimeError;
use crate::value::Value;

pub mod console;

pub use console::{BufferConsole, Console, StdConsole};

/// Signature shared by every built-in: evaluated arguments in, value out,
/// console for I/O.
pub type BuiltinFn = fn(&[Value], &mut dyn Console) -> Result<Value, RuntimeError>;

/// Looks a name up in the builtin table. The evaluator checks this before
/// declaring a callee unknown.
pub fn lookup(name: &str) -> Option<BuiltinFn> {
    match name {
        "print" => Some(console::builtin_print),
        "printf" => Some(console::builtin_printf),
        "input" => Some(console::builtin_input),
        _ => None,
    }
}

pub fn is_builtin(name: &str) -> bool {
    lookup(name).is_some()
}
