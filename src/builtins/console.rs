//! Console built-ins: print, printf, input
//!
//! - `print`: space-separated display of each argument, no newline
//! - `printf`: Go-flavored verb substitution into a format string
//! - `input`: optional prompt, then one line from standard input
//!
//! `print` and `printf` return nil; `input` returns the line as a string.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::error::RuntimeError;
use crate::value::Value;

/// Where built-ins read and write. The driver hands the evaluator a
/// [`StdConsole`]; tests hand it a [`BufferConsole`] to capture traffic.
pub trait Console {
    fn write(&mut self, text: &str);
    fn read_line(&mut self) -> Result<String, RuntimeError>;
}

/// Process stdin/stdout.
#[derive(Debug, Default)]
pub struct StdConsole;

impl Console for StdConsole {
    fn write(&mut self, text: &str) {
        print!("{}", text);
        let _ = io::stdout().flush();
    }

    fn read_line(&mut self) -> Result<String, RuntimeError> {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::runtime_error(format!("failed to read input: {}", e)))?;
        Ok(line)
    }
}

/// In-memory console for tests: collects output, serves queued input
/// lines.
#[derive(Debug, Default)]
pub struct BufferConsole {
    pub output: String,
    pub input: VecDeque<String>,
}

impl BufferConsole {
    pub fn new() -> Self {
        BufferConsole::default()
    }

    pub fn with_input(lines: &[&str]) -> Self {
        BufferConsole {
            output: String::new(),
            input: lines.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read_line(&mut self) -> Result<String, RuntimeError> {
        self.input
            .pop_front()
            .ok_or_else(|| RuntimeError::runtime_error("failed to read input: end of input"))
    }
}

/// Writes each argument's display representation, space-separated, with no
/// trailing newline. Returns nil.
pub fn builtin_print(args: &[Value], console: &mut dyn Console) -> Result<Value, RuntimeError> {
    let mut text = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            text.push(' ');
        }
        text.push_str(&arg.to_string());
    }
    console.write(&text);
    Ok(Value::Null)
}

/// Substitutes arguments into a format string and writes the result.
/// Returns nil.
pub fn builtin_printf(args: &[Value], console: &mut dyn Console) -> Result<Value, RuntimeError> {
    let Some(Value::Str(format)) = args.first() else {
        return Err(RuntimeError::type_error(
            "printf expects a format string as its first argument",
        ));
    };
    let text = format_values(format, &args[1..])?;
    console.write(&text);
    Ok(Value::Null)
}

/// Optionally writes a string prompt, reads one line, and returns it with
/// the trailing newline stripped.
pub fn builtin_input(args: &[Value], console: &mut dyn Console) -> Result<Value, RuntimeError> {
    match args {
        [] => {}
        [Value::Str(prompt)] => console.write(prompt),
        [other] => {
            return Err(RuntimeError::type_error(format!(
                "input expects a string prompt, got {}",
                other.type_name()
            )));
        }
        _ => {
            return Err(RuntimeError::runtime_error(format!(
                "input expects at most 1 argument, got {}",
                args.len()
            )));
        }
    }
    let line = console.read_line()?;
    let line = line.strip_suffix('\n').unwrap_or(&line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    Ok(Value::Str(line.to_string()))
}

/// Verb substitution for `printf`.
///
/// Supported verbs: `%d` int, `%f` float (six decimal places), `%s`
/// string, `%c` char, `%t` bool, `%v` any value, `%%` literal percent.
fn format_values(format: &str, args: &[Value]) -> Result<String, RuntimeError> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars();
    let mut next = 0usize;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb) => {
                let arg = args.get(next).ok_or_else(|| {
                    RuntimeError::runtime_error(format!(
                        "printf: missing argument for %{}",
                        verb
                    ))
                })?;
                next += 1;
                match (verb, arg) {
                    ('d', Value::Int(n)) => out.push_str(&n.to_string()),
                    ('f', Value::Float(x)) => out.push_str(&format!("{:.6}", x)),
                    ('s', Value::Str(s)) => out.push_str(s),
                    ('c', Value::Char(c)) => out.push(*c as char),
                    ('t', Value::Bool(b)) => out.push_str(if *b { "true" } else { "false" }),
                    ('v', any) => out.push_str(&any.to_string()),
                    (verb, arg) => {
                        return Err(RuntimeError::type_error(format!(
                            "printf: cannot format {} with %{}",
                            arg.type_name(),
                            verb
                        )));
                    }
                }
            }
            None => out.push('%'),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_space_separates() {
        let mut console = BufferConsole::new();
        builtin_print(
            &[Value::Int(1), Value::Str("two".into()), Value::Bool(true)],
            &mut console,
        )
        .unwrap();
        assert_eq!(console.output, "1 two true");
    }

    #[test]
    fn test_print_returns_nil() {
        let mut console = BufferConsole::new();
        let result = builtin_print(&[], &mut console).unwrap();
        assert_eq!(result, Value::Null);
        assert_eq!(console.output, "");
    }

    #[test]
    fn test_printf_verbs() {
        let mut console = BufferConsole::new();
        builtin_printf(
            &[
                Value::Str("%d %s %c %t %f %%".into()),
                Value::Int(42),
                Value::Str("hi".into()),
                Value::Char(b'x'),
                Value::Bool(false),
                Value::Float(2.5),
            ],
            &mut console,
        )
        .unwrap();
        assert_eq!(console.output, "42 hi x false 2.500000 %");
    }

    #[test]
    fn test_printf_requires_format_string() {
        let mut console = BufferConsole::new();
        let err = builtin_printf(&[Value::Int(1)], &mut console).unwrap_err();
        assert!(err.to_string().starts_with("type error:"));
    }

    #[test]
    fn test_printf_missing_argument() {
        let mut console = BufferConsole::new();
        let err = builtin_printf(&[Value::Str("%d %d".into()), Value::Int(1)], &mut console)
            .unwrap_err();
        assert!(err.to_string().contains("missing argument"));
    }

    #[test]
    fn test_printf_verb_kind_mismatch() {
        let mut console = BufferConsole::new();
        let err = builtin_printf(
            &[Value::Str("%d".into()), Value::Str("nope".into())],
            &mut console,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("type error:"));
    }

    #[test]
    fn test_input_with_prompt() {
        let mut console = BufferConsole::with_input(&["Alice\n"]);
        let result = builtin_input(&[Value::Str("name? ".into())], &mut console).unwrap();
        assert_eq!(result, Value::Str("Alice".into()));
        assert_eq!(console.output, "name? ");
    }

    #[test]
    fn test_input_strips_crlf() {
        let mut console = BufferConsole::with_input(&["line\r\n"]);
        let result = builtin_input(&[], &mut console).unwrap();
        assert_eq!(result, Value::Str("line".into()));
    }

    #[test]
    fn test_input_rejects_extra_arguments() {
        let mut console = BufferConsole::new();
        let err = builtin_input(
            &[Value::Str("a".into()), Value::Str("b".into())],
            &mut console,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at most 1"));
    }
}
