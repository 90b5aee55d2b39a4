// ABOUTME: Configuration and constants for the interpreter driver
// Version info, REPL banner and prompt, and history persistence

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WELCOME_MESSAGE: &str = "minic: a statically typed C-flavored interpreter";
pub const WELCOME_SUBTITLE: &str = "Type statements ending in ';'. Ctrl-D exits.";

/// Primary REPL prompt, and the continuation prompt shown while a brace
/// block is still open.
pub const PROMPT: &str = ">> ";

/// Dot-file the REPL persists line history to between sessions.
pub const HISTORY_FILE: &str = ".minic_history";

/// Printed by batch mode when the script defines no `main` function.
pub const NO_MAIN_MESSAGE: &str = "No main function found";
