//! Line parser for the interactive session loop.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Set the pending task label.
    Task(String),
    /// Start the pending task, optionally naming it first.
    Start(Option<String>),
    /// Switch away from the active task, optionally starting the next one.
    Switch(Option<String>),
    End,
    Reset,
    Status,
    Metrics,
    History,
    Tips,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    UnknownCommand(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
}

pub const HELP: &[(&str, &str)] = &[
    ("task <name>", "set the next task's name"),
    ("start [name]", "start tracking the named (or pending) task"),
    ("switch [next]", "stop the active task; start <next> if given"),
    ("end", "end the session, keeping its history"),
    ("reset", "clear the whole session"),
    ("status", "show the active task and elapsed time"),
    ("metrics", "show focus metrics"),
    ("history", "list completed tasks, newest first"),
    ("tips", "deep work tips"),
    ("help", "this list"),
    ("quit", "end the session and exit"),
];

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = (!rest.is_empty()).then(|| rest.to_string());

    let cmd = match word.to_ascii_lowercase().as_str() {
        "task" | "name" => ReplCommand::Task(arg.ok_or(CommandError::MissingArgument {
            command: "task",
            argument: "a task name",
        })?),
        "start" => ReplCommand::Start(arg),
        "switch" | "next" => ReplCommand::Switch(arg),
        "end" | "stop" => ReplCommand::End,
        "reset" => ReplCommand::Reset,
        "status" | "s" => ReplCommand::Status,
        "metrics" | "m" => ReplCommand::Metrics,
        "history" | "h" => ReplCommand::History,
        "tips" => ReplCommand::Tips,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        _ => return Err(CommandError::UnknownCommand(word.to_string())),
    };
    Ok(Some(cmd))
}
