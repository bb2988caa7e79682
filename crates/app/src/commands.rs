//! Parsing of REPL input lines.

/// What the user asked for on one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text, sent to the model
    Send(String),
    /// `/clear`
    Clear,
    /// `/system` without text
    ShowSystem,
    /// `/system <text>`
    SetSystem(String),
    /// `/system clear`: run without a system prompt
    ClearSystem,
    /// `/model` without a name opens the picker
    PickModel,
    /// `/model <name>`
    SwitchModel(String),
    /// `/models`
    ListModels,
    /// `/toggle <id>`
    Toggle(u64),
    Help,
    Quit,
    /// Blank line
    Empty,
    /// A slash command that could not be understood, with the reason
    Invalid(String),
}

pub const HELP: &str = "\
Commands:
  /clear            clear the conversation history
  /system           show the system prompt
  /system <text>    set the system prompt (clears history)
  /system clear     remove the system prompt (clears history)
  /model [name]     switch model (clears history)
  /models           list available models
  /toggle <id>      show or hide a thinking segment
  /help             show this help
  /quit             exit";

pub fn parse(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }
    if !trimmed.starts_with('/') {
        return Command::Send(trimmed.to_string());
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    match name {
        "/clear" => Command::Clear,
        "/system" if rest.is_empty() => Command::ShowSystem,
        "/system" if rest == "clear" => Command::ClearSystem,
        "/system" => Command::SetSystem(rest.to_string()),
        "/model" if rest.is_empty() => Command::PickModel,
        "/model" => Command::SwitchModel(rest.to_string()),
        "/models" => Command::ListModels,
        "/toggle" => match rest.trim_start_matches('#').parse::<u64>() {
            Ok(id) => Command::Toggle(id),
            Err(_) => Command::Invalid("usage: /toggle <id>".to_string()),
        },
        "/help" | "/?" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Invalid(format!("unknown command {} (try /help)", other)),
    }
}
