//! Slash command parsing for the chat application.
//!
//! Input starting with `/` controls the session instead of being sent to the
//! assistant service.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Clear the conversation.
    Clear,

    /// Dismiss the displayed error.
    Dismiss,

    /// Show connectivity and session state.
    Status,

    /// Query the service's readiness endpoint.
    Ready,

    /// Ask a one-shot question outside the conversation thread.
    Ask(String),

    /// Re-render the whole transcript.
    History,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be submitted as a regular message.
///
/// # Examples
///
/// ```
/// # use colloquy::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
/// assert!(parse_command("/ask what is open today?").is_some());
/// assert!(parse_command("Hello!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "dismiss" => ChatCommand::Dismiss,
        "status" => ChatCommand::Status,
        "ready" => ChatCommand::Ready,
        "ask" => match argument {
            Some(question) => ChatCommand::Ask(question.to_string()),
            None => ChatCommand::Invalid("/ask requires a question".to_string()),
        },
        "history" => ChatCommand::History,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

/// Returns the help text listing available commands.
///
/// A reply that is still pending is abandoned with Ctrl+C rather than a
/// command, since no input is read while waiting.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /clear                 Clear the conversation (thread is kept)
  /dismiss               Dismiss the current error
  /status                Show connectivity and session state
  /ready                 Query service readiness
  /ask <question>        One-shot question outside the thread
  /history               Show the whole conversation
  /help                  Show this help message
  /quit                  Exit the chat"#
}
