//! Output rendering for the chat application.
//!
//! The renderer is the terminal presentation layer: it draws whatever the
//! session currently exposes and never mutates session state.

use std::io::{self, Stdout, Write};

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::session::SessionSnapshot;
use crate::types::{Connectivity, Message, MessageRole};

/// ANSI escape code for dim text (used for timestamps).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for speaker labels).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for the user label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for green text (used when connected).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for red text (used for errors and when disconnected).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for yellow text (used while connectivity is unknown).
const ANSI_YELLOW: &str = "\x1b[33m";

const WELCOME: &str =
    "Welcome! Ask me anything about programs, courses, regulations, or student life.";

/// Trait for rendering session output.
pub trait Renderer: Send {
    /// Print one transcript entry.
    fn print_message(&mut self, message: &Message);

    /// Print the banner shown while the transcript is empty.
    fn print_welcome(&mut self);

    /// Print the connectivity indicator and lifecycle state.
    fn print_status(&mut self, snapshot: &SessionSnapshot);

    /// Print the error banner for the session's last error.
    fn print_error_banner(&mut self, error: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print the whole transcript, or the welcome banner if it is empty.
    fn print_transcript(&mut self, snapshot: &SessionSnapshot) {
        if snapshot.messages.is_empty() {
            self.print_welcome();
        }
        for message in &snapshot.messages {
            self.print_message(message);
        }
    }
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    out: W,
    use_color: bool,
    offset: UtcOffset,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        Self::with_writer(io::stdout(), use_color, offset)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer writing to `out`, showing times at `offset`.
    pub fn with_writer(out: W, use_color: bool, offset: UtcOffset) -> Self {
        Self {
            out,
            use_color,
            offset,
        }
    }

    /// Consumes the renderer and returns its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn print_message(&mut self, message: &Message) {
        let (label, color) = match message.role {
            MessageRole::User => ("You", ANSI_CYAN),
            MessageRole::Assistant => ("Assistant", ANSI_BOLD),
        };
        let header = format!(
            "{} {}",
            self.styled(color, label),
            self.styled(ANSI_DIM, &format_time(message.timestamp, self.offset))
        );
        self.emit(&header);
        for line in message.content.lines() {
            self.emit(&format!("  {line}"));
        }
    }

    fn print_welcome(&mut self) {
        let text = self.styled(ANSI_DIM, WELCOME);
        self.emit(&text);
    }

    fn print_status(&mut self, snapshot: &SessionSnapshot) {
        let color = match snapshot.connectivity {
            Connectivity::Unknown => ANSI_YELLOW,
            Connectivity::Connected => ANSI_GREEN,
            Connectivity::Disconnected => ANSI_RED,
        };
        let indicator = self.styled(color, snapshot.connectivity.label());
        let state = if snapshot.pending {
            "waiting for response"
        } else {
            "ready"
        };
        self.emit(&format!(
            "[{indicator}] {state} | {} message(s) | {}",
            snapshot.messages.len(),
            snapshot.thread_id
        ));
        if let Some(error) = &snapshot.last_error {
            self.print_error_banner(error);
        }
    }

    fn print_error_banner(&mut self, error: &str) {
        let text = self.styled(ANSI_RED, &format!("! {error} (type /dismiss to hide)"));
        self.emit(&text);
    }

    fn print_error(&mut self, error: &str) {
        let text = self.styled(ANSI_RED, &format!("Error: {error}"));
        self.emit(&text);
    }

    fn print_info(&mut self, info: &str) {
        let text = self.styled(ANSI_DIM, info);
        self.emit(&text);
    }
}

/// Formats a message timestamp as `HH:MM` at the given offset.
pub fn format_time(timestamp: OffsetDateTime, offset: UtcOffset) -> String {
    timestamp
        .to_offset(offset)
        .format(format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| "--:--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    fn renderer() -> PlainTextRenderer<Vec<u8>> {
        PlainTextRenderer::with_writer(Vec::new(), false, UtcOffset::UTC)
    }

    fn output(renderer: PlainTextRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn snapshot(messages: Vec<Message>) -> SessionSnapshot {
        SessionSnapshot {
            thread_id: "thread-abc1234".to_string(),
            messages,
            pending: false,
            last_error: None,
            connectivity: Connectivity::Unknown,
        }
    }

    #[test]
    fn time_is_hours_and_minutes() {
        let ts = datetime!(2024-05-01 09:05:59 UTC);
        assert_eq!(format_time(ts, UtcOffset::UTC), "09:05");
        assert_eq!(format_time(ts, offset!(+2)), "11:05");
    }

    #[test]
    fn message_rendering() {
        let mut r = renderer();
        r.print_message(&Message::new(
            "abc1234",
            "line one\nline two",
            MessageRole::Assistant,
            datetime!(2024-05-01 14:30:00 UTC),
        ));
        assert_eq!(output(r), "Assistant 14:30\n  line one\n  line two\n");
    }

    #[test]
    fn empty_transcript_shows_welcome() {
        let mut r = renderer();
        r.print_transcript(&snapshot(vec![]));
        assert!(output(r).starts_with("Welcome!"));
    }

    #[test]
    fn status_shows_label_and_error() {
        let mut r = renderer();
        let mut snap = snapshot(vec![]);
        snap.connectivity = Connectivity::Disconnected;
        snap.last_error = Some("Service unavailable".to_string());
        r.print_status(&snap);
        let text = output(r);
        assert!(text.starts_with("[Disconnected] ready | 0 message(s) | thread-abc1234\n"));
        assert!(text.contains("! Service unavailable (type /dismiss to hide)"));
    }

    #[test]
    fn color_wraps_labels() {
        let mut r = PlainTextRenderer::with_writer(Vec::new(), true, UtcOffset::UTC);
        r.print_status(&snapshot(vec![]));
        let text = output(r);
        assert!(text.contains(&format!("{ANSI_YELLOW}Checking...{ANSI_RESET}")));
    }
}
