//! Terminal presentation for a conversation session.
//!
//! This module provides the pieces the `colloquy-chat` binary is built from:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`commands`]: Slash command parsing
//! - [`render`]: Rendering of transcript, status, and errors

mod commands;
mod config;
mod render;

pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use render::{PlainTextRenderer, Renderer, format_time};
