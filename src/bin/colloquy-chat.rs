//! Interactive terminal client for the assistant service.
//!
//! # Usage
//!
//! ```bash
//! # Talk to a service on the default URL
//! colloquy-chat
//!
//! # Point at another deployment and poll health every 10 seconds
//! colloquy-chat --api-url https://assistant.example.com --health-interval-secs 10
//!
//! # Disable colors (useful for piping output)
//! colloquy-chat --no-color
//! ```
//!
//! Press Ctrl+C while waiting for a reply to stop waiting for it.  Type
//! `/help` for the list of slash commands.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use colloquy::chat::{
    ChatArgs, ChatCommand, ChatConfig, PlainTextRenderer, Renderer, help_text, parse_command,
};
use colloquy::{AssistantClient, ConnectivityMonitor, Session, Transport, TurnOutcome};

/// Main entry point for the colloquy-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("colloquy-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = AssistantClient::with_options(config.api_url.clone(), config.timeout)?;
    println!("Assistant at {}", client.base_url());
    let transport: Arc<dyn Transport> = Arc::new(client);
    let monitor =
        ConnectivityMonitor::new(Arc::clone(&transport)).with_interval(config.health_interval);
    let session = Session::with_monitor(transport, monitor);
    session.activate();

    let mut renderer = PlainTextRenderer::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;

    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    renderer.print_transcript(&session.snapshot());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        interrupted.store(false, Ordering::Relaxed);

        match rl.readline("You: ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                            renderer.print_welcome();
                        }
                        ChatCommand::Dismiss => {
                            session.dismiss_error();
                            renderer.print_info("Error dismissed.");
                        }
                        ChatCommand::Status => {
                            renderer.print_status(&session.snapshot());
                        }
                        ChatCommand::Ready => match session.check_readiness().await {
                            Ok(health) => renderer.print_info(&format!(
                                "Service {} (agent initialized: {}, version {})",
                                health.status, health.agent_initialized, health.version
                            )),
                            Err(err) => renderer.print_error(err.message()),
                        },
                        ChatCommand::Ask(question) => match session.ask_once(&question).await {
                            Ok(reply) => {
                                for line in reply.response.lines() {
                                    println!("  {line}");
                                }
                            }
                            Err(err) => renderer.print_error(err.message()),
                        },
                        ChatCommand::History => {
                            renderer.print_transcript(&session.snapshot());
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                let in_flight = match session.submit(line) {
                    Ok(in_flight) => in_flight,
                    Err(err) => {
                        renderer.print_error(err.message());
                        continue;
                    }
                };
                // The turn runs on its own task so that abandoning the wait
                // leaves the request running; its late result is discarded.
                let turn = tokio::spawn(in_flight.complete());
                let outcome = tokio::select! {
                    joined = turn => joined,
                    _ = wait_for_interrupt(&interrupted) => {
                        if session.abandon() {
                            renderer.print_info("Stopped waiting for the reply.");
                        }
                        continue;
                    }
                };
                match outcome {
                    Ok(TurnOutcome::Replied(message)) => renderer.print_message(&message),
                    Ok(TurnOutcome::Failed { acknowledgment, .. }) => {
                        renderer.print_message(&acknowledgment);
                        if let Some(error) = session.last_error() {
                            renderer.print_error_banner(&error);
                        }
                    }
                    Ok(TurnOutcome::Discarded) => {}
                    Err(err) => renderer.print_error(&format!("Request task failed: {}", err)),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    session.deactivate();
    Ok(())
}

async fn wait_for_interrupt(interrupted: &AtomicBool) {
    while !interrupted.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
