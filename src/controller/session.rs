//! Interactive session: stdin commands and timer ticks share one queue.

use super::command::{Command, HELP};
use super::machine::{Controller, Event};
use crate::render::render_svg;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

/// Write the controller's current frame.
pub fn write_frame(controller: &Controller, path: &Path) -> Result<()> {
    let svg = render_svg(controller.renderer(), Instant::now());
    std::fs::write(path, svg)
        .with_context(|| format!("Failed to write frame to {}", path.display()))
}

/// Forward stdin lines as command events until EOF or `quit`.
pub fn spawn_stdin_reader(events: UnboundedSender<Event>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => {
                    let quit = command == Command::Quit;
                    if events.send(Event::Command(command)).is_err() || quit {
                        return;
                    }
                }
                Err(e) => eprintln!("{} (type 'help')", e),
            }
        }

        let _ = events.send(Event::Command(Command::Quit));
    })
}

/// Run the event loop until a quit command.
///
/// Events are handled one at a time; every re-render rewrites `live_path`.
pub async fn run_session(
    controller: &mut Controller,
    mut events: UnboundedReceiver<Event>,
    live_path: &Path,
) -> Result<()> {
    controller.render();
    write_frame(controller, live_path)?;

    println!("{}", HELP);
    println!("{}", controller.state());
    println!("Live frame: {}", live_path.display());

    while let Some(event) = events.recv().await {
        let outcome = controller.handle(event);

        if let Some(message) = outcome.message {
            println!("{}", message);
        }
        if let Some(patch) = outcome.patch {
            debug!(
                "{}: +{} ~{} -{}",
                controller.state().year,
                patch.entered.len(),
                patch.updated.len(),
                patch.exited.len()
            );
            println!("{}", controller.state().year);
            write_frame(controller, live_path)?;
        }
        if outcome.quit {
            break;
        }
    }

    controller.shutdown();
    Ok(())
}
