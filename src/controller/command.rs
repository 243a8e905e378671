//! Text commands accepted by the interactive session.

use crate::models::SizeField;
use std::str::FromStr;

/// A user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Start autoplay.
    Play,
    /// Stop autoplay.
    Pause,
    /// Play control pressed.
    Toggle,
    /// Slider moved to a year.
    Year(i32),
    /// Slider one step right.
    Next,
    /// Slider one step left.
    Prev,
    /// Size-encoding selection changed.
    Size(SizeField),
    /// Mark clicked.
    Click(String),
    /// Pointer over a mark at surface coordinates.
    Hover { key: String, x: f64, y: f64 },
    /// Pointer left the mark.
    Leave,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  play | pause | toggle        control autoplay
  year <YEAR>                  move the slider
  next | prev                  step the slider
  size <none|income|poverty|education>
  click <FIPS>                 click a mark (stops autoplay)
  hover <FIPS> <X> <Y>         show a tooltip
  leave                        hide the tooltip
  status | help | quit";

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Err("empty command".to_string());
        };
        let args: Vec<&str> = parts.collect();

        let command = match (word.to_lowercase().as_str(), args.as_slice()) {
            ("play", []) => Command::Play,
            ("pause", []) => Command::Pause,
            ("toggle" | "p", []) => Command::Toggle,
            ("year" | "y", [year]) => Command::Year(
                year.parse()
                    .map_err(|_| format!("invalid year: {}", year))?,
            ),
            ("next" | "n", []) => Command::Next,
            ("prev" | "b", []) => Command::Prev,
            ("size", [field]) => Command::Size(field.parse()?),
            ("click", [key]) => Command::Click(key.to_string()),
            ("hover", [key, x, y]) => Command::Hover {
                key: key.to_string(),
                x: x.parse().map_err(|_| format!("invalid x: {}", x))?,
                y: y.parse().map_err(|_| format!("invalid y: {}", y))?,
            },
            ("leave", []) => Command::Leave,
            ("status" | "s", []) => Command::Status,
            ("help" | "?", []) => Command::Help,
            ("quit" | "exit" | "q", []) => Command::Quit,
            (other, _) => return Err(format!("unknown command or arguments: {}", other)),
        };

        Ok(command)
    }
}
