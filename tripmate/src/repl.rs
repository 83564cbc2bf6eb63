use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::Result;
use crate::services::PlannerSession;

pub const HELP_TEXT: &str = "Commands:
  /generate   turn the conversation into a saved trip
  /trips      list saved trips
  /trip <id>  show one saved trip with its days and items
  /help       show this help
  /quit       exit (Ctrl-D works too)
End a line with \\ to continue your message on the next line.
Start a message with // to send a line that begins with /.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Generate,
    Trips,
    Trip(i64),
    Help,
    Quit,
    /// A known command used with bad arguments.
    Usage(&'static str),
    Unknown(String),
}

pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if let Some(escaped) = trimmed.strip_prefix("//") {
        return Command::Chat(format!("/{escaped}"));
    }
    let Some(command_line) = trimmed.strip_prefix('/') else {
        return Command::Chat(trimmed.to_string());
    };

    let mut parts = command_line.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    match (name.as_str(), arg) {
        ("generate", None) => Command::Generate,
        ("trips", None) => Command::Trips,
        ("trip", Some(id)) => match id.parse::<i64>() {
            Ok(id) if parts.next().is_none() => Command::Trip(id),
            _ => Command::Usage("Usage: /trip <id>"),
        },
        ("trip", None) => Command::Usage("Usage: /trip <id>"),
        ("help", None) => Command::Help,
        ("quit" | "exit", None) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Joins physical input lines into one message. A line ending in `\`
/// continues on the next line.
#[derive(Debug, Default)]
pub struct InputBuffer {
    pending: Vec<String>,
}

impl InputBuffer {
    pub fn is_continuing(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Feed one line; returns the complete message once it is finished.
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(head) = line.strip_suffix('\\') {
            self.pending.push(head.to_string());
            return None;
        }
        self.pending.push(line.to_string());
        Some(std::mem::take(&mut self.pending).join("\n"))
    }

    /// Whatever was pending when input ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.pending).join("\n"))
    }
}

fn print_prompt(continuing: bool) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", if continuing { "… " } else { "> " })?;
    stdout.flush()?;
    Ok(())
}

/// Read messages and commands until `/quit` or end of input.
pub async fn run<R>(session: &mut PlannerSession, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut buffer = InputBuffer::default();

    loop {
        print_prompt(buffer.is_continuing())?;
        let message = match lines.next_line().await? {
            Some(line) => match buffer.push_line(&line) {
                Some(message) => message,
                None => continue,
            },
            None => {
                // EOF: send a half-typed continuation before leaving.
                if let Some(message) = buffer.finish() {
                    dispatch(session, parse_command(&message)).await;
                }
                break;
            }
        };

        if !dispatch(session, parse_command(&message)).await {
            break;
        }
    }

    tracing::debug!(turns = session.conversation().len(), "Interactive session ended");
    Ok(())
}

/// Returns `false` when the session should end.
async fn dispatch(session: &mut PlannerSession, command: Command) -> bool {
    match command {
        Command::Quit => return false,
        Command::Help => session.presenter().notify(HELP_TEXT),
        Command::Usage(usage) => session.presenter().notify(usage),
        Command::Unknown(input) => session
            .presenter()
            .notify(&format!("Unknown command: {input}\n{HELP_TEXT}")),
        Command::Generate => {
            session.generate_trip().await;
        }
        // Failures are already rendered by the session.
        Command::Trips => {
            let _ = session.show_trips().await;
        }
        Command::Trip(id) => {
            let _ = session.show_trip(id).await;
        }
        Command::Chat(text) => {
            session.send_message(&text).await;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("/generate"), Command::Generate);
        assert_eq!(parse_command("  /TRIPS "), Command::Trips);
        assert_eq!(parse_command("/trip 12"), Command::Trip(12));
        assert_eq!(parse_command("/help"), Command::Help);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/exit"), Command::Quit);
    }

    #[test]
    fn test_parse_bad_trip_arguments() {
        assert_eq!(parse_command("/trip"), Command::Usage("Usage: /trip <id>"));
        assert_eq!(parse_command("/trip kyoto"), Command::Usage("Usage: /trip <id>"));
        assert_eq!(parse_command("/trip 1 2"), Command::Usage("Usage: /trip <id>"));
    }

    #[test]
    fn test_parse_chat_and_unknown() {
        assert_eq!(
            parse_command("  3 days in Kyoto please "),
            Command::Chat("3 days in Kyoto please".to_string())
        );
        assert_eq!(parse_command("/save"), Command::Unknown("/save".to_string()));
        assert_eq!(parse_command("/generate now"), Command::Unknown("/generate now".to_string()));
    }

    #[test]
    fn test_double_slash_sends_chat_starting_with_slash() {
        assert_eq!(
            parse_command("//r/JapanTravel recommends Nara"),
            Command::Chat("/r/JapanTravel recommends Nara".to_string())
        );
        assert!(HELP_TEXT.contains("//"));
    }

    #[test]
    fn test_input_buffer_joins_continued_lines() {
        let mut buffer = InputBuffer::default();

        assert_eq!(buffer.push_line("Day 1: temples\\"), None);
        assert!(buffer.is_continuing());
        assert_eq!(buffer.push_line("Day 2: food\\"), None);
        assert_eq!(
            buffer.push_line("Day 3: rest"),
            Some("Day 1: temples\nDay 2: food\nDay 3: rest".to_string())
        );
        assert!(!buffer.is_continuing());
    }

    #[test]
    fn test_input_buffer_single_line_and_finish() {
        let mut buffer = InputBuffer::default();
        assert_eq!(buffer.push_line("hello\r"), Some("hello".to_string()));
        assert_eq!(buffer.finish(), None);

        buffer.push_line("unfinished\\");
        assert_eq!(buffer.finish(), Some("unfinished".to_string()));
    }
}
