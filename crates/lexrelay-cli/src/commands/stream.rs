use anyhow::{Result, anyhow};
use colored::Colorize;
use lexrelay_core::{ChatSession, SessionEvent, SessionState};
use std::io::{self, Write};

/// Writes a growing reply to the terminal, one new suffix at a time.
#[derive(Debug, Default)]
pub struct ReplyPrinter {
    printed: usize,
}

impl ReplyPrinter {
    /// Print the part of `reply` that is not on screen yet.
    pub fn update(&mut self, reply: &str, out: &mut impl Write) -> io::Result<()> {
        match reply.get(self.printed..) {
            Some(suffix) => out.write_all(suffix.as_bytes())?,
            None => {
                // Accumulated text only grows; start over if it ever does not.
                out.write_all(b"\n")?;
                out.write_all(reply.as_bytes())?;
            }
        }
        self.printed = reply.len();
        out.flush()
    }

    pub fn has_printed(&self) -> bool {
        self.printed > 0
    }

    /// Close the reply according to how the session ended.
    pub fn finish(&mut self, session: &ChatSession, out: &mut impl Write) -> io::Result<()> {
        let reply = session.reply();
        let rest = reply.get(self.printed..).unwrap_or_default();
        match session.state() {
            SessionState::Cancelled if self.has_printed() => {
                writeln!(out, "\n{}", "[cancelled]".dimmed())?;
            }
            SessionState::Cancelled => writeln!(out, "{}", rest.yellow())?,
            SessionState::Errored if self.has_printed() => {
                writeln!(out, "\n{}", "[reply interrupted]".red())?;
            }
            SessionState::Errored => writeln!(out, "{}", rest.red())?,
            _ => {
                out.write_all(rest.as_bytes())?;
                writeln!(out)?;
            }
        }
        self.printed = reply.len();
        out.flush()
    }
}

/// Stream the in-flight reply to stdout until it ends. Ctrl-C cancels it.
pub async fn drive(session: &mut ChatSession) -> Result<SessionState> {
    let cancel = session.cancel_token();
    let mut printer = ReplyPrinter::default();
    let mut stdout = io::stdout();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = session.next_event() => {
                let Some(event) = event else {
                    break;
                };
                if let SessionEvent::Text(_) = event {
                    printer.update(session.reply(), &mut stdout)?;
                }
                if event.is_terminal() {
                    break;
                }
            }
            _ = &mut ctrl_c, if !interrupted => {
                interrupted = true;
                tracing::info!("Interrupted, cancelling reply");
                if let Some(cancel) = &cancel {
                    cancel.cancel();
                }
            }
        }
    }

    printer.finish(session, &mut stdout)?;
    if let Some((kind, message)) = session.last_failure() {
        tracing::warn!(?kind, error = message, "Reply failed");
    }
    Ok(session.state())
}

/// Stream a reply and turn a failed one into an error.
pub async fn drive_to_completion(session: &mut ChatSession) -> Result<SessionState> {
    let state = drive(session).await?;
    if state == SessionState::Errored {
        let message = session
            .last_failure()
            .map(|(_, message)| message.to_string())
            .unwrap_or_else(|| "Reply failed".to_string());
        return Err(anyhow!(message));
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_prints_only_new_suffix() {
        let mut printer = ReplyPrinter::default();
        let mut out = Vec::new();
        printer.update("Hello", &mut out).unwrap();
        printer.update("Hello, wor", &mut out).unwrap();
        printer.update("Hello, world!", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hello, world!");
        assert!(printer.has_printed());
    }

    #[test]
    fn test_update_handles_multibyte_text() {
        let mut printer = ReplyPrinter::default();
        let mut out = Vec::new();
        printer.update("§ 1", &mut out).unwrap();
        printer.update("§ 1983 claim é", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "§ 1983 claim é");
    }

    #[test]
    fn test_update_restarts_when_text_shrinks() {
        let mut printer = ReplyPrinter::default();
        let mut out = Vec::new();
        printer.update("Hello", &mut out).unwrap();
        printer.update("Hi", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Hello\nHi");
    }
}
