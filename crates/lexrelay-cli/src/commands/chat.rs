use anyhow::Result;
use colored::Colorize;
use lexrelay_core::{Attachment, ChatSession, GuideKind, encode_file, prompts};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::export::write_transcript;
use super::stream::drive;

const HELP: &str = "Commands:
  /attach <file>   attach a file to your next message
  /export [path]   save the conversation as plain text
  /help            show this help
  /quit            leave the consultation";

/// A line typed at the consultation prompt
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    Attach(&'a str),
    Export(Option<&'a str>),
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));
    match name {
        "attach" if !rest.is_empty() => Input::Attach(rest),
        "export" => Input::Export(Some(rest).filter(|rest| !rest.is_empty())),
        "help" => Input::Help,
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line),
    }
}

/// Interactive consultation. A guide sends its opening prompt first.
pub async fn run(mut session: ChatSession, guide: Option<GuideKind>) -> Result<()> {
    println!(
        "{} {}",
        "LexRelay".bold(),
        "legal consultation. Type /help for commands.".dimmed()
    );

    if let Some(kind) = guide {
        println!("{}\n", kind.label().bold());
        session.send(prompts::guide(kind), Vec::new())?;
        drive(&mut session).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Vec<Attachment> = Vec::new();

    loop {
        print_prompt(&pending);
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => {}
            Input::Help => println!("{}", HELP),
            Input::Quit => break,
            Input::Unknown(line) => {
                eprintln!("{} {}", "Unknown command:".yellow(), line);
            }
            Input::Attach(path) => match encode_file(path).await {
                Ok(attachment) => {
                    println!("{} {}", "Attached".green(), attachment.name);
                    pending.push(attachment);
                }
                Err(err) => eprintln!("{} {}", "Error:".red().bold(), err),
            },
            Input::Export(path) => {
                match write_transcript(session.conversation(), path.map(Path::new)) {
                    Ok(path) => println!("{} {}", "Transcript saved to".green(), path.display()),
                    Err(err) => eprintln!("{} {:#}", "Error:".red().bold(), err),
                }
            }
            Input::Message(text) => {
                session.send(text, std::mem::take(&mut pending))?;
                drive(&mut session).await?;
            }
        }
    }

    Ok(())
}

fn print_prompt(pending: &[Attachment]) {
    use std::io::Write;

    if pending.is_empty() {
        print!("\n{} ", ">".cyan().bold());
    } else {
        print!("\n{} {} ", format!("[{} attached]", pending.len()).dimmed(), ">".cyan().bold());
    }
    let _ = std::io::stdout().flush();
}
