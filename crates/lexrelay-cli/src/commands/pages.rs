use anyhow::Result;
use lexrelay_core::{ChatSession, prompts};

use super::export::export_if_requested;
use super::stream::drive_to_completion;
use crate::cli::{DraftArgs, ExportArgs, InmateArgs, OsintArgs};

pub async fn draft(session: ChatSession, args: DraftArgs) -> Result<()> {
    if args.title.trim().is_empty() || args.details.trim().is_empty() {
        anyhow::bail!("Both --title and --details are required to draft a document");
    }
    let prompt = prompts::draft_document(args.kind, args.title.trim(), args.details.trim());
    send_prompt(session, prompt, &args.export).await
}

pub async fn osint(session: ChatSession, args: OsintArgs) -> Result<()> {
    if args.query.trim().is_empty() {
        anyhow::bail!("A search query is required");
    }
    let prompt = prompts::osint_search(args.kind, args.query.trim());
    send_prompt(session, prompt, &args.export).await
}

pub async fn inmate(session: ChatSession, args: InmateArgs) -> Result<()> {
    if args.state.trim().is_empty() {
        anyhow::bail!("A state is required for inmate search");
    }
    let prompt = prompts::inmate_search(
        args.state.trim(),
        args.county.as_deref(),
        args.name.as_deref(),
    );
    send_prompt(session, prompt, &args.export).await
}

async fn send_prompt(mut session: ChatSession, prompt: String, export: &ExportArgs) -> Result<()> {
    session.send(prompt, Vec::new())?;
    let outcome = drive_to_completion(&mut session).await;
    export_if_requested(session.conversation(), export)?;
    outcome.map(|_| ())
}
