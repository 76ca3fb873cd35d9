use anyhow::Result;
use lexrelay_core::{ChatSession, encode_file};

use super::export::export_if_requested;
use super::stream::drive_to_completion;
use crate::cli::AskArgs;

pub async fn run(mut session: ChatSession, args: AskArgs) -> Result<()> {
    let mut attachments = Vec::with_capacity(args.attachments.len());
    for path in &args.attachments {
        attachments.push(encode_file(path).await?);
    }

    session.send(args.message, attachments)?;
    let outcome = drive_to_completion(&mut session).await;
    export_if_requested(session.conversation(), &args.export)?;
    outcome.map(|_| ())
}
