mod ask;
mod chat;
mod export;
mod pages;
mod stream;

use anyhow::Result;
use lexrelay_core::{ChatSession, Page, RelayClient};

use crate::cli::{Cli, Commands};
use crate::config::{CliConfig, Settings};

pub async fn run(cli: Cli, config: CliConfig) -> Result<()> {
    let settings = config.resolve(&cli);
    tracing::info!(relay = %settings.relay_url, model = %settings.model, "Using relay");

    match cli.command {
        Commands::Chat => chat::run(open_session(&settings, Page::Chat), None).await,
        Commands::Ask(args) => ask::run(open_session(&settings, Page::Chat), args).await,
        Commands::Draft(args) => pages::draft(open_session(&settings, Page::Documents), args).await,
        Commands::Osint(args) => pages::osint(open_session(&settings, Page::Osint), args).await,
        Commands::Inmate(args) => {
            pages::inmate(open_session(&settings, Page::InmateSearch), args).await
        }
        Commands::Guide(args) => {
            chat::run(open_session(&settings, Page::Chat), Some(args.kind)).await
        }
    }
}

fn open_session(settings: &Settings, page: Page) -> ChatSession {
    let client = RelayClient::new(&settings.relay_url).with_api_key(settings.api_key.clone());
    ChatSession::new(client)
        .with_model(&settings.model)
        .with_failure_text(page.failure_text())
}
