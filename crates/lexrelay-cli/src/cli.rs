use clap::{Args, Parser, Subcommand};
use lexrelay_core::{DocumentKind, GuideKind, OsintKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lexrelay")]
#[command(version, about = "LexRelay - streaming legal assistant in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Relay base URL (defaults to http://127.0.0.1:8080)
    #[arg(long, global = true, env = "LEXRELAY_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Bearer key presented to the relay
    #[arg(long, global = true, env = "LEXRELAY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model requested from the relay
    #[arg(long, global = true, env = "LEXRELAY_MODEL")]
    pub model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive legal consultation
    Chat,

    /// Ask a single question and stream the answer
    Ask(AskArgs),

    /// Draft a legal document
    Draft(DraftArgs),

    /// Public-records (OSINT) research guidance
    Osint(OsintArgs),

    /// Find where an inmate is held
    Inmate(InmateArgs),

    /// Start a self-representation guide, then keep chatting
    Guide(GuideArgs),
}

/// Where to write the transcript of a one-shot command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Export the transcript (to legal-consultation-<millis>.txt unless a path is given)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,
}

#[derive(Args)]
pub struct AskArgs {
    /// Question to ask
    pub message: String,

    /// Files to attach (images are referenced by name, other files inlined as text)
    #[arg(short, long = "attach", value_name = "FILE")]
    pub attachments: Vec<PathBuf>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args)]
pub struct DraftArgs {
    /// Document type: contract, affidavit, demand-letter, motion, pleading, brief, nda,
    /// power-of-attorney
    #[arg(short, long)]
    pub kind: DocumentKind,

    /// Document title
    #[arg(short, long)]
    pub title: String,

    /// Parties, terms and any other details to include
    #[arg(short, long)]
    pub details: String,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args)]
pub struct OsintArgs {
    /// Search type: people, property, business, court
    #[arg(short, long)]
    pub kind: OsintKind,

    /// Name, address, company or case to research
    #[arg(short, long)]
    pub query: String,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args)]
pub struct InmateArgs {
    /// State to search
    #[arg(short, long)]
    pub state: String,

    /// County, for the county jail roster
    #[arg(short, long)]
    pub county: Option<String>,

    /// Inmate name
    #[arg(short, long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Args)]
pub struct GuideArgs {
    /// Guide: small-claims, family, criminal, civil, eviction, traffic
    pub kind: GuideKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_draft() {
        let cli = Cli::try_parse_from([
            "lexrelay",
            "draft",
            "--kind",
            "nda",
            "--title",
            "Mutual NDA",
            "--details",
            "Two startups",
        ])
        .unwrap();
        let Commands::Draft(args) = cli.command else {
            panic!("expected draft");
        };
        assert_eq!(args.kind, DocumentKind::Nda);
        assert!(args.export.export.is_none());
    }

    #[test]
    fn test_parse_export_without_path() {
        let cli = Cli::try_parse_from(["lexrelay", "ask", "hello", "--export"]).unwrap();
        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.export.export, Some(None));
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["lexrelay", "guide", "divorce"]).is_err());
    }
}
