use anyhow::{Context, Result};
use colored::Colorize;
use lexrelay_core::Conversation;
use std::path::{Path, PathBuf};

use crate::cli::ExportArgs;

/// `legal-consultation-<unix millis>.txt`
pub fn default_export_name(millis: i64) -> String {
    format!("legal-consultation-{millis}.txt")
}

/// Write the transcript to `path`, or to a timestamped file in the current directory.
pub fn write_transcript(conversation: &Conversation, path: Option<&Path>) -> Result<PathBuf> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(|| {
        PathBuf::from(default_export_name(chrono::Utc::now().timestamp_millis()))
    });

    std::fs::write(&path, conversation.transcript())
        .with_context(|| format!("Failed to export transcript to {}", path.display()))?;
    tracing::info!(path = %path.display(), turns = conversation.len(), "Exported transcript");
    Ok(path)
}

/// Honour `--export` after a one-shot command.
pub fn export_if_requested(conversation: &Conversation, args: &ExportArgs) -> Result<()> {
    let Some(target) = &args.export else {
        return Ok(());
    };
    let path = write_transcript(conversation, target.as_deref())?;
    eprintln!("{} {}", "Transcript saved to".green(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrelay_core::Turn;
    use tempfile::tempdir;

    #[test]
    fn test_default_export_name() {
        assert_eq!(
            default_export_name(1_700_000_000_000),
            "legal-consultation-1700000000000.txt"
        );
    }

    #[test]
    fn test_write_transcript_to_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("consult.txt");

        let mut conversation = Conversation::new();
        conversation.push(Turn::user("Can my landlord keep the deposit?"));
        conversation.push(Turn::assistant("Only for documented damage."));

        let written = write_transcript(&conversation, Some(path.as_path())).unwrap();
        assert_eq!(written, path);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "USER: Can my landlord keep the deposit?\n\nASSISTANT: Only for documented damage.\n\n"
        );
    }

    #[test]
    fn test_write_transcript_reports_bad_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("consult.txt");
        let err = write_transcript(&Conversation::new(), Some(path.as_path())).unwrap_err();
        assert!(err.to_string().contains("Failed to export transcript"));
    }
}
