use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

/// `lexrelay` with config and log directories inside a scratch home.
fn lexrelay(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("lexrelay"));
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env_remove("LEXRELAY_RELAY_URL")
        .env_remove("LEXRELAY_API_KEY")
        .env_remove("LEXRELAY_MODEL");
    cmd
}

#[test]
fn test_cli_help_lists_pages() {
    let home = TempDir::new().unwrap();
    lexrelay(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("LexRelay"))
        .stdout(contains("chat"))
        .stdout(contains("draft"))
        .stdout(contains("osint"))
        .stdout(contains("inmate"))
        .stdout(contains("guide"));
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    lexrelay(&home).arg("--version").assert().success();
}

#[test]
fn test_unknown_document_kind_rejected() {
    let home = TempDir::new().unwrap();
    lexrelay(&home)
        .args(["draft", "--kind", "will", "--title", "T", "--details", "D"])
        .assert()
        .failure()
        .stderr(contains("document type"));
}

#[test]
fn test_missing_attachment_names_the_file() {
    let home = TempDir::new().unwrap();
    let missing = home.path().join("brief.pdf");
    lexrelay(&home)
        .args(["ask", "Summarise this", "--relay-url", "http://127.0.0.1:9", "--attach"])
        .arg(&missing)
        .assert()
        .failure()
        .stderr(contains("brief.pdf"));
}

#[test]
fn test_blank_question_rejected() {
    let home = TempDir::new().unwrap();
    lexrelay(&home)
        .args(["ask", "   ", "--relay-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(contains("Nothing to send"));
}

#[test]
fn test_unreachable_relay_shows_failure_text() {
    let home = TempDir::new().unwrap();
    lexrelay(&home)
        .args(["ask", "Hello", "--relay-url", "http://127.0.0.1:9"])
        .assert()
        .failure()
        .stdout(contains("Error: Unable to get response. Please try again."))
        .stderr(contains("--relay-url"));
}

#[test]
fn test_document_failure_text_and_export() {
    let home = TempDir::new().unwrap();
    let export = home.path().join("draft.txt");
    lexrelay(&home)
        .args([
            "draft",
            "--kind",
            "nda",
            "--title",
            "Mutual NDA",
            "--details",
            "Two startups",
            "--relay-url",
            "http://127.0.0.1:9",
            "--export",
        ])
        .arg(&export)
        .assert()
        .failure()
        .stdout(contains("Error generating document. Please try again."));

    let transcript = std::fs::read_to_string(&export).unwrap();
    assert!(transcript.starts_with("USER: Draft a professional Non-Disclosure Agreement"));
    assert!(transcript.ends_with("ASSISTANT: Error generating document. Please try again.\n\n"));
}
