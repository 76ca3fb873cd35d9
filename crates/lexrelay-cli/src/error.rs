use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let msg = format!("{:#}", err).to_lowercase();

    if msg.contains("failed to read attachment") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check that the file exists and is readable.");
    }

    if msg.contains("connection refused")
        || msg.contains("failed to open response stream")
        || msg.contains("network")
    {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Make sure the relay is running and reachable:");
        eprintln!("  {} lexrelay-server", "$".dimmed());
        eprintln!("  or point the CLI at it with --relay-url.");
    }

    if msg.contains("http 401") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  The relay requires a key. Pass one with --api-key or LEXRELAY_API_KEY.");
    }

    if msg.contains("http 429") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  The relay is rate limiting requests. Wait a minute and try again.");
    }

    std::process::exit(1);
}
