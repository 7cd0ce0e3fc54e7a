//! Sprint Scribe command line runner
//!
//! Resolves a query against the ticket backlog, or drafts new epics from web
//! research when nothing matches.
//!
//! # Usage
//!
//! ```bash
//! # One query, pretty output
//! sprint_scribe "Show me tasks for the authentication epic"
//!
//! # One query, JSON output
//! sprint_scribe --json "I need help with React hooks"
//!
//! # Interactive prompt
//! sprint_scribe
//! ```

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use scribe_agentic::preview;
use sprint_scribe::{
    ContextError, EpicTickets, ScribeContext, WorkflowController, WorkflowError, WorkflowState,
};

const DESCRIPTION_CHARS: usize = 100;
const ONLINE_RESULTS_SHOWN: usize = 3;

#[derive(Parser)]
#[command(name = "sprint_scribe")]
#[command(version)]
#[command(about = "Find the epic a query belongs to, or draft new epics from web research")]
struct Cli {
    /// Query to process (interactive mode if omitted)
    query: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,
}

// =============================================================================
// MAIN
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    sprint_scribe::config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.query.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => run_once(query, cli.json).await,
        _ => interactive(cli.json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, cli.json);
            ExitCode::FAILURE
        }
    }
}

/// A failure reported to the user, tagged with the workflow stage when there is one
struct Failure {
    stage: Option<&'static str>,
    message: String,
}

impl Failure {
    fn other(message: impl ToString) -> Self {
        Self {
            stage: None,
            message: message.to_string(),
        }
    }
}

impl From<WorkflowError> for Failure {
    fn from(e: WorkflowError) -> Self {
        Self {
            stage: Some(e.stage()),
            message: e.to_string(),
        }
    }
}

impl From<ContextError> for Failure {
    fn from(e: ContextError) -> Self {
        Self {
            stage: Some("startup"),
            message: e.to_string(),
        }
    }
}

async fn run_once(query: &str, json: bool) -> Result<(), Failure> {
    let ctx = ScribeContext::from_env().await?;
    if !json {
        println!("{} '{}'", "Running Sprint Scribe with query:".cyan(), query);
    }
    let state = WorkflowController::new(&ctx).run(query).await?;
    render(&state, json)
}

async fn interactive(json: bool) -> Result<(), Failure> {
    let ctx = ScribeContext::from_env().await?;
    let controller = WorkflowController::new(&ctx);
    let mut editor = DefaultEditor::new().map_err(Failure::other)?;

    println!("{}", "Sprint Scribe - Interactive Mode".bold());
    println!("Type 'quit' or 'exit' to stop");
    println!("{}", "-".repeat(40));

    loop {
        let line = match editor.readline("\nquery> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(Failure::other(e)),
        };
        let query = line.trim();

        if matches!(query.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }
        if query.is_empty() {
            println!("{}", "Please enter a query".yellow());
            continue;
        }
        if let Err(e) = editor.add_history_entry(query) {
            tracing::debug!(error = %e, "History entry not recorded");
        }

        // a failed query does not end the session
        match controller.run(query).await {
            Ok(state) => render(&state, json)?,
            Err(e) => report_error(&Failure::from(e), json),
        }
    }

    println!("Goodbye!");
    Ok(())
}

// =============================================================================
// OUTPUT
// =============================================================================

fn render(state: &WorkflowState, json: bool) -> Result<(), Failure> {
    if json {
        let output = serde_json::to_string_pretty(state)
            .map_err(|e| Failure::other(format!("JSON serialization failed: {}", e)))?;
        println!("{}", output);
    } else {
        print_pretty(state);
    }
    Ok(())
}

fn report_error(failure: &Failure, json: bool) {
    tracing::debug!(stage = ?failure.stage, error = %failure.message, "Run failed");
    if json {
        println!("{}", error_payload(failure));
    } else {
        eprintln!("{}: {}", "error".red().bold(), failure.message);
    }
}

fn error_payload(failure: &Failure) -> serde_json::Value {
    let mut payload = serde_json::json!({ "error": failure.message });
    if let Some(stage) = failure.stage {
        payload["stage"] = stage.into();
    }
    payload
}

fn print_pretty(state: &WorkflowState) {
    let rule = "=".repeat(50);
    println!("\n{}", rule);
    println!("{}", "SPRINT SCRIBE RESULTS".bold());
    println!("{}", rule);

    println!("\n{} {}", "Query:".bold(), state.query);

    if let Some(key) = state.resolved_initiative_key.as_deref().filter(|k| !k.is_empty()) {
        println!("\n{} {}", "Found Epic:".bold(), key);
        if let Some(summary) = &state.resolved_initiative_summary {
            println!("{} {}", "Epic Summary:".bold(), summary);
        }
    }

    if let Some(related) = state.is_related {
        let status = if related { "Yes".green() } else { "No".red() };
        println!("\n{} {}", "Related to Epic:".bold(), status);
    }

    if let Some(tickets) = &state.extracted_items {
        print_tickets(tickets);
    }

    let online = state.online_results();
    if !online.is_empty() {
        println!(
            "\n{} {} results found",
            "Online Search Results:".bold(),
            online.len()
        );
        for (i, snippet) in online.iter().take(ONLINE_RESULTS_SHOWN).enumerate() {
            let title = if snippet.title.is_empty() {
                "No title"
            } else {
                snippet.title.as_str()
            };
            println!("    {}. {}", i + 1, title);
            println!("       {}", snippet.url.dimmed());
        }
    }

    println!("\n{}", rule);
}

fn print_tickets(tickets: &EpicTickets) {
    let document = match tickets.document() {
        Ok(document) => document,
        Err(_) => {
            // unparseable model output is shown as-is
            if let EpicTickets::Generated(raw) = tickets {
                println!("\n{}", "Epic Tickets:".bold());
                println!("    {}", raw.as_str());
            }
            return;
        }
    };
    if document.is_empty() {
        return;
    }

    println!("\n{}", "Epic Tickets:".bold());
    for entry in document.entries() {
        println!("\n  {} {}", "Epic:".cyan(), entry.initiative_name);
        for (i, item) in entry.items.iter().enumerate() {
            println!("    {}. {}", i + 1, item.name);
            if !item.description.is_empty() {
                let short = preview(&item.description, DESCRIPTION_CHARS);
                let ellipsis = if short.len() < item.description.len() {
                    "..."
                } else {
                    ""
                };
                println!("       {}{}", short.dimmed(), ellipsis);
            }
        }
    }
}
