use clap::Parser;
use sqlchat_agents::{
    config::SqlAgentSettings,
    factory::OpenAiSqlAgentFactory,
    orchestrator::{Credential, Orchestrator, QueryOutcome},
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask questions about a SQLite database in plain English", long_about = None)]
struct Args {
    /// Question to ask; when omitted, questions are read from stdin one per line
    #[arg(short, long)]
    prompt: Option<String>,

    /// Path to the SQLite database
    #[arg(long, default_value = "Chinook.db")]
    db_path: PathBuf,

    /// Model identifier
    #[arg(long, default_value = "gpt-4.1")]
    model: String,
}

fn print_outcome(outcome: &QueryOutcome) {
    match outcome {
        QueryOutcome::Success(answer) => println!("Answer:\n{}\n", answer),
        QueryOutcome::Failure(error) if error.is_warning() => eprintln!("Warning: {}\n", error),
        QueryOutcome::Failure(error) => eprintln!("{}\n", error),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_target(false),
        )
        .init();

    let args = Args::parse();

    let factory = OpenAiSqlAgentFactory::new(SqlAgentSettings {
        model: args.model,
        ..SqlAgentSettings::default()
    });
    let orchestrator = Orchestrator::new(&args.db_path, Arc::new(factory));

    if let Some(error) = orchestrator.database_error() {
        anyhow::bail!("{}", error);
    }

    let credential = Credential::new(rpassword::prompt_password("Enter your OpenAI API Key: ")?);

    if let Some(prompt) = args.prompt {
        print_outcome(&orchestrator.submit(&credential, &prompt).await);
        return Ok(());
    }

    let stdin = std::io::stdin();
    loop {
        print!("Ask your question: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        print_outcome(&orchestrator.submit(&credential, line.trim()).await);
    }

    Ok(())
}
