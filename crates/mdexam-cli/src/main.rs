//! mdexam CLI: practice exams written in markdown from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "mdexam", version, about = "Markdown exam practice tool")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config and MDEXAM_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and a sample exam
    Init,

    /// Store an exam: one .md file plus any images it refers to
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List stored exams
    List,

    /// Check exam files for problems
    Validate {
        /// Exam file or directory
        path: PathBuf,
    },

    /// Take an exam interactively
    Take {
        /// Exam id or title
        exam: String,

        /// Keep document order for questions and choices
        #[arg(long)]
        no_shuffle: bool,

        /// Only show missed questions in the review
        #[arg(long)]
        missed_only: bool,
    },

    /// Show score history
    Results {
        /// Exam id or title (all exams if omitted)
        exam: Option<String>,
    },

    /// Review one attempt
    Review {
        /// Exam id or title
        exam: String,

        /// Attempt number
        attempt: u32,

        /// Only show missed questions
        #[arg(long)]
        missed_only: bool,
    },

    /// Compare two attempts of an exam
    Compare {
        /// Exam id or title
        exam: String,

        /// Baseline attempt number
        baseline: u32,

        /// Current attempt number
        current: u32,

        /// Exit code 1 if questions regressed
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Delete a stored exam (results are kept)
    Delete {
        /// Exam id or title
        exam: String,
    },

    /// Delete all results of an exam
    ClearResults {
        /// Exam id or title
        exam: String,
    },

    /// Export all results as a self-contained HTML page
    ExportHtml {
        #[arg(long, default_value = "mdexam-results.html")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mdexam=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Init => return commands::init::execute(),
        Commands::Validate { path } => return commands::validate::execute(path.clone()),
        _ => {}
    }

    let ctx = Context::load(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Commands::Add { files } => commands::add::execute(&ctx, files).await,
        Commands::List => commands::list::execute(&ctx).await,
        Commands::Take {
            exam,
            no_shuffle,
            missed_only,
        } => commands::take::execute(&ctx, &exam, no_shuffle, missed_only).await,
        Commands::Results { exam } => commands::results::execute(&ctx, exam).await,
        Commands::Review {
            exam,
            attempt,
            missed_only,
        } => commands::review::execute(&ctx, &exam, attempt, missed_only).await,
        Commands::Compare {
            exam,
            baseline,
            current,
            fail_on_regression,
            format,
        } => {
            commands::compare::execute(&ctx, &exam, baseline, current, fail_on_regression, format)
                .await
        }
        Commands::Delete { exam } => commands::delete::execute(&ctx, &exam).await,
        Commands::ClearResults { exam } => commands::delete::clear_results(&ctx, &exam).await,
        Commands::ExportHtml { output } => commands::export::execute(&ctx, output).await,
        Commands::Init | Commands::Validate { .. } => Ok(()),
    }
}
