//! quizetl CLI — record quiz answers, run the ETL, inspect results.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizetl", version, about = "Quiz answers → raw log → curated table")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record one student's answers to a question block
    Answer {
        /// Student name (required)
        #[arg(long)]
        aluno: String,

        /// Class; defaults to `default_turma` from the config
        #[arg(long)]
        turma: Option<String>,

        /// Question block
        #[arg(long)]
        bloco: String,

        /// Answers as question_id=option pairs (e.g. "q1=A,q2=C")
        #[arg(long)]
        answers: String,

        /// Do not print per-question feedback
        #[arg(long)]
        no_feedback: bool,
    },

    /// Consolidate the raw store into the curated store
    Etl {
        /// Also write a JSON run report into the reports directory
        #[arg(long)]
        save_report: bool,

        /// Output format: json, text
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Show results from the curated store
    Results {
        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate the question bank
    Validate {
        /// Question bank JSON; defaults to `questions` from the config
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Rewrite the raw store in the current column layout
    Compact,

    /// Create starter config and example question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quizetl=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Answer {
            aluno,
            turma,
            bloco,
            answers,
            no_feedback,
        } => commands::answer::execute(config, aluno, turma, bloco, answers, no_feedback),
        Commands::Etl {
            save_report,
            format,
        } => commands::etl::execute(config, save_report, format),
        Commands::Results { format, output } => commands::results::execute(config, format, output),
        Commands::Validate { questions } => commands::validate::execute(config, questions),
        Commands::Compact => commands::compact::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
