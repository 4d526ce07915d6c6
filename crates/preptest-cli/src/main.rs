//! preptest CLI: timed multiple-choice mock tests in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use preptest_core::model::Difficulty;
use preptest_core::practice::DEFAULT_EXAM;

mod commands;

#[derive(Parser)]
#[command(name = "preptest", version, about = "Timed JEE-style mock tests generated by Gemini")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed mock test
    Test {
        /// Subject (e.g. "Physics"); falls back to the configured default
        #[arg(long)]
        subject: Option<String>,

        /// Topic within the subject
        #[arg(long, default_value = "")]
        topic: String,

        /// Difficulty: easy, medium, hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Duration in minutes (at least 5)
        #[arg(long)]
        duration: Option<u32>,

        /// Use the offline mock question service
        #[arg(long)]
        mock: bool,

        /// Output directory for reports
        #[arg(long, default_value = "./preptest-results")]
        output: PathBuf,

        /// Output format: json, html, all, none
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate an untimed practice set with worked solutions
    Generate {
        /// Subject (e.g. "Chemistry"); falls back to the configured default
        #[arg(long)]
        subject: Option<String>,

        /// Topic within the subject
        #[arg(long, default_value = "")]
        topic: String,

        /// Target exam (e.g. "JEE Advanced", "NEET")
        #[arg(long, default_value = DEFAULT_EXAM)]
        exam: String,

        /// Number of questions (1-20)
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// Print the worked solutions
        #[arg(long)]
        solutions: bool,

        /// Use the offline mock question service
        #[arg(long)]
        mock: bool,

        /// Save the parsed set as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the resolved configuration and check the API key
    CheckConfig {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("preptest=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Test {
            subject,
            topic,
            difficulty,
            duration,
            mock,
            output,
            format,
            config,
        } => {
            commands::test::execute(
                subject, topic, difficulty, duration, mock, output, format, config,
            )
            .await
        }
        Commands::Generate {
            subject,
            topic,
            exam,
            count,
            solutions,
            mock,
            output,
            config,
        } => {
            commands::generate::execute(
                subject, topic, exam, count, solutions, mock, output, config,
            )
            .await
        }
        Commands::CheckConfig { config } => commands::check_config::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
