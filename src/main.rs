use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use farm_qa::runner::{self, RunOptions};

#[derive(Parser)]
#[command(name = "farm-qa")]
#[command(author = "Farm TNF Team")]
#[command(version = "0.1.0")]
#[command(about = "End-to-end QA runner for the Farm TNF web app", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run test suites against a running app instance
    Run {
        /// Base URL of the app under test
        #[arg(short, long, default_value = "http://localhost:5173/")]
        url: String,

        /// Suite to run (livestock, navigation, all)
        #[arg(short, long, default_value = "all")]
        suite: String,

        /// Run Chrome headless
        #[arg(long, default_value = "false")]
        headless: bool,

        /// Output directory for reports
        #[arg(short, long, default_value = ".tmp")]
        output: PathBuf,

        /// Seed the qa_* Firestore collections before running
        #[arg(long, default_value = "false")]
        setup_data: bool,

        /// Purge the qa_* Firestore collections after running
        #[arg(long, default_value = "false")]
        cleanup: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            url,
            suite,
            headless,
            output,
            setup_data,
            cleanup,
        } => {
            println!("{} Farm TNF QA Test Runner", "🧪".to_string().green().bold());
            println!("   URL: {}", url.cyan());
            println!("   Suite: {}", suite.cyan());
            if headless {
                println!("   Headless: {}", "Enabled".yellow());
            }
            println!("   Output: {}", output.display().to_string().cyan());

            let options = RunOptions {
                url,
                suite,
                headless,
                output,
                setup_data,
                cleanup,
            };

            let exit_code = runner::run(options).await?;
            std::process::exit(exit_code);
        }
    }
}
