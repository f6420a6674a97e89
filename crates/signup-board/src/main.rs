//! Signup Board CLI.
//!
//! Generate rounds, place students, close rounds through the round actor,
//! and run trial grids.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use balance_kernel::BalanceConfig;
use signup_board::board::{close_round, place_student};
use signup_board::{
    CohortConfig, CohortGenerator, RoundSnapshot, SnapshotStore, TrialRunner, TrialRunnerConfig,
};

#[derive(Parser)]
#[command(name = "signup-board")]
#[command(about = "History-constrained group balancing for project sign-up rounds")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Balancing config file (TOML or JSON)
    #[arg(long, env = "SIGNUP_BOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Override the minimum group size
    #[arg(long, global = true)]
    min_size: Option<usize>,

    /// Override the maximum group size
    #[arg(long, global = true)]
    max_size: Option<usize>,

    /// Override the optimization pass limit
    #[arg(long, global = true)]
    max_passes: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a round snapshot.
    Generate {
        /// Difficulty: easy, medium, hard
        #[arg(short, long, default_value = "easy")]
        difficulty: String,
        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Round label
        #[arg(short, long, default_value = "round 1")]
        label: String,
        /// Output snapshot (JSON)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Close a round: balance, archive, and open the next round.
    Balance {
        /// Input snapshot (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Snapshot of the next round (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Balance report (defaults to <output>.report.json)
        #[arg(long)]
        report: Option<PathBuf>,
        /// Random seed (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
        /// Also save both snapshots into this store directory
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Place one student into a group of the open round.
    Place {
        /// Input snapshot (JSON)
        #[arg(short, long)]
        input: PathBuf,
        /// Student name as written on the sign-up sheet
        #[arg(long)]
        student: String,
        /// Group name
        #[arg(short, long)]
        group: String,
        /// Updated snapshot (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List rounds saved in a store directory.
    List {
        /// Store directory
        #[arg(long, default_value = "rounds")]
        store: PathBuf,
    },

    /// Run a grid of balancing trials.
    Grid {
        /// Number of trials per difficulty
        #[arg(short, long, default_value = "30")]
        trials: usize,
        /// Difficulties (comma-separated): easy, medium, hard
        #[arg(short, long, default_value = "easy,medium,hard")]
        difficulties: String,
        /// Seed of the first trial
        #[arg(long, default_value = "0")]
        base_seed: u64,
        /// Output file for results (JSON)
        #[arg(short, long, default_value = "results/signup-grid.json")]
        output: PathBuf,
    },
}

impl Cli {
    fn balance_config(&self) -> Result<BalanceConfig> {
        let mut config = match &self.config {
            Some(path) => BalanceConfig::load(path)?,
            None => BalanceConfig::default(),
        };
        if let Some(min) = self.min_size {
            config.min_size = min;
        }
        if let Some(max) = self.max_size {
            config.max_size = max;
        }
        if let Some(passes) = self.max_passes {
            config.max_passes = passes;
        }
        config.validate().context("invalid balancing configuration")?;
        Ok(config)
    }
}

fn report_path(output: &Path) -> PathBuf {
    output.with_extension("report.json")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.balance_config()?;

    match cli.command {
        Commands::Generate {
            difficulty,
            seed,
            label,
            output,
        } => {
            let Some(cohort) = CohortConfig::by_name(&difficulty) else {
                bail!("unknown difficulty: {difficulty}");
            };
            let snapshot = CohortGenerator::new(cohort, seed).generate(&label);
            snapshot.write(&output)?;

            info!(
                round = %snapshot.round_id,
                groups = snapshot.groups.len(),
                students = snapshot.directory.len(),
                history = snapshot.history.len(),
                "Generated round"
            );
            println!("Snapshot written to: {}", output.display());
        }

        Commands::Balance {
            input,
            output,
            report,
            seed,
            store,
        } => {
            let snapshot = RoundSnapshot::read(&input)?;
            let seed = seed.unwrap_or_else(rand::random);
            info!(round = %snapshot.round_id, seed, "Closing round");

            let (closed, next) = close_round(&snapshot, config.clone(), seed).await?;

            let output = output.unwrap_or(input);
            let report_path = report.unwrap_or_else(|| report_path(&output));

            let mut balance_report = closed.report.clone();
            balance_report.roster = balance_report.roster.sorted_for_display(&config);
            let json = serde_json::to_string_pretty(&balance_report)?;
            if let Some(parent) = report_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&report_path, json)
                .with_context(|| format!("writing report {}", report_path.display()))?;
            next.write(&output)?;

            if let Some(store) = store {
                let store = SnapshotStore::open(store)?;
                let balanced = RoundSnapshot::new(
                    &closed.closed_label,
                    &balance_report.roster,
                    snapshot.history.clone(),
                    snapshot.directory.clone(),
                );
                store.save(&balanced)?;
                store.save(&next)?;
            }

            println!(
                "Closed {} (penalty {} -> {}, {} swaps, {} transfers)",
                closed.closed_label,
                balance_report.initial_penalty,
                balance_report.final_penalty,
                balance_report.swaps_committed,
                balance_report.transfers.len()
            );
            println!("Report written to: {}", report_path.display());
            println!("Next round ({}) written to: {}", next.label, output.display());
        }

        Commands::Place {
            input,
            student,
            group,
            output,
        } => {
            let snapshot = RoundSnapshot::read(&input)?;
            let (receipt, updated) = place_student(&snapshot, config, &student, &group).await?;
            let output = output.unwrap_or(input);
            updated.write(&output)?;

            println!(
                "Placed {} in {} (slot {})",
                receipt.student,
                receipt.group,
                receipt.slot + 1
            );
        }

        Commands::List { store } => {
            let store = SnapshotStore::open(store)?;
            for round_id in store.list()? {
                let snapshot = store.load(&round_id)?;
                let students: usize = snapshot.groups.iter().map(|g| g.len()).sum();
                println!("{}  {}  students={}", round_id, snapshot.label, students);
            }
        }

        Commands::Grid {
            trials,
            difficulties,
            base_seed,
            output,
        } => {
            let difficulties: Vec<String> = difficulties
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();

            info!(difficulties = ?difficulties, trials, base_seed, "Starting trial grid");

            let runner = TrialRunner::new(TrialRunnerConfig {
                balance: config,
                trials,
                difficulties,
                base_seed,
            });
            let results = runner.run_grid()?;

            println!("\n=== Grid Results Summary ===");
            let mut keys: Vec<&String> = results.summary.keys().collect();
            keys.sort();
            for key in keys {
                let summary = &results.summary[key];
                println!(
                    "{}: {:.1}% validated ({} trials), avg passes={:.1}, avg penalty reduction={:.0}, history violations={}",
                    key,
                    summary.success_rate * 100.0,
                    summary.trials,
                    summary.avg_passes,
                    summary.avg_penalty_reduction,
                    summary.history_violations
                );
            }

            results.save(&output)?;
            println!("\nResults written to: {}", output.display());
        }
    }

    Ok(())
}
