// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `explore` — descriptive charts only
//   2. `train`   — charts, training and test-set evaluation
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, DataArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "churn-predict",
    version,
    about = "Explore the telco churn dataset and train a small MLP churn classifier."
)]
pub struct Cli {
    /// The subcommand to run (explore or train)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case; the CLI never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Explore(args) => run_explore(args),
            Commands::Train(args)   => run_train(args),
        }
    }
}

fn run_explore(args: DataArgs) -> Result<()> {
    use crate::application::explore_use_case::ExploreUseCase;

    let written = ExploreUseCase::new(args.into()).execute()?;
    for path in &written {
        println!("{}", path.display());
    }
    Ok(())
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let config = args.into();
    let report = TrainUseCase::new(config).execute()?;

    if let Some(last) = report.history.last() {
        println!(
            "Final epoch {}: loss {:.4}  val_loss {:.4}  acc {:.4}  val_acc {:.4}",
            last.epoch, last.loss, last.val_loss, last.accuracy, last.val_accuracy
        );
    }
    let eval = &report.evaluation;
    println!("Test loss {:.4}, test accuracy {:.4} on {} rows", eval.loss, eval.accuracy, eval.test_rows);
    println!("Confusion matrix (rows = actual, cols = predicted):");
    println!("{:>10} {}", "", eval.tick_labels.iter().map(|l| format!("{l:>10}")).collect::<String>());
    for (label, row) in eval.tick_labels.iter().zip(&eval.confusion.counts) {
        let cells: String = row.iter().map(|c| format!("{c:>10}")).collect();
        println!("{label:>10} {cells}");
    }
    Ok(())
}
