//! `depthcmp-contract` -- check the trainer's depth-supervision options.

use std::fmt::Display;
use std::path::PathBuf;

use clap::Parser;
use depthcmp_contract::{
    check_defaults, check_overrides, check_trainer_modules, TrainerCheckout, DEFAULT_PYTHON,
    USAGE_EXAMPLE,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Validate the GT depth supervision argument surface.
#[derive(Debug, Parser)]
#[command(name = "depthcmp-contract", version)]
struct Cli {
    /// Trainer checkout to check. Its modules are imported and its own
    /// argument parser is run.
    #[arg(long = "trainer-root", env = "TRAINER_ROOT")]
    trainer_root: Option<PathBuf>,

    /// Python interpreter with the trainer's dependencies installed.
    #[arg(long, env = "TRAINER_PYTHON", default_value = DEFAULT_PYTHON)]
    python: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "depthcmp_contract=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    println!("Testing GT depth supervision implementation...");
    println!();

    if let Some(root) = &cli.trainer_root {
        exit_on_violation(check_trainer_modules(root));
        println!("✓ All modified modules are present in {}", root.display());

        let checkout = TrainerCheckout::new(root.clone(), cli.python.clone());
        exit_on_violation(checkout.check().await);
        println!("✓ All modified modules import successfully");
        println!("✓ The trainer's own parser registers the GT depth arguments with expected defaults");
    }

    exit_on_violation(check_defaults());
    println!("✓ All GT depth arguments are correctly configured with expected defaults");

    exit_on_violation(check_overrides());
    println!("✓ Custom GT depth argument values are correctly parsed");

    println!();
    println!("All checks passed! GT depth supervision is ready to use.");
    println!();
    println!("Usage example:");
    println!("{USAGE_EXAMPLE}");

    Ok(())
}

fn exit_on_violation<T, E: Display>(result: Result<T, E>) -> T {
    match result {
        Ok(value) => value,
        Err(violation) => {
            tracing::error!(error = %violation, "Contract check failed");
            println!("✗ {violation}");
            std::process::exit(1);
        }
    }
}
