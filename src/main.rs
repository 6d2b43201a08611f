use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use heurbench::driver::{self, HarnessError, available_solvers};
use heurbench::io::overview::update_overview;
use heurbench::options::{Arguments, Command, seeds_or_default};
use tracing::error;

async fn execute(args: &Arguments) -> Result<(), HarnessError> {
    let config = Arc::new(args.config());

    match &args.command {
        Command::Run { solver, seeds } => {
            let report = driver::run(Arc::clone(&config), solver, &seeds_or_default(seeds)).await?;
            print!("{report}");

            let overview = update_overview(&config)?;
            println!("Overview: {}", overview.display());
        }
        Command::List => {
            for solver in available_solvers(&config)? {
                println!("{solver}");
            }
        }
        Command::Overview => {
            let overview = update_overview(&config)?;
            println!("Overview: {}", overview.display());
        }
        #[cfg(feature = "with_digest")]
        Command::Digest { seeds } => {
            for seed in seeds_or_default(seeds) {
                let digest = heurbench::digest::input_digest(&config, seed).map_err(|source| {
                    HarnessError::Io {
                        path: config.input_path(seed),
                        source,
                    }
                })?;
                println!("{seed}: {digest}");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Arguments::parse();
    args.init_logging();

    if let Err(e) = execute(&args).await {
        error!("{e}");
        if args.quiet {
            eprintln!("{e}");
        }
        exit(1)
    }
}
