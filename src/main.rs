use anyhow::Result;
use clap::{Parser, Subcommand};
use genesis_core::metrics::init_logging;
use genesis_core::shutdown::ShutdownSignal;
use genesis_lib::app::{self, App, Overrides, RunOptions, StoreBackend};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Genesis evolution engine", long_about = None)]
struct Args {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation headless and print the final summary as JSON
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Generation index to stop at
        #[arg(short, long)]
        generations: Option<u32>,

        /// Master RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Population size
        #[arg(short, long)]
        population: Option<usize>,

        #[arg(long, value_enum, default_value_t = StoreBackend::File)]
        store: StoreBackend,

        #[arg(long, default_value = "genesis_data")]
        data_dir: PathBuf,

        /// Continue from the latest stored snapshot
        #[arg(long)]
        resume: bool,

        /// Random partners each agent meets per cycle
        #[arg(long, default_value_t = 3)]
        encounters: usize,

        /// Standard deviation of the synthetic metric noise
        #[arg(long, default_value_t = 0.1)]
        noise: f64,
    },
    /// Print what a data directory holds
    Inspect {
        #[arg(long, value_enum, default_value_t = StoreBackend::File)]
        store: StoreBackend,

        #[arg(long, default_value = "genesis_data")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    match args.command {
        Command::Run {
            config,
            generations,
            seed,
            population,
            store,
            data_dir,
            resume,
            encounters,
            noise,
        } => {
            let overrides = Overrides {
                seed,
                generations,
                population,
            };
            let config = app::load_config(&config, &overrides)?;
            let shutdown = ShutdownSignal::new();

            let signal = shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    signal.request_shutdown();
                }
            });

            let summary = tokio::task::spawn_blocking(move || {
                let mut app = App::new(RunOptions {
                    config,
                    backend: store,
                    data_dir,
                    resume,
                    encounters_per_agent: encounters,
                    noise_sigma: noise,
                })?;
                app.run(&shutdown)
            })
            .await??;

            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Inspect { store, data_dir } => {
            let inspection = app::inspect(store, &data_dir)?;
            println!("{}", serde_json::to_string_pretty(&inspection)?);
        }
    }

    Ok(())
}
