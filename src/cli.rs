use crate::clock::KernelClock;
use crate::config::types::SandboxRole;
use crate::config::DriverConfig;
use crate::kernel::SystemKernel;
use crate::sandbox::{compute_policy, PolicyFlags};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the kernel's current frequency offset
    Frequency,
    /// Set the frequency offset and print the value the kernel applied
    SetFrequency {
        /// Offset in ppm
        #[arg(allow_hyphen_values = true)]
        ppm: f64,
    },
    /// Print the kernel clock rate and tick interval
    TickRate,
    /// Cancel a pending adjtime slew
    ResetAdjtime,
    /// Print the pledge promises a process role would request
    Policy {
        /// Process role: main, privops or ntske
        #[arg(long, default_value = "main")]
        role: SandboxRole,
        /// Driver configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Compute the set as if running as root
        #[arg(long)]
        elevated: bool,
    },
}

pub fn run() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut clock = KernelClock::new(SystemKernel::new());

    match cli.command {
        Commands::Frequency => {
            let freq = clock.read_frequency().context("Failed to read frequency")?;
            println!("{:.9} ppm", freq);
        }
        Commands::SetFrequency { ppm } => {
            let actual = clock
                .set_frequency(ppm)
                .with_context(|| format!("Failed to set frequency to {} ppm", ppm))?;
            println!("{:.9} ppm", actual);
        }
        Commands::TickRate => {
            let rate = clock.query_tick_rate().context("Failed to query clock rate")?;
            println!("hz={} tick={:.6}s", rate.hz, rate.tick_interval());
        }
        Commands::ResetAdjtime => {
            clock
                .reset_pending_adjustment()
                .context("Failed to reset pending adjustment")?;
            println!("Pending adjustment cleared");
        }
        Commands::Policy {
            role,
            config,
            elevated,
        } => {
            let config = match config {
                Some(path) => DriverConfig::load_from_file(&path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
                None => DriverConfig::default(),
            };
            let euid = if elevated { 0 } else { nix::unistd::geteuid().as_raw() };
            let flags = PolicyFlags::from_config(&config, euid);

            println!("{}", compute_policy(role, flags).promises());
        }
    }

    Ok(())
}
