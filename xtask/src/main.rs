//! Build automation for the Rivet firmware.
//!
//! Usage:
//!   cargo xtask build    - Build the firmware image
//!   cargo xtask run      - Build and boot it in QEMU
//!   cargo xtask sim      - Run the boot sequence on the host simulator
//!   cargo xtask test     - Run host tests, model tests and the QEMU smoke test
//!   cargo xtask test --host-only  - Run only host-side tests
//!   cargo xtask test --models     - Also run loom/shuttle model tests
//!   cargo xtask check    - Type-check firmware code
//!   cargo xtask clippy   - Run clippy lints on firmware code

mod build;
mod cargo;
mod config;
mod qemu;

use anyhow::Result;
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

use crate::cargo::CargoCommand;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for the Rivet firmware")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the firmware image
    Build {
        /// Build in release mode
        #[arg(short, long)]
        release: bool,

        /// Target triple (default: from workspace metadata)
        #[arg(short, long)]
        target: Option<String>,

        /// Package to build (default: from workspace metadata)
        #[arg(short, long)]
        package: Option<String>,
    },

    /// Build and boot in QEMU
    Run {
        /// Build in release mode
        #[arg(short, long)]
        release: bool,

        /// Target triple (default: from workspace metadata)
        #[arg(short, long)]
        target: Option<String>,

        /// Extra arguments passed to QEMU after --
        #[arg(last = true)]
        extra_args: Vec<String>,
    },

    /// Run the boot sequence against the simulated machine on the host
    Sim {
        /// Log level baked into the build
        #[arg(long, value_parser = ["fatal", "error", "warn", "info", "debug", "trace"])]
        log_level: Option<String>,
    },

    /// Run tests (host tests + QEMU smoke test)
    Test {
        /// Build the firmware in release mode for the smoke test
        #[arg(short, long)]
        release: bool,

        /// Target triple (default: from workspace metadata)
        #[arg(short, long)]
        target: Option<String>,

        /// Run only host-side tests (skip the QEMU smoke test)
        #[arg(long, conflicts_with = "smoke_only")]
        host_only: bool,

        /// Run only the QEMU smoke test
        #[arg(long, conflicts_with = "host_only")]
        smoke_only: bool,

        /// Also run the loom and shuttle model tests
        #[arg(long)]
        models: bool,
    },

    /// Type-check firmware code without full compilation
    Check {
        /// Target triple (default: from workspace metadata)
        #[arg(short, long)]
        target: Option<String>,

        /// Package to check (default: from workspace metadata)
        #[arg(short, long)]
        package: Option<String>,
    },

    /// Run clippy lints on firmware code
    Clippy {
        /// Target triple (default: from workspace metadata)
        #[arg(short, long)]
        target: Option<String>,

        /// Package to lint (default: from workspace metadata)
        #[arg(short, long)]
        package: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Build {
            release,
            target,
            package,
        } => {
            let target = target.unwrap_or_else(|| config.default_target.clone());
            let result = build::build(&config, &target, package.as_deref(), release)?;
            println!("Built: {}", result.firmware.display());
        }

        Commands::Run {
            release,
            target,
            extra_args,
        } => {
            let target = target.unwrap_or_else(|| config.default_target.clone());
            let result = build::build(&config, &target, None, release)?;
            qemu::run(&config, &result.firmware, &extra_args)?;
        }

        Commands::Sim { log_level } => {
            let sh = Shell::new()?;
            sh.change_dir(&config.workspace_root);
            let package = &config.firmware_package;
            let mut command = cmd!(sh, "cargo run -p {package}");
            if let Some(level) = log_level {
                command = command.env("RIVET_LOG_LEVEL", level);
            }
            command
                .run()
                .map_err(|e| anyhow::anyhow!("simulated run failed: {e}"))?;
        }

        Commands::Test {
            release,
            target,
            host_only,
            smoke_only,
            models,
        } => {
            let target = target.unwrap_or_else(|| config.default_target.clone());
            test::run_tests(
                &config,
                &target,
                test::Selection {
                    host: !smoke_only,
                    models,
                    smoke: !host_only,
                    release,
                },
            )?;
        }

        Commands::Check { target, package } => {
            let target = target.unwrap_or_else(|| config.default_target.clone());
            let package = package.unwrap_or_else(|| config.firmware_package.clone());
            CargoCommand {
                subcommand: "check".into(),
                target,
                package: Some(package),
                release: false,
                extra_args: vec![],
            }
            .run(&config)?;
        }

        Commands::Clippy { target, package } => {
            let target = target.unwrap_or_else(|| config.default_target.clone());
            let package = package.unwrap_or_else(|| config.firmware_package.clone());
            CargoCommand {
                subcommand: "clippy".into(),
                target,
                package: Some(package),
                release: false,
                extra_args: vec![],
            }
            .run(&config)?;
        }
    }

    Ok(())
}
