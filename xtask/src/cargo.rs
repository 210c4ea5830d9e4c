//! Common cargo invocation for firmware-target commands.

use crate::config::Config;
use anyhow::{Context, Result};
use xshell::{Shell, cmd};

/// Arguments common to all firmware-target cargo commands.
pub struct CargoCommand {
    /// Cargo subcommand: "build", "check", "clippy".
    pub subcommand: String,
    /// Target triple, e.g. "riscv32imac-unknown-none-elf".
    pub target: String,
    /// Package to operate on (-p flag). If `None`, no -p is passed.
    pub package: Option<String>,
    /// Whether to pass --release.
    pub release: bool,
    /// Extra arguments appended after `--`.
    pub extra_args: Vec<String>,
}

impl CargoCommand {
    /// Builds the argument list passed to cargo.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![self.subcommand.clone()];

        if let Some(ref pkg) = self.package {
            args.push("-p".into());
            args.push(pkg.clone());
        }

        // The firmware targets ship a prebuilt `core`, so no build-std.
        args.push("--target".into());
        args.push(self.target.clone());

        if self.release {
            args.push("--release".into());
        }

        if !self.extra_args.is_empty() {
            args.push("--".into());
            args.extend(self.extra_args.clone());
        }
        args
    }

    /// Execute the cargo command from the workspace root.
    pub fn run(&self, config: &Config) -> Result<()> {
        let sh = Shell::new()?;
        sh.change_dir(&config.workspace_root);

        let args = self.args();
        cmd!(sh, "cargo {args...}")
            .run()
            .with_context(|| format!("cargo {} failed", self.subcommand))?;

        Ok(())
    }
}
