//! Firmware build functionality.

use crate::cargo::CargoCommand;
use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Build result containing paths to built artifacts.
#[derive(Debug)]
pub struct BuildResult {
    /// Path to the built firmware ELF.
    pub firmware: PathBuf,
}

/// Build the firmware, returning the path to the output ELF.
pub fn build(
    config: &Config,
    target: &str,
    package: Option<&str>,
    release: bool,
) -> Result<BuildResult> {
    let package = package.unwrap_or(&config.firmware_package);

    println!("Building {package} for {target}");

    CargoCommand {
        subcommand: "build".into(),
        target: target.into(),
        package: Some(package.into()),
        release,
        extra_args: vec![],
    }
    .run(config)?;

    let profile = if release { "release" } else { "debug" };
    let firmware = config.target_dir.join(target).join(profile).join(package);

    if !firmware.exists() {
        anyhow::bail!("Built binary not found at: {}", firmware.display());
    }

    Ok(BuildResult { firmware })
}
