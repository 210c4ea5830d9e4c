//! Configuration loading from workspace metadata.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// `[workspace.metadata.rivet]` from the root Cargo.toml.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RivetMetadata {
    /// Default target triple for firmware builds.
    default_target: Option<String>,
    /// Package that produces the bootable image.
    firmware_package: Option<String>,
    /// Emulator settings.
    qemu: Option<QemuMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct QemuMetadata {
    binary: Option<String>,
    machine: Option<String>,
    memory: Option<u32>,
    #[serde(default)]
    extra_args: Vec<String>,
}

/// Workspace configuration.
#[derive(Debug, Deserialize)]
struct WorkspaceConfig {
    workspace: WorkspaceSection,
}

#[derive(Debug, Deserialize)]
struct WorkspaceSection {
    metadata: Option<MetadataSection>,
}

#[derive(Debug, Deserialize)]
struct MetadataSection {
    rivet: Option<RivetMetadata>,
}

/// How to launch the emulator.
#[derive(Debug, Clone)]
pub struct QemuConfig {
    /// Emulator executable.
    pub binary: String,
    /// `-machine` value.
    pub machine: String,
    /// Guest RAM in MiB.
    pub memory: u32,
    /// Extra arguments placed before `-kernel`.
    pub extra_args: Vec<String>,
}

impl Default for QemuConfig {
    fn default() -> Self {
        Self {
            binary: "qemu-system-riscv32".into(),
            machine: "virt".into(),
            memory: 128,
            extra_args: vec!["-nographic".into(), "-bios".into(), "none".into()],
        }
    }
}

impl QemuConfig {
    /// Full argument list for booting `kernel`.
    pub fn args(&self, kernel: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            "-machine".into(),
            self.machine.clone(),
            "-m".into(),
            format!("{}M", self.memory),
        ];
        args.extend(self.extra_args.iter().cloned());
        args.push("-kernel".into());
        args.push(kernel.display().to_string());
        args
    }
}

/// Build configuration for xtask commands.
#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace root directory.
    pub workspace_root: PathBuf,
    /// Target directory for build artifacts.
    pub target_dir: PathBuf,
    /// Default target triple.
    pub default_target: String,
    /// Package that produces the firmware image.
    pub firmware_package: String,
    /// Emulator settings.
    pub qemu: QemuConfig,
}

impl Config {
    /// Load configuration from workspace.
    pub fn load() -> Result<Self> {
        let workspace_root = find_workspace_root()?;
        let cargo_toml = workspace_root.join("Cargo.toml");
        let content = std::fs::read_to_string(&cargo_toml)
            .with_context(|| format!("Failed to read {}", cargo_toml.display()))?;
        Self::from_manifest(workspace_root, &content)
    }

    fn from_manifest(workspace_root: PathBuf, content: &str) -> Result<Self> {
        let config: WorkspaceConfig =
            toml::from_str(content).context("Failed to parse Cargo.toml")?;
        let meta = config.workspace.metadata.and_then(|m| m.rivet);

        let (default_target, firmware_package, qemu_meta) = match meta {
            Some(m) => (m.default_target, m.firmware_package, m.qemu),
            None => (None, None, None),
        };

        let mut qemu = QemuConfig::default();
        if let Some(q) = qemu_meta {
            if let Some(binary) = q.binary {
                qemu.binary = binary;
            }
            if let Some(machine) = q.machine {
                qemu.machine = machine;
            }
            if let Some(memory) = q.memory {
                qemu.memory = memory;
            }
            if !q.extra_args.is_empty() {
                qemu.extra_args = q.extra_args;
            }
        }

        let target_dir = workspace_root.join("target");

        Ok(Self {
            workspace_root,
            target_dir,
            default_target: default_target
                .unwrap_or_else(|| "riscv32imac-unknown-none-elf".to_string()),
            firmware_package: firmware_package.unwrap_or_else(|| "rivet-kernel".to_string()),
            qemu,
        })
    }
}

/// Find the workspace root by looking for Cargo.toml with [workspace].
fn find_workspace_root() -> Result<PathBuf> {
    let mut dir = std::env::current_dir().context("Failed to get current directory")?;

    loop {
        let cargo_toml = dir.join("Cargo.toml");
        if cargo_toml.exists() {
            let content = std::fs::read_to_string(&cargo_toml)?;
            if content.contains("[workspace]") {
                return Ok(dir);
            }
        }

        if !dir.pop() {
            anyhow::bail!("Could not find workspace root (no Cargo.toml with [workspace] found)");
        }
    }
}
