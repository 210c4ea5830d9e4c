//! Running firmware under QEMU.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use xshell::{Shell, cmd};

use crate::config::Config;

/// Lines a healthy boot prints, in order.
pub const SMOKE_MARKERS: &[&str] = &["A", "Timer enabled", "Starting threads", "Done", "MTIP"];

/// Boots `firmware` with the console attached to this terminal.
pub fn run(config: &Config, firmware: &Path, extra_args: &[String]) -> Result<()> {
    let sh = Shell::new()?;
    sh.change_dir(&config.workspace_root);

    let binary = &config.qemu.binary;
    let args = config.qemu.args(firmware);
    println!("Running {binary} (Ctrl-A X to quit)");
    cmd!(sh, "{binary} {args...} {extra_args...}")
        .run()
        .with_context(|| format!("{binary} failed"))?;
    Ok(())
}

/// Boots `firmware` headless, waits until every marker has appeared in
/// order or `timeout` expires, then kills the emulator.
pub fn smoke_test(config: &Config, firmware: &Path, timeout: Duration) -> Result<()> {
    let binary = &config.qemu.binary;
    println!("Smoke-testing {} in {binary}...", firmware.display());

    let mut child = Command::new(binary)
        .args(config.qemu.args(firmware))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .with_context(|| format!("failed to start {binary}"))?;

    let output = Arc::new(Mutex::new(String::new()));
    let mut stdout = child.stdout.take().context("emulator stdout not captured")?;
    let reader = {
        let output = Arc::clone(&output);
        std::thread::spawn(move || {
            let mut buf = [0u8; 256];
            while let Ok(n) = stdout.read(&mut buf) {
                if n == 0 {
                    break;
                }
                if let Ok(mut out) = output.lock() {
                    out.push_str(&String::from_utf8_lossy(&buf[..n]));
                }
            }
        })
    };

    let deadline = Instant::now() + timeout;
    let passed = loop {
        let done = output.lock().is_ok_and(|out| markers_in_order(&out, SMOKE_MARKERS));
        if done {
            break true;
        }
        if Instant::now() >= deadline {
            break false;
        }
        if child.try_wait()?.is_some() {
            break false;
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    let _ = child.kill();
    let _ = child.wait();
    let _ = reader.join();

    if passed {
        println!("Smoke test passed.");
        Ok(())
    } else {
        let out = output.lock().map(|o| o.clone()).unwrap_or_default();
        anyhow::bail!("firmware output did not contain {SMOKE_MARKERS:?} in order:\n{out}")
    }
}

/// Returns `true` if every marker occurs in `output`, each after the
/// previous one.
fn markers_in_order(output: &str, markers: &[&str]) -> bool {
    let mut rest = output;
    for marker in markers {
        match rest.find(marker) {
            Some(at) => rest = &rest[at + marker.len()..],
            None => return false,
        }
    }
    true
}
