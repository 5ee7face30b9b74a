use anyhow::{Context as _, Result};
use std::process::Command;

/// Exposes git commit and build date to `--version` through
/// MRX_GIT_COMMIT / MRX_BUILD_DATE. Values already present in
/// the environment win, so packaged builds can pin them.
fn main() -> Result<()> {
    println!("cargo:rerun-if-env-changed=MRX_GIT_COMMIT");
    println!("cargo:rerun-if-env-changed=MRX_BUILD_DATE");
    println!("cargo:rerun-if-changed=../.git/HEAD");

    export("MRX_GIT_COMMIT", &["git", "rev-parse", "--short", "HEAD"])?;
    export("MRX_BUILD_DATE", &["date", "-u", "+%Y-%m-%dT%H:%M:%SZ"])?;

    Ok(())
}

fn export(var: &str, cmd: &[&str]) -> Result<()> {
    if let Ok(value) = std::env::var(var) {
        println!("cargo:rustc-env={var}={value}");
        return Ok(());
    }

    match run(cmd) {
        Ok(value) => println!("cargo:rustc-env={var}={value}"),
        Err(e) => println!("cargo:warning=leaving {var} unset: {e:#}"),
    }

    Ok(())
}

fn run(cmd: &[&str]) -> Result<String> {
    let output = Command::new(cmd[0])
        .args(&cmd[1..])
        .output()
        .with_context(|| format!("failed to run {}", cmd[0]))?;

    if !output.status.success() {
        anyhow::bail!("{} exited with {}", cmd.join(" "), output.status);
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
