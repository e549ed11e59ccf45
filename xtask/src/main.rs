//! Build automation tasks for Underhall
//!
//! Usage:
//!   cargo xtask build-web     # Build WASM bundle for web deployment
//!   cargo xtask package-zip   # Create a distributable zip of the native build

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for Underhall")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the WASM bundle into dist/web
    BuildWeb,
    /// Build a release binary and zip it with the assets directory
    PackageZip,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::BuildWeb => build_web(),
        Commands::PackageZip => package_zip(),
    }
}

/// Get the project root directory
fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .to_path_buf()
}

/// Run a command and check for success
fn run_cmd(cmd: &mut Command) -> Result<()> {
    let status = cmd.status().context("Failed to execute command")?;
    if !status.success() {
        anyhow::bail!("Command failed with status: {}", status);
    }
    Ok(())
}

/// Copy directory recursively
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let dest = dst.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest)?;
        }
    }
    Ok(())
}

fn build_web() -> Result<()> {
    let root = project_root();

    println!("Building wasm32 target...");
    run_cmd(
        Command::new("cargo")
            .current_dir(&root)
            .args(["build", "--release", "--target", "wasm32-unknown-unknown"]),
    )?;

    let out = root.join("dist/web");
    std::fs::create_dir_all(&out)?;
    std::fs::copy(
        root.join("target/wasm32-unknown-unknown/release/underhall.wasm"),
        out.join("underhall.wasm"),
    )
    .context("wasm artifact missing")?;

    let assets = root.join("assets");
    if assets.exists() {
        copy_dir_recursive(&assets, &out.join("assets"))?;
    }

    std::fs::write(out.join("index.html"), INDEX_HTML)?;
    println!("Web bundle ready at {}", out.display());
    Ok(())
}

fn package_zip() -> Result<()> {
    let root = project_root();

    println!("Building release binary...");
    run_cmd(Command::new("cargo").current_dir(&root).args(["build", "--release"]))?;

    let stage = root.join("dist/underhall");
    if stage.exists() {
        std::fs::remove_dir_all(&stage)?;
    }
    std::fs::create_dir_all(&stage)?;

    let bin = if cfg!(windows) { "underhall.exe" } else { "underhall" };
    std::fs::copy(root.join("target/release").join(bin), stage.join(bin))
        .context("release binary missing")?;

    let assets = root.join("assets");
    if assets.exists() {
        copy_dir_recursive(&assets, &stage.join("assets"))?;
    }

    println!("Zipping...");
    run_cmd(
        Command::new("zip")
            .current_dir(root.join("dist"))
            .args(["-r", "underhall.zip", "underhall"]),
    )?;
    println!("Package ready at dist/underhall.zip");
    Ok(())
}

/// Minimal loader page for the macroquad WASM bundle
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>UNDERHALL</title>
    <style>html, body { margin: 0; background: #000; } canvas { width: 100vw; height: 100vh; }</style>
</head>
<body>
    <canvas id="glcanvas" tabindex="1"></canvas>
    <script src="https://not-fl3.github.io/miniquad-samples/mq_js_bundle.js"></script>
    <script>load("underhall.wasm");</script>
</body>
</html>
"#;
