//! Workspace maintenance and developer workflow commands (`cargo xtask`).
//!
//! The `xtask` binary wraps verification and bootstrap-asset maintenance so the repository can
//! expose stable entrypoints through Cargo aliases.

mod bootstrap_assets;

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

fn main() -> ExitCode {
    let root = workspace_root();
    let mut args = env::args().skip(1);

    let Some(cmd) = args.next() else {
        print_usage();
        return ExitCode::from(2);
    };

    let rest: Vec<String> = args.collect();

    let result = match cmd.as_str() {
        "verify" => verify(&root, rest),
        "encode-bootstrap" => encode_bootstrap(&root, rest),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(format!("unknown xtask command: {other}")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .unwrap_or(manifest_dir)
        .to_path_buf()
}

fn print_usage() {
    eprintln!(
        "Usage: cargo xtask <command> [args]\n\
         \n\
         Commands:\n\
           verify [fast|full]           fast: workspace tests; full: fmt, clippy, bootstrap check, tests\n\
           encode-bootstrap [--check]   Re-encode player_runtime/assets/bootstrap into player.toml (or only compare)\n"
    );
}

fn verify(root: &Path, args: Vec<String>) -> Result<(), String> {
    let mode = args.first().map(String::as_str).unwrap_or("full");
    match mode {
        "fast" => run(root, "cargo", vec!["test", "--workspace"]),
        "full" => {
            run(root, "cargo", vec!["fmt", "--all", "--", "--check"])?;
            run(
                root,
                "cargo",
                vec!["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
            )?;
            encode_bootstrap(root, vec!["--check".to_string()])?;
            run(root, "cargo", vec!["test", "--workspace"])
        }
        _ => Err(format!(
            "invalid verify mode `{mode}` (expected `fast` or `full`)"
        )),
    }
}

fn encode_bootstrap(root: &Path, args: Vec<String>) -> Result<(), String> {
    let check_only = match args.first().map(String::as_str) {
        None => false,
        Some("--check") => true,
        Some(other) => return Err(format!("unknown encode-bootstrap argument `{other}`")),
    };

    let assets = bootstrap_assets::BootstrapAssets::read(root)?;
    let config_path = root.join(bootstrap_assets::PLAYER_CONFIG);
    let current = std::fs::read_to_string(&config_path)
        .map_err(|err| format!("failed to read {}: {err}", config_path.display()))?;
    let updated = assets.apply_to_config(&current)?;

    if updated == current {
        println!("bootstrap assets are up to date");
        return Ok(());
    }
    if check_only {
        return Err(format!(
            "{} is stale; run `cargo xtask encode-bootstrap`",
            bootstrap_assets::PLAYER_CONFIG
        ));
    }
    std::fs::write(&config_path, updated)
        .map_err(|err| format!("failed to write {}: {err}", config_path.display()))?;
    println!("updated {}", bootstrap_assets::PLAYER_CONFIG);
    Ok(())
}

fn run(root: &Path, program: &str, args: Vec<&str>) -> Result<(), String> {
    println!("+ {program} {}", args.join(" "));
    let status = Command::new(program)
        .current_dir(root)
        .args(&args)
        .status()
        .map_err(|err| format!("failed to start `{program}`: {err}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("`{program}` exited with status {status}"))
    }
}
