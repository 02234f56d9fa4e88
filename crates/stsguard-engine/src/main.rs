//! stsguard host evaluator.
//!
//! Usage: `stsguard-engine [config.yaml] host...`
//! Prints the upgrade and strictness decision for each host against the
//! configured preload table.

use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use stsguard_engine::{config, PolicyEngine};

const DEFAULT_CONFIG: &str = "stsguard.yaml";

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut args = std::env::args().skip(1).peekable();
    let path = match args.peek() {
        Some(a) if a.ends_with(".yaml") || a.ends_with(".yml") => args.next().unwrap_or_default(),
        _ => DEFAULT_CONFIG.to_string(),
    };
    let hosts: Vec<String> = args.collect();

    let cfg = match config::load_from_file(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(%path, error = %e, code = e.code().as_str(), "config load failed");
            return ExitCode::FAILURE;
        }
    };
    let preload = match cfg.build_preload_table() {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(%path, error = %e, "preload table build failed");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%path, preloads = preload.len(), "stsguard engine ready");
    let engine = PolicyEngine::new(preload);

    for host in &hosts {
        println!(
            "{host}\tupgrade={}\tstrict={}",
            engine.should_upgrade(host),
            engine.is_strict_on_errors(host)
        );
    }
    ExitCode::SUCCESS
}
