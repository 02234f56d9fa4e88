//! Engine config loader (strict parsing).

pub mod schema;

use std::fs;

use stsguard_core::error::{Result, StsError};

pub use schema::{EngineConfig, EngineSection, PreloadConfig};

pub fn load_from_file(path: &str) -> Result<EngineConfig> {
    let s = fs::read_to_string(path).map_err(|e| StsError::ConfigRead {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<EngineConfig> {
    let cfg: EngineConfig = serde_yaml::from_str(s)
        .map_err(|e| StsError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
