use std::borrow::Cow;
use std::collections::HashSet;

use serde::Deserialize;
use stsguard_core::error::{Result, StsError};
use stsguard_core::{Digest, HostName};

use crate::preload::{PreloadRecord, PreloadTable};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub version: u32,

    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub preloads: Vec<PreloadConfig>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StsError::UnsupportedVersion);
        }

        let mut seen = HashSet::new();
        for p in &self.preloads {
            p.validate()?;
            if !seen.insert(p.host.as_str()) {
                return Err(StsError::BadConfig(format!("duplicate preload host: {}", p.host)));
            }
        }
        Ok(())
    }

    /// Configured records first, then the built-in table if enabled.
    pub fn build_preload_table(&self) -> Result<PreloadTable> {
        let records = self
            .preloads
            .iter()
            .map(PreloadConfig::to_record)
            .collect::<Result<Vec<_>>>()?;

        let mut table = PreloadTable::new(records);
        if self.engine.builtin_preloads {
            table.extend(PreloadTable::builtin().records().iter().cloned());
        }
        Ok(table)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default = "default_builtin_preloads")]
    pub builtin_preloads: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            builtin_preloads: default_builtin_preloads(),
        }
    }
}

fn default_builtin_preloads() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreloadConfig {
    pub host: String,
    #[serde(default)]
    pub include_subdomains: bool,
    #[serde(default)]
    pub upgrade: bool,
    /// `<alg>/<base64>` digests.
    #[serde(default)]
    pub pins: Vec<String>,
    #[serde(default)]
    pub bad_pins: Vec<String>,
    #[serde(default)]
    pub trust_agility_key: Option<String>,
}

impl PreloadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() || !HostName::is_canonical(&self.host) {
            return Err(StsError::BadConfig(format!(
                "preloads.host must be lowercase without a trailing dot: {:?}",
                self.host
            )));
        }
        HostName::parse(&self.host)
            .map_err(|e| StsError::BadConfig(format!("preloads.host {:?}: {e}", self.host)))?;

        let has_key = self.trust_agility_key.as_deref().is_some_and(|k| !k.is_empty());
        if !self.upgrade && self.pins.is_empty() && self.bad_pins.is_empty() && !has_key {
            return Err(StsError::BadConfig(format!(
                "preload {} carries no policy (upgrade, pins, bad_pins or trust_agility_key)",
                self.host
            )));
        }

        parse_pins(&self.host, &self.pins)?;
        parse_pins(&self.host, &self.bad_pins)?;
        Ok(())
    }

    pub fn to_record(&self) -> Result<PreloadRecord> {
        Ok(PreloadRecord {
            label: Cow::Owned(self.host.clone()),
            include_subdomains: self.include_subdomains,
            upgrade: self.upgrade,
            allowed_spki: Cow::Owned(parse_pins(&self.host, &self.pins)?),
            blocked_spki: Cow::Owned(parse_pins(&self.host, &self.bad_pins)?),
            trust_agility_key: self.trust_agility_key.clone().map(Cow::Owned),
        })
    }
}

fn parse_pins(host: &str, raw: &[String]) -> Result<Vec<Digest>> {
    raw.iter()
        .map(|s| {
            s.parse::<Digest>()
                .map_err(|e| StsError::BadConfig(format!("preload {host}: {e}")))
        })
        .collect()
}
