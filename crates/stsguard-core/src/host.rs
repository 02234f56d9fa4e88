//! Canonical host names and the suffix walk used by every policy lookup.
//!
//! Canonicalization is an ASCII case-fold plus removal of one trailing dot.
//! No IDN or Unicode normalization is performed.

use std::fmt;

use crate::error::{Result, StsError};

/// A host name in canonical form (lowercase, no trailing dot).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HostName(String);

impl HostName {
    /// Canonicalize `host`. Never fails; an empty input stays empty and
    /// produces an empty suffix walk.
    pub fn canonicalize(host: &str) -> Self {
        let lower = host.to_ascii_lowercase();
        let trimmed = lower.strip_suffix('.').unwrap_or(&lower);
        Self(trimmed.to_string())
    }

    /// Canonicalize and reject empty names or names with empty labels.
    pub fn parse(host: &str) -> Result<Self> {
        let name = Self::canonicalize(host);
        if name.0.is_empty() {
            return Err(StsError::InvalidHost("empty host".into()));
        }
        if name.0.split('.').any(str::is_empty) {
            return Err(StsError::InvalidHost(format!("empty label in {host:?}")));
        }
        Ok(name)
    }

    /// True if `host` is already in canonical form.
    pub fn is_canonical(host: &str) -> bool {
        Self::canonicalize(host).0 == host
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Candidate match keys, most specific first.
    ///
    /// `www.example.com` yields `www.example.com`, `example.com`, `com`.
    /// With `exact_match` only the full name is yielded.
    pub fn suffixes(&self, exact_match: bool) -> Suffixes<'_> {
        Suffixes {
            name: &self.0,
            pos: if self.0.is_empty() { None } else { Some(0) },
            exact_match,
        }
    }
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step of the suffix walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suffix<'a> {
    /// Candidate key.
    pub name: &'a str,
    /// True only for the first step (the full host name). Lookups that
    /// match any later step must honor `include_subdomains`.
    pub is_full_hostname: bool,
}

/// Iterator over the suffixes of a [`HostName`].
#[derive(Debug, Clone)]
pub struct Suffixes<'a> {
    name: &'a str,
    pos: Option<usize>,
    exact_match: bool,
}

impl<'a> Iterator for Suffixes<'a> {
    type Item = Suffix<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.pos?;
        let name = self.name.get(pos..)?;

        self.pos = if self.exact_match {
            None
        } else {
            name.find('.')
                .map(|dot| pos + dot + 1)
                .filter(|&next| next < self.name.len())
        };

        Some(Suffix {
            name,
            is_full_hostname: pos == 0,
        })
    }
}
