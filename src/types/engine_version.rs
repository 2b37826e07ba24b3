// ABOUTME: Database engine version parsing.
// ABOUTME: Handles RDS version strings like 16, 15.7, 8.0.32 and 5.7.mysql_aurora.2.11.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseEngineVersionError {
    #[error("engine version cannot be empty")]
    Empty,

    #[error("invalid engine version: {0}")]
    InvalidFormat(String),
}

/// A parsed engine version. Only the numeric `major.minor` prefix is
/// interpreted; the rest is kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    raw: String,
    major: u32,
    minor: u32,
}

impl EngineVersion {
    pub fn parse(input: &str) -> Result<Self, ParseEngineVersionError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseEngineVersionError::Empty);
        }

        let mut parts = input.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| ParseEngineVersionError::InvalidFormat(input.to_string()))?;

        // A missing minor means "16" == "16.0"; a non-numeric one is malformed.
        let minor = match parts.next() {
            None => 0,
            Some(p) => p
                .parse::<u32>()
                .map_err(|_| ParseEngineVersionError::InvalidFormat(input.to_string()))?,
        };

        Ok(Self {
            raw: input.to_string(),
            major,
            minor,
        })
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// True when `major.minor` matches exactly, ignoring the patch level.
    pub fn same_minor_series(&self, major: u32, minor: u32) -> bool {
        self.major == major && self.minor == minor
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
