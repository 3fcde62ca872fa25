/*!
 * Fork Configuration
 * Channel placement and argument matching policy
 *
 * Environment variables:
 * - SELFFORK_TMPDIR: directory for argument channel files (default: OS temp dir)
 * - SELFFORK_PREFIX: channel file name prefix (default: selffork_)
 * - SELFFORK_STRICT: compare argument schemas as well as kinds (1/true)
 */

use crate::core::serde::{is_none, optional_pathbuf_string};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default prefix of argument channel files
pub const DEFAULT_FILE_PREFIX: &str = "selffork_";

/// How strictly arguments are checked against a target signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Matching {
    /// Compare coarse kinds only
    #[default]
    Kind,
    /// Compare coarse kinds and the concrete schema tag of every argument
    Strict,
}

/// Configuration applied to every launch of a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ForkConfig {
    #[serde(
        with = "optional_pathbuf_string",
        skip_serializing_if = "is_none",
        default
    )]
    pub temp_dir: Option<PathBuf>,
    pub file_prefix: String,
    #[serde(default)]
    pub matching: Matching,
}

impl ForkConfig {
    pub fn new() -> Self {
        Self {
            temp_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            matching: Matching::Kind,
        }
    }

    /// Build a configuration from `SELFFORK_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::new();

        if let Some(dir) = std::env::var_os("SELFFORK_TMPDIR") {
            if !dir.is_empty() {
                config.temp_dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(prefix) = std::env::var("SELFFORK_PREFIX") {
            if !prefix.is_empty() {
                config.file_prefix = prefix;
            }
        }

        let strict = std::env::var("SELFFORK_STRICT")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if strict {
            config.matching = Matching::Strict;
        }

        config
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    pub fn with_matching(mut self, matching: Matching) -> Self {
        self.matching = matching;
        self
    }

    /// Directory channel files are created in
    pub fn channel_dir(&self) -> PathBuf {
        match self.temp_dir {
            Some(ref dir) => dir.clone(),
            None => std::env::temp_dir(),
        }
    }

    pub fn is_strict(&self) -> bool {
        self.matching == Matching::Strict
    }
}

impl Default for ForkConfig {
    fn default() -> Self {
        Self::new()
    }
}
