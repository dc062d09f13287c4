//! Engine-wide tunables (§6.2), loadable from an optional TOML file.
//!
//! `CONTINUOUS_COST` and `ε` are *not* here: the spec marks them
//! compile-time-only (§6.2), and `CONTINUOUS_COST` in particular is
//! modelled as an enum variant ([`crate::round::NextCost::Continuous`])
//! rather than a tunable sentinel value, so there is nothing to configure.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Resolution of C5's budget escalation: larger = finer steps, slower
/// convergence. Defaults to the spec's `100`.
pub const DEFAULT_DISTRIBUTION_PARAMETER: u32 = 100;

/// Safety cap on outer-loop iterations. Defaults to the spec's `1000`.
pub const DEFAULT_MAX_ROUNDS: u32 = 1000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub distribution_parameter: u32,
    pub max_rounds: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            distribution_parameter: DEFAULT_DISTRIBUTION_PARAMETER,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl EngineConfig {
    /// Load from a TOML file, falling back to defaults for any field the
    /// file omits. Missing file is not an error at this layer — callers
    /// that require the file to exist should check beforehand.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading engine config {}: {e}", path.display()))?;
        let cfg: EngineConfig = toml::from_str(&text)
            .map_err(|e| anyhow::anyhow!("parsing engine config {}: {e}", path.display()))?;
        Ok(cfg)
    }
}
