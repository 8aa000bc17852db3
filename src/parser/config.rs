use serde::{Deserialize, Serialize};

use crate::detector::DEFAULT_SNIFF_LIMIT;

/// Limits applied to every parse call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Documents larger than this are rejected before parsing (default: 16 MiB)
    pub max_input_bytes: usize,

    /// Leading bytes the sniffer may inspect (default: 4096)
    pub sniff_limit: usize,

    /// Maximum XML element nesting depth (default: 256)
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_input_bytes: 16 * 1024 * 1024,
            sniff_limit: DEFAULT_SNIFF_LIMIT,
            max_depth: 256,
        }
    }
}
