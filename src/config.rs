//! Session Configuration

use std::path::PathBuf;

use crate::vector::{KeyPolicy, DEFAULT_TOP_N};

/// Output file used until the user picks another one
pub const DEFAULT_OUTPUT_PATH: &str = "./out.txt";

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// File that rendered results are appended to
    pub output_path: PathBuf,

    /// Matches reported when a query gives no count
    pub default_top_n: usize,

    /// Key matching used for newly loaded stores
    pub key_policy: KeyPolicy,

    /// Append results to `output_path` in addition to stdout
    pub write_results: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            default_top_n: DEFAULT_TOP_N,
            key_policy: KeyPolicy::Exact,
            write_results: true,
        }
    }
}

impl Config {
    /// Set the results file
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    /// Set the default number of matches
    pub fn with_top_n(mut self, n: usize) -> Self {
        self.default_top_n = n;
        self
    }

    pub fn with_key_policy(mut self, policy: KeyPolicy) -> Self {
        self.key_policy = policy;
        self
    }

    /// Enable or disable writing results to the output file
    pub fn with_write_results(mut self, enabled: bool) -> Self {
        self.write_results = enabled;
        self
    }
}
