use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Execution settings for the runtime-side policy pass.
///
/// Bundles carry no overrides today; the defaults match the provisioning
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExecutionConfig {
    pub region: String,
    pub output_dir: PathBuf,
    pub cache_period: u64,
    pub dryrun: bool,
    pub metrics_enabled: bool,
    pub profile: Option<String>,
    pub assume_role: Option<String>,
    pub log_group: Option<String>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            output_dir: PathBuf::from("/tmp"),
            cache_period: 0,
            dryrun: false,
            metrics_enabled: false,
            profile: None,
            assume_role: None,
            log_group: None,
        }
    }
}
