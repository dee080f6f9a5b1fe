use std::path::PathBuf;

use crate::error::ConfigError;
use crate::events::EventBindingDescriptor;
use crate::policy::PolicyDescription;

/// Prefix applied to every function this system provisions. Function
/// identity is a pure function of the policy name, so repeated
/// reconciliation passes always target the same remote resource.
pub const FUNCTION_PREFIX: &str = "warden-";

/// Execution environment identifier for provisioned functions. The bundle
/// carries its own runtime binary, built by the policy-engine crate.
pub const RUNTIME: &str = "provided.al2023";

/// Fixed entry symbol. Ignored by custom runtimes but still part of the
/// derived configuration compared against remote state.
pub const HANDLER: &str = "bootstrap";

pub const DEFAULT_MEMORY_MB: i32 = 512;
pub const DEFAULT_TIMEOUT_SECS: i32 = 60;
pub const DEFAULT_DESCRIPTION: &str = "warden policy function";

/// Derive the remote function name for a policy.
pub fn function_name(policy_name: &str) -> String {
    format!("{FUNCTION_PREFIX}{policy_name}")
}

/// The full set of configuration fields this system derives and diffs
/// against remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionConfig {
    pub function_name: String,
    pub memory_size: i32,
    pub role: String,
    pub description: String,
    pub runtime: String,
    pub handler: String,
    pub timeout: i32,
}

/// On-disk inputs for the deployable bundle.
///
/// `source_root` holds the policy-facing source tree (a single file is
/// allowed); `library_root` holds the runtime support tree, typically the
/// directory containing the compiled runtime binary and its assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleLayout {
    pub source_root: PathBuf,
    pub library_root: Option<PathBuf>,
    /// Directory names pruned from the source walk (test trees and the
    /// like).
    pub source_prune: Vec<String>,
    /// Allow-list over top-level directory names beneath `library_root`;
    /// empty means everything. Trimming the library tree to the minimum
    /// runtime dependencies keeps bundles small.
    pub library_allow: Vec<String>,
    /// fnmatch-style glob over file names excluded everywhere.
    pub skip: Option<String>,
}

/// Deterministic, derived view of one policy as a deployable function.
///
/// Constructed fresh per reconciliation pass; construction validates the
/// mode type and the presence of an execution role before any remote call
/// is issued.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyFunctionSpec {
    policy: PolicyDescription,
    layout: BundleLayout,
    name: String,
    role: String,
    description: String,
    memory_size: i32,
    timeout: i32,
    events: Vec<EventBindingDescriptor>,
}

impl PolicyFunctionSpec {
    pub fn from_policy(
        policy: PolicyDescription,
        layout: BundleLayout,
    ) -> Result<Self, ConfigError> {
        let role = match policy.mode.role.as_deref() {
            Some(role) if !role.trim().is_empty() => role.to_string(),
            _ => {
                return Err(ConfigError::MissingRole {
                    policy: policy.name.clone(),
                })
            }
        };
        let descriptor = EventBindingDescriptor::from_mode(&policy.name, &policy.mode)?;

        Ok(Self {
            name: function_name(&policy.name),
            role,
            description: policy
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            memory_size: policy.mode.memory.unwrap_or(DEFAULT_MEMORY_MB),
            timeout: policy.mode.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS),
            events: vec![descriptor],
            policy,
            layout,
        })
    }

    pub fn function_name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> &PolicyDescription {
        &self.policy
    }

    pub fn layout(&self) -> &BundleLayout {
        &self.layout
    }

    /// Mode type tag, as declared on the policy.
    pub fn mode_kind(&self) -> &str {
        &self.policy.mode.kind
    }

    /// Event sources to bind, in declaration order.
    pub fn events(&self) -> &[EventBindingDescriptor] {
        &self.events
    }

    pub fn function_config(&self) -> FunctionConfig {
        FunctionConfig {
            function_name: self.name.clone(),
            memory_size: self.memory_size,
            role: self.role.clone(),
            description: self.description.clone(),
            runtime: RUNTIME.to_string(),
            handler: HANDLER.to_string(),
            timeout: self.timeout,
        }
    }
}
