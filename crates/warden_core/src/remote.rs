//! Provider-agnostic views of remote resource state, plus the diff
//! predicates that decide whether a mutation is required.

use crate::events::EventBindingDescriptor;
use crate::function::FunctionConfig;

/// The provider's record of a deployed function. Absence on lookup is a
/// normal outcome, represented as `Option::None` at the adapter seam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFunctionRecord {
    pub function_name: String,
    pub function_arn: String,
    pub role: String,
    pub description: String,
    pub runtime: String,
    pub handler: String,
    pub memory_size: i32,
    pub timeout: i32,
    /// Base64-encoded SHA-256 of the deployed code bundle; the idempotency
    /// key compared against a freshly sealed archive.
    pub code_sha256: String,
    pub version: String,
}

/// A stable alias pointing at one published function version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasRecord {
    pub name: String,
    pub function_version: String,
    pub alias_arn: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleState {
    Enabled,
    Disabled,
}

/// An event rule, used both as the desired state computed from a binding
/// descriptor and as the observed remote state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRuleRecord {
    pub name: String,
    pub state: RuleState,
    pub event_pattern: Option<String>,
    pub schedule_expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTargetRecord {
    pub id: String,
    pub arn: String,
}

/// Desired rule state for a binding descriptor. Rules are always created
/// enabled; pause/resume flip the state afterwards.
pub fn desired_rule(descriptor: &EventBindingDescriptor, rule_name: &str) -> EventRuleRecord {
    EventRuleRecord {
        name: rule_name.to_string(),
        state: RuleState::Enabled,
        event_pattern: descriptor.event_pattern(),
        schedule_expression: descriptor.schedule_expression().map(str::to_string),
    }
}

/// True when any desired configuration field differs from the remote
/// record. The comparison is one-directional: only the fields this system
/// derives are checked, so server-populated extras never force an update.
pub fn config_delta(desired: &FunctionConfig, remote: &RemoteFunctionRecord) -> bool {
    desired.function_name != remote.function_name
        || desired.memory_size != remote.memory_size
        || desired.role != remote.role
        || desired.description != remote.description
        || desired.runtime != remote.runtime
        || desired.handler != remote.handler
        || desired.timeout != remote.timeout
}

/// True when the rules differ in state, pattern, or schedule. Name is
/// already implied by the lookup.
pub fn rule_delta(desired: &EventRuleRecord, existing: &EventRuleRecord) -> bool {
    desired.state != existing.state
        || desired.event_pattern != existing.event_pattern
        || desired.schedule_expression != existing.schedule_expression
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{DEFAULT_MEMORY_MB, DEFAULT_TIMEOUT_SECS, HANDLER, RUNTIME};

    fn desired() -> FunctionConfig {
        FunctionConfig {
            function_name: "warden-ec2-tag-compliance".to_string(),
            memory_size: DEFAULT_MEMORY_MB,
            role: "arn:aws:iam::644160558196:role/warden".to_string(),
            description: "warden policy function".to_string(),
            runtime: RUNTIME.to_string(),
            handler: HANDLER.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }

    fn remote() -> RemoteFunctionRecord {
        let config = desired();
        RemoteFunctionRecord {
            function_name: config.function_name,
            function_arn: "arn:aws:lambda:us-east-1:644160558196:function:warden-ec2-tag-compliance"
                .to_string(),
            role: config.role,
            description: config.description,
            runtime: config.runtime,
            handler: config.handler,
            memory_size: config.memory_size,
            timeout: config.timeout,
            code_sha256: "abc123=".to_string(),
            version: "1".to_string(),
        }
    }

    #[test]
    fn matching_configuration_has_no_delta() {
        assert!(!config_delta(&desired(), &remote()));
    }

    #[test]
    fn any_single_field_change_is_a_delta() {
        let mut changed = desired();
        changed.timeout = 90;
        assert!(config_delta(&changed, &remote()));

        let mut changed = desired();
        changed.memory_size = 1024;
        assert!(config_delta(&changed, &remote()));
    }

    #[test]
    fn remote_only_fields_never_force_an_update() {
        let mut observed = remote();
        observed.code_sha256 = "different".to_string();
        observed.version = "7".to_string();
        assert!(!config_delta(&desired(), &observed));
    }

    #[test]
    fn rule_delta_checks_state_pattern_and_schedule() {
        let base = EventRuleRecord {
            name: "warden-s3-bucket-check".to_string(),
            state: RuleState::Enabled,
            event_pattern: None,
            schedule_expression: Some("rate(1 day)".to_string()),
        };
        assert!(!rule_delta(&base, &base.clone()));

        let mut disabled = base.clone();
        disabled.state = RuleState::Disabled;
        assert!(rule_delta(&base, &disabled));

        let mut rescheduled = base.clone();
        rescheduled.schedule_expression = Some("rate(2 days)".to_string());
        assert!(rule_delta(&base, &rescheduled));
    }
}
