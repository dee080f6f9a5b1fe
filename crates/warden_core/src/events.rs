use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ConfigError;
use crate::policy::ModeConfig;

/// Prefix applied to every event rule this system owns.
///
/// Rule identity is always derived from the owning function's name; rules
/// are never freely named.
pub const RULE_PREFIX: &str = "warden-";

/// Derive the rule name for a function. Idempotent: an already-prefixed
/// owner name passes through unchanged.
pub fn rule_name(owner: &str) -> String {
    if owner.starts_with(RULE_PREFIX) {
        owner.to_string()
    } else {
        format!("{RULE_PREFIX}{owner}")
    }
}

/// Event-source descriptor derived from a policy's mode block.
///
/// Exactly one descriptor is produced per declared mode; an unrecognized
/// mode type is a construction error, never a silent no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventBindingDescriptor {
    /// Audit-trail API calls, filtered by source service and call name.
    CloudTrail {
        sources: Vec<String>,
        events: Vec<String>,
    },
    /// Instance lifecycle notifications filtered by state value.
    Ec2InstanceState { states: Vec<String> },
    /// Autoscaling lifecycle notifications, declared via short aliases.
    AsgInstanceState { events: Vec<String> },
    /// Scheduled ticks; carries a rate or cron expression instead of a
    /// matching pattern.
    Periodic { schedule: String },
}

/// Translate an autoscaling short alias to the provider's canonical event
/// name. Unrecognized names pass through untouched.
fn canonical_asg_event(name: &str) -> &str {
    match name {
        "launch-success" => "EC2 Instance Launch Successful",
        "launch-failure" => "EC2 Instance Launch Unsuccessful",
        "terminate-success" => "EC2 Instance Terminate Successful",
        "terminate-failure" => "EC2 Instance Terminate Unsuccessful",
        other => other,
    }
}

#[derive(Serialize)]
struct EventPattern {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<Vec<String>>,
    #[serde(rename = "detail-type", skip_serializing_if = "Option::is_none")]
    detail_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Value>,
}

impl EventBindingDescriptor {
    pub fn from_mode(policy_name: &str, mode: &ModeConfig) -> Result<Self, ConfigError> {
        match mode.kind.as_str() {
            "cloudtrail" => Ok(Self::CloudTrail {
                sources: mode.sources.clone(),
                events: mode.events.clone(),
            }),
            "ec2-instance-state" => Ok(Self::Ec2InstanceState {
                states: mode.events.clone(),
            }),
            "asg-instance-state" => Ok(Self::AsgInstanceState {
                events: mode.events.clone(),
            }),
            "periodic" => match &mode.schedule {
                Some(schedule) if !schedule.trim().is_empty() => Ok(Self::Periodic {
                    schedule: schedule.clone(),
                }),
                _ => Err(ConfigError::MissingSchedule {
                    policy: policy_name.to_string(),
                }),
            },
            other => Err(ConfigError::UnknownModeType {
                kind: other.to_string(),
            }),
        }
    }

    /// Render the provider-native event-matching pattern, if this source
    /// matches on event shape. Periodic sources produce no pattern.
    pub fn event_pattern(&self) -> Option<String> {
        let pattern = match self {
            Self::CloudTrail { sources, events } => EventPattern {
                source: None,
                detail_type: Some(vec!["AWS API Call via CloudTrail".to_string()]),
                detail: Some(json!({
                    "eventSource": sources,
                    "eventName": events,
                })),
            },
            Self::Ec2InstanceState { states } => EventPattern {
                source: Some(vec!["aws.ec2".to_string()]),
                detail_type: Some(vec![
                    "EC2 Instance State-change Notifications".to_string(),
                ]),
                // An empty state list would match every transition; more
                // likely a misconfiguration than an intent, but allowed.
                detail: Some(json!({ "state": states })),
            },
            Self::AsgInstanceState { events } => EventPattern {
                source: Some(vec!["aws.autoscaling".to_string()]),
                detail_type: Some(
                    events
                        .iter()
                        .map(|event| canonical_asg_event(event).to_string())
                        .collect(),
                ),
                detail: None,
            },
            Self::Periodic { .. } => return None,
        };
        Some(
            serde_json::to_string_pretty(&pattern)
                .expect("serialization of an event pattern should not fail"),
        )
    }

    /// The schedule expression for periodic sources.
    pub fn schedule_expression(&self) -> Option<&str> {
        match self {
            Self::Periodic { schedule } => Some(schedule),
            _ => None,
        }
    }
}
