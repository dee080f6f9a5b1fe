use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative trigger descriptor carried on a policy's `mode` block.
///
/// The set of meaningful fields depends on `kind`; unknown kinds are
/// rejected when the event-binding descriptor is derived, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModeConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i32>,
}

/// One policy as produced by the policy-loading collaborator.
///
/// Only `name` and `mode` matter to this crate; filters, actions, and
/// resource expressions ride along opaquely in `data` so the embedded
/// document round-trips without loss.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyDescription {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mode: ModeConfig,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

/// Shape of the configuration document embedded in every bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyDocument {
    pub policies: Vec<PolicyDescription>,
}

/// Render the embedded configuration document for a single policy.
///
/// Exactly one policy per bundle; the document is UTF-8 JSON of shape
/// `{"policies": [<description>]}`. Deployment tuning (role, memory,
/// timeout) lives in the function configuration, not in the bundle;
/// leaving it out keeps the code checksum stable across
/// configuration-only changes.
pub fn render_policy_document(policy: &PolicyDescription) -> String {
    let mut embedded = policy.clone();
    embedded.mode.role = None;
    embedded.mode.memory = None;
    embedded.mode.timeout = None;
    let document = PolicyDocument {
        policies: vec![embedded],
    };
    serde_json::to_string_pretty(&document)
        .expect("serialization of a policy document should not fail")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_policy() -> PolicyDescription {
        serde_json::from_value(json!({
            "name": "ec2-tag-compliance",
            "mode": {
                "type": "cloudtrail",
                "sources": ["ec2.amazonaws.com"],
                "events": ["RunInstances"],
                "role": "arn:aws:iam::644160558196:role/warden"
            },
            "filters": [{"tag:required": "absent"}],
            "actions": ["stop"]
        }))
        .expect("sample policy should parse")
    }

    #[test]
    fn preserves_opaque_policy_fields() {
        let policy = sample_policy();
        assert_eq!(policy.name, "ec2-tag-compliance");
        assert!(policy.data.contains_key("filters"));
        assert!(policy.data.contains_key("actions"));

        let round_trip: PolicyDescription =
            serde_json::from_str(&serde_json::to_string(&policy).expect("serialize"))
                .expect("round trip");
        assert_eq!(round_trip, policy);
    }

    #[test]
    fn document_holds_exactly_one_policy() {
        let rendered = render_policy_document(&sample_policy());
        let document: PolicyDocument =
            serde_json::from_str(&rendered).expect("document should parse");
        assert_eq!(document.policies.len(), 1);
        assert_eq!(document.policies[0].name, "ec2-tag-compliance");
    }

    #[test]
    fn document_leaves_deployment_tuning_out() {
        let mut policy = sample_policy();
        policy.mode.memory = Some(1024);
        policy.mode.timeout = Some(120);

        let baseline = render_policy_document(&sample_policy());
        let tuned = render_policy_document(&policy);
        assert_eq!(tuned, baseline);

        let document: PolicyDocument =
            serde_json::from_str(&tuned).expect("document should parse");
        let mode = &document.policies[0].mode;
        assert_eq!(mode.role, None);
        assert_eq!(mode.timeout, None);
        assert_eq!(mode.kind, "cloudtrail");
        assert_eq!(mode.events, vec!["RunInstances".to_string()]);
    }

    #[test]
    fn mode_defaults_are_empty() {
        let mode: ModeConfig =
            serde_json::from_value(json!({"type": "periodic", "schedule": "rate(1 day)"}))
                .expect("mode should parse");
        assert!(mode.sources.is_empty());
        assert!(mode.events.is_empty());
        assert_eq!(mode.schedule.as_deref(), Some("rate(1 day)"));
        assert_eq!(mode.memory, None);
    }
}
