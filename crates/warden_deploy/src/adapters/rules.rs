use warden_core::remote::{EventRuleRecord, EventTargetRecord};
use warden_core::RemoteError;

/// Event rule and target operations against the provider. Rule lookups
/// report absence as `Ok(None)`; state mutations on a missing rule return
/// `RemoteError::NotFound` so callers can tolerate it where the contract
/// allows.
pub trait EventRuleApi {
    fn describe_rule(&self, name: &str) -> Result<Option<EventRuleRecord>, RemoteError>;

    fn put_rule(&self, rule: &EventRuleRecord) -> Result<(), RemoteError>;

    fn list_targets(&self, rule_name: &str) -> Result<Vec<EventTargetRecord>, RemoteError>;

    fn put_target(&self, rule_name: &str, target: &EventTargetRecord) -> Result<(), RemoteError>;

    fn enable_rule(&self, name: &str) -> Result<(), RemoteError>;

    fn disable_rule(&self, name: &str) -> Result<(), RemoteError>;

    fn delete_rule(&self, name: &str) -> Result<(), RemoteError>;
}
