use uuid::Uuid;

use warden_core::events::{rule_name, EventBindingDescriptor};
use warden_core::remote::{desired_rule, rule_delta, EventTargetRecord};
use warden_core::RemoteError;

use crate::adapters::rules::EventRuleApi;
use crate::error::DeployError;

/// Reconciles one event rule and its single delivery target against
/// remote state. Rule identity is always derived from the owning
/// function's name.
pub struct EventBindingReconciler<'a> {
    rules: &'a dyn EventRuleApi,
}

impl<'a> EventBindingReconciler<'a> {
    pub fn new(rules: &'a dyn EventRuleApi) -> Self {
        Self { rules }
    }

    /// Converge the rule derived from `descriptor` and point it at
    /// `target_arn`. Returns whether anything was created or changed.
    pub fn bind(
        &self,
        descriptor: &EventBindingDescriptor,
        target_arn: &str,
        owner: &str,
    ) -> Result<bool, DeployError> {
        let name = rule_name(owner);
        let desired = desired_rule(descriptor, &name);
        let mut changed = false;
        match self.rules.describe_rule(&name)? {
            None => {
                tracing::debug!(rule = %name, "creating event rule");
                self.rules.put_rule(&desired)?;
                changed = true;
            }
            Some(existing) if rule_delta(&desired, &existing) => {
                tracing::debug!(rule = %name, "updating event rule");
                self.rules.put_rule(&desired)?;
                changed = true;
            }
            Some(_) => {}
        }

        let targets = self.rules.list_targets(&name)?;
        if targets.iter().any(|target| target.arn == target_arn) {
            return Ok(changed);
        }

        // Stale targets left behind by earlier aliases are not pruned;
        // only the missing target is added.
        tracing::debug!(rule = %name, target = %target_arn, "adding event rule target");
        self.rules.put_target(
            &name,
            &EventTargetRecord {
                id: Uuid::new_v4().to_string(),
                arn: target_arn.to_string(),
            },
        )?;
        Ok(true)
    }

    /// Disable the rule. A missing rule is tolerated.
    pub fn pause(&self, owner: &str) -> Result<(), DeployError> {
        tolerate_missing(self.rules.disable_rule(&rule_name(owner)))
    }

    /// Re-enable the rule. A missing rule is tolerated.
    pub fn resume(&self, owner: &str) -> Result<(), DeployError> {
        tolerate_missing(self.rules.enable_rule(&rule_name(owner)))
    }

    /// Delete the rule if it exists; absence is a no-op.
    pub fn unbind(&self, owner: &str) -> Result<(), DeployError> {
        let name = rule_name(owner);
        if self.rules.describe_rule(&name)?.is_some() {
            tracing::info!(rule = %name, "removing event rule");
            self.rules.delete_rule(&name)?;
        }
        Ok(())
    }
}

fn tolerate_missing(result: Result<(), RemoteError>) -> Result<(), DeployError> {
    match result {
        Err(err) if err.is_not_found() => Ok(()),
        other => other.map_err(DeployError::from),
    }
}
