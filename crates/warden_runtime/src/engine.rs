use serde_json::Value;

use warden_core::policy::PolicyDocument;

use crate::config::ExecutionConfig;
use crate::dispatch::InvocationContext;

/// One executable policy, reconstructed from its embedded description.
pub trait Policy {
    fn name(&self) -> &str;

    /// Execute against an inbound event. `resources` carries whatever
    /// resource state the engine resolved beforehand, if any.
    fn push(
        &self,
        event: &Value,
        context: &InvocationContext,
        resources: Option<&Value>,
    ) -> Result<(), String>;
}

/// Policy evaluation seam. Given the embedded policy document, the engine
/// reconstructs executable policies; evaluation itself lives entirely
/// behind this trait.
pub trait PolicyEngine: Send + Sync {
    fn load(
        &self,
        config: &ExecutionConfig,
        document: &PolicyDocument,
    ) -> Result<Vec<Box<dyn Policy>>, String>;
}
