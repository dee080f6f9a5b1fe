use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use warden_core::entry::{CONFIG_FILE_NAME, ENTRY_FILE_NAME};
use warden_core::policy::PolicyDocument;

use crate::config::ExecutionConfig;
use crate::engine::PolicyEngine;
use crate::error::DispatchError;

/// Trigger category of an inbound event, fixed at bundle-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventCategory {
    ScheduledTick,
    ResourceStateChange,
    AuditTrailCall,
}

/// Handler selected by the dispatch manifest. The manifest is generated
/// when the bundle is built, so no runtime inspection of the event shape
/// is needed to pick a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Periodic,
    CloudTrail,
    Ec2InstanceState,
    AsgInstanceState,
}

impl DispatchMode {
    pub fn from_symbol(symbol: &str) -> Result<Self, DispatchError> {
        match symbol {
            "periodic_handle" => Ok(Self::Periodic),
            "cloudtrail_handle" => Ok(Self::CloudTrail),
            "ec2_instance_state_handle" => Ok(Self::Ec2InstanceState),
            "asg_instance_state_handle" => Ok(Self::AsgInstanceState),
            other => Err(DispatchError::UnknownDispatchSymbol(other.to_string())),
        }
    }

    pub fn category(self) -> EventCategory {
        match self {
            Self::Periodic => EventCategory::ScheduledTick,
            Self::CloudTrail => EventCategory::AuditTrailCall,
            Self::Ec2InstanceState | Self::AsgInstanceState => EventCategory::ResourceStateChange,
        }
    }

    fn log_line(self) -> &'static str {
        match self {
            Self::Periodic => "processing scheduled event",
            Self::CloudTrail => "processing trail event",
            Self::Ec2InstanceState => "processing instance state event",
            Self::AsgInstanceState => "processing autoscaling event",
        }
    }
}

#[derive(Debug, Deserialize)]
struct EntryManifest {
    dispatch: String,
}

/// Invocation metadata handed to policies alongside the event.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvocationContext {
    pub request_id: String,
    pub function_arn: String,
    pub deadline_ms: u64,
}

impl From<&lambda_runtime::Context> for InvocationContext {
    fn from(context: &lambda_runtime::Context) -> Self {
        Self {
            request_id: context.request_id.clone(),
            function_arn: context.invoked_function_arn.clone(),
            deadline_ms: context.deadline,
        }
    }
}

/// The runtime-side view of a deployed bundle: the dispatch manifest and
/// the embedded policy document.
#[derive(Debug)]
pub struct EntryPoint {
    mode: DispatchMode,
    document: PolicyDocument,
    config: ExecutionConfig,
}

impl EntryPoint {
    pub fn load(bundle_root: &Path) -> Result<Self, DispatchError> {
        let manifest: EntryManifest = read_json(&bundle_root.join(ENTRY_FILE_NAME))?;
        let document: PolicyDocument = read_json(&bundle_root.join(CONFIG_FILE_NAME))?;
        Ok(Self {
            mode: DispatchMode::from_symbol(&manifest.dispatch)?,
            document,
            config: ExecutionConfig::default(),
        })
    }

    /// Load from the directory the execution environment extracted the
    /// bundle into.
    pub fn from_task_root() -> Result<Self, DispatchError> {
        let root = env::var("LAMBDA_TASK_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        Self::load(&root)
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    /// Reconstruct the embedded policies and push the event into each.
    ///
    /// Resource-state resolution is the engine's responsibility; this
    /// contract ends at handing the event and context to the policy.
    pub fn handle(
        &self,
        event: &Value,
        context: &InvocationContext,
        engine: &dyn PolicyEngine,
    ) -> Result<Value, DispatchError> {
        tracing::info!(event = %format_event(event), "{}", self.mode.log_line());
        let policies = engine
            .load(&self.config, &self.document)
            .map_err(DispatchError::Engine)?;
        for policy in &policies {
            policy
                .push(event, context, None)
                .map_err(|message| DispatchError::Policy {
                    name: policy.name().to_string(),
                    message,
                })?;
        }
        Ok(json!({"status": "ok", "policies": policies.len()}))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DispatchError> {
    let contents = fs::read_to_string(path).map_err(|source| DispatchError::MissingBundleFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| DispatchError::MalformedBundleFile {
        path: path.to_path_buf(),
        source,
    })
}

fn format_event(event: &Value) -> String {
    serde_json::to_string_pretty(event).unwrap_or_else(|_| event.to_string())
}

/// Run the entry point under the hosted runtime. The policy-engine crate
/// provides the bootstrap binary and calls this from its main.
pub async fn serve(engine: Arc<dyn PolicyEngine>) -> Result<(), Error> {
    let entry = Arc::new(EntryPoint::from_task_root()?);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let entry = Arc::clone(&entry);
        let engine = Arc::clone(&engine);
        async move {
            let context = InvocationContext::from(&event.context);
            entry
                .handle(&event.payload, &context, engine.as_ref())
                .map_err(Error::from)
        }
    }))
    .await
}
