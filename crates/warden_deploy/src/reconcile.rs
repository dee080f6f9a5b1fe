use warden_core::function::{PolicyFunctionSpec, FUNCTION_PREFIX};
use warden_core::remote::{config_delta, RemoteFunctionRecord};

use crate::adapters::functions::{CodeRef, FunctionApi};
use crate::adapters::rules::EventRuleApi;
use crate::adapters::upload::{CodeUploader, S3Location};
use crate::binding::EventBindingReconciler;
use crate::bundle::build_policy_archive;
use crate::error::DeployError;

/// Create-or-update reconciliation for a policy function, its alias, and
/// its event bindings.
///
/// Every remote call blocks until complete and the steps are strictly
/// ordered: archive build, lookup, code/configuration update, alias
/// publish, then each event binding in declaration order. Nothing is
/// rolled back on partial failure; the remote resource is the source of
/// truth for the next pass, so re-running reconciliation is the recovery
/// mechanism.
pub struct FunctionReconciler<'a> {
    functions: &'a dyn FunctionApi,
    rules: &'a dyn EventRuleApi,
    uploader: Option<&'a dyn CodeUploader>,
}

impl<'a> FunctionReconciler<'a> {
    pub fn new(functions: &'a dyn FunctionApi, rules: &'a dyn EventRuleApi) -> Self {
        Self {
            functions,
            rules,
            uploader: None,
        }
    }

    pub fn with_uploader(mut self, uploader: &'a dyn CodeUploader) -> Self {
        self.uploader = Some(uploader);
        self
    }

    /// Converge the remote function to the spec's desired state and return
    /// the resulting record.
    ///
    /// The code checksum and the configuration fields are diffed
    /// independently; either, both, or neither update call may fire. When
    /// `alias` is given it is published against the latest version and its
    /// identifier becomes the event binding target, which is what lets
    /// later deploys move traffic without rewriting bindings.
    pub fn reconcile(
        &self,
        spec: &PolicyFunctionSpec,
        alias: Option<&str>,
        upload_target: Option<&S3Location>,
    ) -> Result<RemoteFunctionRecord, DeployError> {
        let name = spec.function_name();
        let archive = build_policy_archive(spec)?;
        let existing = self.functions.get_function(name, alias)?;

        let code = match upload_target {
            Some(location) => {
                let uploader = self.uploader.ok_or_else(|| {
                    DeployError::InvalidUploadTarget("no code uploader configured".to_string())
                })?;
                let key = location.object_key(name);
                uploader.upload_archive(archive.path(), &location.bucket, &key)?;
                CodeRef::S3 {
                    bucket: location.bucket.clone(),
                    key,
                }
            }
            None => CodeRef::Zip(archive.bytes()?),
        };

        let record = match existing {
            None => {
                tracing::debug!(function = %name, "creating function");
                self.functions
                    .create_function(&spec.function_config(), &code)?
            }
            Some(remote) => {
                let mut record = remote.clone();
                if archive.checksum() != remote.code_sha256 {
                    tracing::debug!(function = %name, "updating function code");
                    record = self.functions.update_function_code(name, &code)?;
                }
                let desired = spec.function_config();
                if config_delta(&desired, &remote) {
                    tracing::debug!(function = %name, "updating function configuration");
                    record = self.functions.update_function_configuration(&desired)?;
                }
                record
            }
        };

        let target_arn = match alias {
            Some(alias_name) => self.publish_alias(&record, alias_name)?,
            None => record.function_arn.clone(),
        };

        let binding = EventBindingReconciler::new(self.rules);
        for descriptor in spec.events() {
            if binding.bind(descriptor, &target_arn, name)? {
                tracing::debug!(function = %name, "event binding applied");
            }
        }

        Ok(record)
    }

    /// Remove the function and its event bindings. Bindings go first so a
    /// surviving rule can never fire into a deleted function; deleting an
    /// absent function succeeds.
    pub fn remove(&self, spec: &PolicyFunctionSpec) -> Result<(), DeployError> {
        let name = spec.function_name();
        tracing::info!(function = %name, "removing policy function");
        let binding = EventBindingReconciler::new(self.rules);
        for _descriptor in spec.events() {
            binding.unbind(name)?;
        }
        match self.functions.delete_function(name) {
            Err(err) if err.is_not_found() => Ok(()),
            other => other.map_err(DeployError::from),
        }
    }

    /// Enumerate the remote functions this system provisioned.
    pub fn list_deployed(&self) -> Result<Vec<RemoteFunctionRecord>, DeployError> {
        Ok(self.functions.list_functions(Some(FUNCTION_PREFIX))?)
    }

    fn publish_alias(
        &self,
        record: &RemoteFunctionRecord,
        alias: &str,
    ) -> Result<String, DeployError> {
        match self.functions.get_alias(&record.function_name, alias)? {
            None => {
                tracing::debug!(function = %record.function_name, alias, "publishing alias");
                Ok(self
                    .functions
                    .create_alias(&record.function_name, alias, &record.version)?
                    .alias_arn)
            }
            Some(existing) if existing.function_version == record.version => {
                Ok(existing.alias_arn)
            }
            Some(_) => {
                tracing::debug!(function = %record.function_name, alias, "moving alias");
                Ok(self
                    .functions
                    .update_alias(&record.function_name, alias, &record.version)?
                    .alias_arn)
            }
        }
    }
}
