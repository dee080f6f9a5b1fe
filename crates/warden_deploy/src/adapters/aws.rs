//! AWS SDK implementations of the adapter seams.
//!
//! The reconcilers are synchronous and strictly ordered, so these
//! adapters bridge onto the async SDK clients from inside a
//! multi-threaded Tokio runtime.

use std::future::Future;
use std::path::Path;

use aws_config::BehaviorVersion;
use aws_sdk_eventbridge::types::{RuleState as AwsRuleState, Target};
use aws_sdk_lambda::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{FunctionCode, Runtime};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ServerSideEncryption;

use warden_core::function::FunctionConfig;
use warden_core::remote::{
    AliasRecord, EventRuleRecord, EventTargetRecord, RemoteFunctionRecord, RuleState,
};
use warden_core::RemoteError;

use crate::adapters::functions::{CodeRef, FunctionApi};
use crate::adapters::rules::EventRuleApi;
use crate::adapters::upload::CodeUploader;

fn block_on<T>(future: impl Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

fn is_not_found<E, R>(err: &SdkError<E, R>) -> bool
where
    E: ProvideErrorMetadata,
{
    err.as_service_error()
        .map(|service| service.meta().code() == Some("ResourceNotFoundException"))
        .unwrap_or(false)
}

fn map_call_error<E, R>(operation: &'static str, resource: &str, err: SdkError<E, R>) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    if is_not_found(&err) {
        RemoteError::not_found(resource)
    } else {
        RemoteError::call(operation, err)
    }
}

// The four function call outputs expose an identical accessor surface on
// distinct generated types.
macro_rules! function_record {
    ($output:expr) => {
        RemoteFunctionRecord {
            function_name: $output.function_name().unwrap_or_default().to_string(),
            function_arn: $output.function_arn().unwrap_or_default().to_string(),
            role: $output.role().unwrap_or_default().to_string(),
            description: $output.description().unwrap_or_default().to_string(),
            runtime: $output
                .runtime()
                .map(|runtime| runtime.as_str().to_string())
                .unwrap_or_default(),
            handler: $output.handler().unwrap_or_default().to_string(),
            memory_size: $output.memory_size().unwrap_or_default(),
            timeout: $output.timeout().unwrap_or_default(),
            code_sha256: $output.code_sha256().unwrap_or_default().to_string(),
            version: $output.version().unwrap_or_default().to_string(),
        }
    };
}

pub struct LambdaFunctionApi {
    client: aws_sdk_lambda::Client,
}

impl LambdaFunctionApi {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_lambda::Client::new(config),
        }
    }

    pub async fn from_default_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(&config)
    }
}

impl FunctionApi for LambdaFunctionApi {
    fn get_function(
        &self,
        name: &str,
        qualifier: Option<&str>,
    ) -> Result<Option<RemoteFunctionRecord>, RemoteError> {
        block_on(async {
            let result = self
                .client
                .get_function()
                .function_name(name)
                .set_qualifier(qualifier.map(str::to_string))
                .send()
                .await;
            match result {
                Ok(output) => {
                    let configuration = output.configuration().ok_or_else(|| {
                        RemoteError::call("GetFunction", "response carried no configuration")
                    })?;
                    Ok(Some(function_record!(configuration)))
                }
                Err(err) if is_not_found(&err) => Ok(None),
                Err(err) => Err(RemoteError::call("GetFunction", err)),
            }
        })
    }

    fn create_function(
        &self,
        config: &FunctionConfig,
        code: &CodeRef,
    ) -> Result<RemoteFunctionRecord, RemoteError> {
        let code = match code {
            CodeRef::Zip(bytes) => FunctionCode::builder()
                .zip_file(Blob::new(bytes.clone()))
                .build(),
            CodeRef::S3 { bucket, key } => FunctionCode::builder()
                .s3_bucket(bucket.as_str())
                .s3_key(key.as_str())
                .build(),
        };
        block_on(async {
            let output = self
                .client
                .create_function()
                .function_name(config.function_name.as_str())
                .runtime(Runtime::from(config.runtime.as_str()))
                .role(config.role.as_str())
                .handler(config.handler.as_str())
                .description(config.description.as_str())
                .memory_size(config.memory_size)
                .timeout(config.timeout)
                .publish(true)
                .code(code)
                .send()
                .await
                .map_err(|err| RemoteError::call("CreateFunction", err))?;
            Ok(function_record!(output))
        })
    }

    fn update_function_code(
        &self,
        name: &str,
        code: &CodeRef,
    ) -> Result<RemoteFunctionRecord, RemoteError> {
        block_on(async {
            let mut request = self
                .client
                .update_function_code()
                .function_name(name)
                .publish(true);
            request = match code {
                CodeRef::Zip(bytes) => request.zip_file(Blob::new(bytes.clone())),
                CodeRef::S3 { bucket, key } => {
                    request.s3_bucket(bucket.as_str()).s3_key(key.as_str())
                }
            };
            let output = request
                .send()
                .await
                .map_err(|err| RemoteError::call("UpdateFunctionCode", err))?;
            Ok(function_record!(output))
        })
    }

    fn update_function_configuration(
        &self,
        config: &FunctionConfig,
    ) -> Result<RemoteFunctionRecord, RemoteError> {
        block_on(async {
            let output = self
                .client
                .update_function_configuration()
                .function_name(config.function_name.as_str())
                .runtime(Runtime::from(config.runtime.as_str()))
                .role(config.role.as_str())
                .handler(config.handler.as_str())
                .description(config.description.as_str())
                .memory_size(config.memory_size)
                .timeout(config.timeout)
                .send()
                .await
                .map_err(|err| RemoteError::call("UpdateFunctionConfiguration", err))?;
            Ok(function_record!(output))
        })
    }

    fn delete_function(&self, name: &str) -> Result<(), RemoteError> {
        block_on(async {
            self.client
                .delete_function()
                .function_name(name)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| map_call_error("DeleteFunction", name, err))
        })
    }

    fn get_alias(
        &self,
        function_name: &str,
        alias: &str,
    ) -> Result<Option<AliasRecord>, RemoteError> {
        block_on(async {
            let result = self
                .client
                .get_alias()
                .function_name(function_name)
                .name(alias)
                .send()
                .await;
            match result {
                Ok(output) => Ok(Some(AliasRecord {
                    name: output.name().unwrap_or(alias).to_string(),
                    function_version: output.function_version().unwrap_or_default().to_string(),
                    alias_arn: output.alias_arn().unwrap_or_default().to_string(),
                })),
                Err(err) if is_not_found(&err) => Ok(None),
                Err(err) => Err(RemoteError::call("GetAlias", err)),
            }
        })
    }

    fn create_alias(
        &self,
        function_name: &str,
        alias: &str,
        version: &str,
    ) -> Result<AliasRecord, RemoteError> {
        block_on(async {
            let output = self
                .client
                .create_alias()
                .function_name(function_name)
                .name(alias)
                .function_version(version)
                .send()
                .await
                .map_err(|err| RemoteError::call("CreateAlias", err))?;
            Ok(AliasRecord {
                name: output.name().unwrap_or(alias).to_string(),
                function_version: output.function_version().unwrap_or(version).to_string(),
                alias_arn: output.alias_arn().unwrap_or_default().to_string(),
            })
        })
    }

    fn update_alias(
        &self,
        function_name: &str,
        alias: &str,
        version: &str,
    ) -> Result<AliasRecord, RemoteError> {
        block_on(async {
            let output = self
                .client
                .update_alias()
                .function_name(function_name)
                .name(alias)
                .function_version(version)
                .send()
                .await
                .map_err(|err| RemoteError::call("UpdateAlias", err))?;
            Ok(AliasRecord {
                name: output.name().unwrap_or(alias).to_string(),
                function_version: output.function_version().unwrap_or(version).to_string(),
                alias_arn: output.alias_arn().unwrap_or_default().to_string(),
            })
        })
    }

    fn list_functions(
        &self,
        prefix: Option<&str>,
    ) -> Result<Vec<RemoteFunctionRecord>, RemoteError> {
        block_on(async {
            let mut records = Vec::new();
            let mut marker: Option<String> = None;
            loop {
                let output = self
                    .client
                    .list_functions()
                    .set_marker(marker.clone())
                    .send()
                    .await
                    .map_err(|err| RemoteError::call("ListFunctions", err))?;
                for configuration in output.functions() {
                    let record = function_record!(configuration);
                    if prefix
                        .map(|prefix| record.function_name.starts_with(prefix))
                        .unwrap_or(true)
                    {
                        records.push(record);
                    }
                }
                marker = output.next_marker().map(str::to_string);
                if marker.is_none() {
                    break;
                }
            }
            Ok(records)
        })
    }
}

pub struct EventBridgeRuleApi {
    client: aws_sdk_eventbridge::Client,
}

impl EventBridgeRuleApi {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_eventbridge::Client::new(config),
        }
    }

    pub async fn from_default_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(&config)
    }
}

fn rule_state(state: Option<&AwsRuleState>) -> RuleState {
    match state {
        Some(AwsRuleState::Disabled) => RuleState::Disabled,
        _ => RuleState::Enabled,
    }
}

impl EventRuleApi for EventBridgeRuleApi {
    fn describe_rule(&self, name: &str) -> Result<Option<EventRuleRecord>, RemoteError> {
        block_on(async {
            let result = self.client.describe_rule().name(name).send().await;
            match result {
                Ok(output) => Ok(Some(EventRuleRecord {
                    name: output.name().unwrap_or(name).to_string(),
                    state: rule_state(output.state()),
                    event_pattern: output.event_pattern().map(str::to_string),
                    schedule_expression: output.schedule_expression().map(str::to_string),
                })),
                Err(err) if is_not_found(&err) => Ok(None),
                Err(err) => Err(RemoteError::call("DescribeRule", err)),
            }
        })
    }

    fn put_rule(&self, rule: &EventRuleRecord) -> Result<(), RemoteError> {
        block_on(async {
            self.client
                .put_rule()
                .name(rule.name.as_str())
                .state(match rule.state {
                    RuleState::Enabled => AwsRuleState::Enabled,
                    RuleState::Disabled => AwsRuleState::Disabled,
                })
                .set_event_pattern(rule.event_pattern.clone())
                .set_schedule_expression(rule.schedule_expression.clone())
                .send()
                .await
                .map(|_| ())
                .map_err(|err| RemoteError::call("PutRule", err))
        })
    }

    fn list_targets(&self, rule_name: &str) -> Result<Vec<EventTargetRecord>, RemoteError> {
        block_on(async {
            let output = self
                .client
                .list_targets_by_rule()
                .rule(rule_name)
                .send()
                .await
                .map_err(|err| RemoteError::call("ListTargetsByRule", err))?;
            Ok(output
                .targets()
                .iter()
                .map(|target| EventTargetRecord {
                    id: target.id().to_string(),
                    arn: target.arn().to_string(),
                })
                .collect())
        })
    }

    fn put_target(&self, rule_name: &str, target: &EventTargetRecord) -> Result<(), RemoteError> {
        let target = Target::builder()
            .id(target.id.as_str())
            .arn(target.arn.as_str())
            .build()
            .map_err(|err| RemoteError::call("PutTargets", err))?;
        block_on(async {
            self.client
                .put_targets()
                .rule(rule_name)
                .targets(target)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| RemoteError::call("PutTargets", err))
        })
    }

    fn enable_rule(&self, name: &str) -> Result<(), RemoteError> {
        block_on(async {
            self.client
                .enable_rule()
                .name(name)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| map_call_error("EnableRule", name, err))
        })
    }

    fn disable_rule(&self, name: &str) -> Result<(), RemoteError> {
        block_on(async {
            self.client
                .disable_rule()
                .name(name)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| map_call_error("DisableRule", name, err))
        })
    }

    fn delete_rule(&self, name: &str) -> Result<(), RemoteError> {
        block_on(async {
            self.client
                .delete_rule()
                .name(name)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| map_call_error("DeleteRule", name, err))
        })
    }
}

/// Default transfer mechanism for bundles referenced by object location
/// instead of inline bytes.
pub struct S3CodeUploader {
    client: aws_sdk_s3::Client,
}

impl S3CodeUploader {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
        }
    }

    pub async fn from_default_env() -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        Self::new(&config)
    }
}

impl CodeUploader for S3CodeUploader {
    fn upload_archive(
        &self,
        archive_path: &Path,
        bucket: &str,
        key: &str,
    ) -> Result<(), RemoteError> {
        block_on(async {
            let body = ByteStream::from_path(archive_path)
                .await
                .map_err(|err| RemoteError::call("PutObject", err))?;
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .server_side_encryption(ServerSideEncryption::Aes256)
                .body(body)
                .send()
                .await
                .map(|_| ())
                .map_err(|err| RemoteError::call("PutObject", err))
        })
    }
}
