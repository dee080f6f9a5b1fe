use warden_core::function::FunctionConfig;
use warden_core::remote::{AliasRecord, RemoteFunctionRecord};
use warden_core::RemoteError;

/// Reference to the code bundle passed on create/update calls: either the
/// raw sealed bytes or an object already uploaded to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeRef {
    Zip(Vec<u8>),
    S3 { bucket: String, key: String },
}

/// Function and alias operations against the provider. Lookups report
/// absence as `Ok(None)`; every other failure is an error.
pub trait FunctionApi {
    fn get_function(
        &self,
        name: &str,
        qualifier: Option<&str>,
    ) -> Result<Option<RemoteFunctionRecord>, RemoteError>;

    fn create_function(
        &self,
        config: &FunctionConfig,
        code: &CodeRef,
    ) -> Result<RemoteFunctionRecord, RemoteError>;

    fn update_function_code(
        &self,
        name: &str,
        code: &CodeRef,
    ) -> Result<RemoteFunctionRecord, RemoteError>;

    fn update_function_configuration(
        &self,
        config: &FunctionConfig,
    ) -> Result<RemoteFunctionRecord, RemoteError>;

    fn delete_function(&self, name: &str) -> Result<(), RemoteError>;

    fn get_alias(
        &self,
        function_name: &str,
        alias: &str,
    ) -> Result<Option<AliasRecord>, RemoteError>;

    fn create_alias(
        &self,
        function_name: &str,
        alias: &str,
        version: &str,
    ) -> Result<AliasRecord, RemoteError>;

    fn update_alias(
        &self,
        function_name: &str,
        alias: &str,
        version: &str,
    ) -> Result<AliasRecord, RemoteError>;

    fn list_functions(&self, prefix: Option<&str>)
        -> Result<Vec<RemoteFunctionRecord>, RemoteError>;
}
