//! AWS Secrets Manager loader.
//!
//! # Session
//!
//! - **Default credential chain**: environment, shared profiles, SSO, instance roles
//! - **Assume role**: set `roleArn` to fetch with temporary STS credentials
//! - **MFA**: set `mfaSerial` alongside `roleArn` to be prompted once for a token code
//! - **MFA profiles**: a `profile` whose shared config section has `role_arn`,
//!   `mfa_serial` and `source_profile` is assumed here with the same prompt,
//!   using `source_profile` for the base credentials
//!
//! # Options
//!
//! | key           | meaning                                      |
//! |---------------|----------------------------------------------|
//! | `region`      | AWS region override                          |
//! | `profile`     | shared config profile name                   |
//! | `endpointUrl` | custom endpoint (LocalStack, test doubles)   |
//! | `roleArn`     | role to assume before fetching               |
//! | `mfaSerial`   | MFA device serial/ARN for the assumed role   |
//! | `sessionName` | STS session name (default `secretsenv`)      |
//!
//! # Secret Format
//!
//! The secret string must be a flat JSON object. Strings, numbers and
//! booleans become string fields; anything else is rejected.

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_runtime::env_config::file::EnvConfigFiles;
use aws_types::os_shim_internal::{Env, Fs};
use dialoguer::Input;
use serde::Deserialize;
use serde_json::Value;
use std::time::SystemTime;
use tracing::{debug, info};

use super::{LoaderOptions, SecretLoader, SecretResult};

/// Type tag this loader is registered under.
pub const LOADER_TYPE: &str = "aws";

const DEFAULT_SESSION_NAME: &str = "secretsenv";

/// Options understood by [`AwsSecretsManagerLoader`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub role_arn: Option<String>,
    pub mfa_serial: Option<String>,
    pub session_name: Option<String>,
}

impl AwsOptions {
    /// Read AWS options out of an entry's option bag. Unknown keys are ignored.
    pub fn from_options(options: &LoaderOptions) -> Result<Self> {
        serde_json::from_value(Value::Object(options.clone()))
            .context("Invalid options for the aws loader")
    }
}

/// Loads secrets from AWS Secrets Manager.
#[derive(Debug, Default)]
pub struct AwsSecretsManagerLoader;

impl AwsSecretsManagerLoader {
    pub fn new() -> Self {
        Self
    }

    async fn fetch_secret_string(&self, secret_id: &str, options: &AwsOptions) -> Result<String> {
        let sdk_config = build_sdk_config(options).await?;
        let client = aws_sdk_secretsmanager::Client::new(&sdk_config);

        debug!(secret_id, "Fetching secret from AWS Secrets Manager");
        let output = client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to get secret '{}': {}",
                    secret_id,
                    aws_sdk_secretsmanager::error::DisplayErrorContext(&e)
                )
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .with_context(|| format!("Secret '{}' has no string value", secret_id))
    }
}

impl SecretLoader for AwsSecretsManagerLoader {
    fn load(&self, secret_id: &str, options: &LoaderOptions) -> Result<SecretResult> {
        let options = AwsOptions::from_options(options)?;

        // The SDK is async; each load blocks on its own runtime.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to start async runtime for the AWS SDK")?;

        let secret_string = runtime.block_on(self.fetch_secret_string(secret_id, &options))?;

        parse_secret_document(secret_id, &secret_string)
    }
}

/// Assume-role settings of an MFA-protected shared config profile.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ProfileRole {
    role_arn: String,
    mfa_serial: String,
    source_profile: String,
}

impl ProfileRole {
    /// Read the role from profile keys; `None` unless all three keys are set.
    fn from_profile<'a>(get: impl Fn(&str) -> Option<&'a str>) -> Option<Self> {
        Some(Self {
            role_arn: get("role_arn")?.to_string(),
            mfa_serial: get("mfa_serial")?.to_string(),
            source_profile: get("source_profile")?.to_string(),
        })
    }

    /// Options that assume the role ourselves on top of `source_profile`.
    fn apply(self, options: &AwsOptions) -> AwsOptions {
        AwsOptions {
            profile: Some(self.source_profile),
            role_arn: Some(self.role_arn),
            mfa_serial: Some(self.mfa_serial),
            ..options.clone()
        }
    }
}

/// Expand `profile` into explicit assume-role options when it needs MFA.
async fn with_profile_role(options: &AwsOptions) -> Result<AwsOptions> {
    let (Some(profile_name), None) = (&options.profile, &options.role_arn) else {
        return Ok(options.clone());
    };

    let sections = aws_config::profile::load(
        &Fs::real(),
        &Env::real(),
        &EnvConfigFiles::default(),
        None,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to read AWS shared config: {}", e))?;

    let role = sections
        .get_profile(profile_name)
        .and_then(|profile| ProfileRole::from_profile(|key| profile.get(key)));

    match role {
        Some(role) => {
            info!(
                profile = %profile_name,
                source_profile = %role.source_profile,
                "Profile requires MFA; assuming its role directly"
            );
            Ok(role.apply(options))
        }
        None => Ok(options.clone()),
    }
}

/// Build the SDK config for one load: default chain plus overrides.
async fn build_sdk_config(options: &AwsOptions) -> Result<SdkConfig> {
    let options = &with_profile_role(options).await?;
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &options.profile {
        info!(profile = %profile, "Using AWS profile");
        loader = loader.profile_name(profile);
    }
    if let Some(endpoint) = &options.endpoint_url {
        info!(endpoint = %endpoint, "Using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;

    match &options.role_arn {
        Some(role_arn) => assume_role(&sdk_config, role_arn, options).await,
        None => Ok(sdk_config),
    }
}

/// Swap the config's credentials for temporary ones from `sts:AssumeRole`.
async fn assume_role(sdk_config: &SdkConfig, role_arn: &str, options: &AwsOptions) -> Result<SdkConfig> {
    info!(role_arn, "Assuming AWS role");

    let session_name = options
        .session_name
        .as_deref()
        .unwrap_or(DEFAULT_SESSION_NAME);

    let sts = aws_sdk_sts::Client::new(sdk_config);
    let mut request = sts
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(session_name);

    if let Some(serial) = &options.mfa_serial {
        let token_code = prompt_mfa_token()?;
        request = request.serial_number(serial).token_code(token_code);
    }

    let output = request.send().await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to assume role '{}': {}",
            role_arn,
            aws_sdk_sts::error::DisplayErrorContext(&e)
        )
    })?;

    let assumed = output
        .credentials()
        .with_context(|| format!("AssumeRole for '{}' returned no credentials", role_arn))?;

    let credentials = Credentials::new(
        assumed.access_key_id(),
        assumed.secret_access_key(),
        Some(assumed.session_token().to_string()),
        SystemTime::try_from(*assumed.expiration()).ok(),
        "secretsenv-assume-role",
    );

    Ok(sdk_config
        .to_builder()
        .credentials_provider(SharedCredentialsProvider::new(credentials))
        .build())
}

/// Ask for the MFA token code on the terminal (stderr).
fn prompt_mfa_token() -> Result<String> {
    let code: String = Input::new()
        .with_prompt("Assume Role MFA token code")
        .interact_text()
        .context("Failed to read MFA token code")?;

    Ok(code.trim().to_string())
}

/// Flatten a JSON secret document into string fields.
///
/// # Errors
///
/// Returns an error if the document is not a JSON object or a field holds
/// null, an array or an object.
pub fn parse_secret_document(secret_id: &str, document: &str) -> Result<SecretResult> {
    let json: Value = serde_json::from_str(document)
        .with_context(|| format!("Secret '{}' is not valid JSON", secret_id))?;

    let Value::Object(fields) = json else {
        anyhow::bail!("Secret '{}' must be a JSON object with key-value pairs", secret_id);
    };

    let mut secrets = SecretResult::with_capacity(fields.len());
    for (key, value) in fields {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => canonical_number(&n),
            Value::Bool(b) => b.to_string(),
            _ => anyhow::bail!("Key {} in secret for {} is not a string", key, secret_id),
        };
        secrets.insert(key, value);
    }

    debug!(secret_id, fields = secrets.len(), "Parsed secret document");
    Ok(secrets)
}

/// Integers keep their exact text; floats drop a zero fraction (`1.0` -> `1`).
fn canonical_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}
