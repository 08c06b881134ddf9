//! AWS session and credential-string handling
//!
//! A [`SessionConfig`] names the profile/region pair an operation should run
//! under. Endpoint and static-credential overrides exist for S3-compatible
//! services (MinIO, Wasabi) and for tests; production callers normally leave
//! them unset and rely on the standard AWS credential chain.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;

use crate::error::{FlowError, Result};

/// Profile/region selection plus optional overrides for S3-compatible
/// endpoints
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Named profile from ~/.aws/config and ~/.aws/credentials
    pub profile: Option<String>,
    /// AWS region (e.g., "us-west-2")
    pub region: Option<String>,
    /// Custom endpoint URL for S3-compatible services
    pub endpoint_url: Option<String>,
    /// Force path-style bucket addressing (required by some S3-compatible
    /// services)
    pub force_path_style: bool,
    /// Access key ID (optional, falls back to the AWS credential chain)
    pub access_key_id: Option<String>,
    /// Secret access key (optional, falls back to the AWS credential chain)
    pub secret_access_key: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: Some("default".to_string()),
            region: Some("us-west-2".to_string()),
            endpoint_url: None,
            force_path_style: false,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

impl SessionConfig {
    /// Config for a named profile/region pair
    pub fn new(profile: &str, region: &str) -> Self {
        Self {
            profile: Some(profile.to_string()),
            region: Some(region.to_string()),
            ..Default::default()
        }
    }
}

/// Load an authenticated session for the given profile/region pair.
///
/// Unknown profiles are not validated here; the SDK resolves credentials
/// lazily and surfaces its own error on first use.
pub async fn create_session(config: &SessionConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(ref profile) = config.profile {
        loader = loader.profile_name(profile);
    }

    if let Some(ref region) = config.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(ref endpoint) = config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    if let (Some(ref key_id), Some(ref secret)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        let creds = Credentials::new(
            key_id,
            secret,
            None, // session token
            None, // expiry
            "awsflow-static",
        );
        loader = loader.credentials_provider(creds);
    }

    loader.load().await
}

/// Resolve the session's current credentials and flatten them into a
/// `aws_access_key_id=...;aws_secret_access_key=...;token=...` string.
///
/// Creates a session when none is supplied. Expiry is not checked here;
/// that remains the caller's responsibility.
pub async fn credential_string(
    config: &SessionConfig,
    session: Option<&SdkConfig>,
) -> Result<String> {
    let owned;
    let session = match session {
        Some(s) => s,
        None => {
            owned = create_session(config).await;
            &owned
        }
    };

    let provider = session.credentials_provider().ok_or_else(|| {
        FlowError::Config("Session has no credentials provider configured".to_string())
    })?;
    let creds = provider.provide_credentials().await?;

    Ok(format!(
        "aws_access_key_id={};aws_secret_access_key={};token={}",
        creds.access_key_id(),
        creds.secret_access_key(),
        creds.session_token().unwrap_or_default()
    ))
}
