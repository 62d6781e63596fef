use std::{fmt::Debug, path::PathBuf};

use snat_adjuster_core::helpers::With;
use thiserror::Error;
use url::Url;

use crate::cli::GlobalArgs;

pub const ACCESS_KEY_ENV_VAR: &str = "AK";
pub const SECRET_KEY_ENV_VAR: &str = "SK";
pub const REGION_ENV_VAR: &str = "REGION";
pub const ENDPOINT_ENV_VAR: &str = "VOLC_ENDPOINT";
pub const KUBECONFIG_ENV_VAR: &str = "KUBECONFIG";

pub const DEFAULT_REGION: &str = "ap-southeast-1";
pub const DEFAULT_ENDPOINT: &str = "https://open.volcengineapi.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Required env var {} is unset or empty!", .0)]
    VarUnset(&'static str),
    #[error("Gateway API endpoint '{}' is invalid! Reason: {}", .0, .1)]
    InvalidEndpoint(String, url::ParseError),
}

#[derive(Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub credentials: Credentials,
    pub region: String,
    pub endpoint: Url,
}

#[derive(Debug, Clone)]
pub struct KubeConfigSource {
    /// try the in-cluster service account before falling back to the kubeconfig
    pub prefer_in_cluster: bool,
    /// `None` when there's no explicit path, no KUBECONFIG and no home dir
    pub kube_config: Option<PathBuf>,
    pub kube_context: Option<String>,
}

/// Everything the process needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct AdjusterConfig {
    pub gateway: GatewayConfig,
    pub kube: KubeConfigSource,
    pub namespace: Option<String>,
    pub dry_run: bool,
}

impl AdjusterConfig {
    pub fn from_env(args: &GlobalArgs) -> Result<Self, ConfigError> {
        Self::from_lookup(args, |key| std::env::var(key).ok(), home::home_dir())
    }

    pub fn from_lookup(
        args: &GlobalArgs,
        lookup: impl Fn(&str) -> Option<String>,
        home_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let credentials = Credentials {
            access_key: var(ACCESS_KEY_ENV_VAR).ok_or(ConfigError::VarUnset(ACCESS_KEY_ENV_VAR))?,
            secret_key: var(SECRET_KEY_ENV_VAR).ok_or(ConfigError::VarUnset(SECRET_KEY_ENV_VAR))?,
        };
        let region = args
            .region
            .clone()
            .or_else(|| var(REGION_ENV_VAR))
            .unwrap_or_else(|| DEFAULT_REGION.to_owned());
        let endpoint = args
            .endpoint
            .clone()
            .or_else(|| var(ENDPOINT_ENV_VAR))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        let endpoint = Url::parse(&endpoint)
            .map_err(|error| ConfigError::InvalidEndpoint(endpoint.clone(), error))?;

        let kube_config = match &args.kube_config {
            Some(path) => Some(PathBuf::from(path)),
            None => var(KUBECONFIG_ENV_VAR).map(PathBuf::from).or_else(|| {
                home_dir.map(|d| d.with(|d| d.push(".kube")).with(|d| d.push("config")))
            }),
        };

        Ok(Self {
            gateway: GatewayConfig {
                credentials,
                region,
                endpoint,
            },
            kube: KubeConfigSource {
                prefer_in_cluster: args.kube_config.is_none() && args.kube_context.is_none(),
                kube_config,
                kube_context: args.kube_context.clone(),
            },
            namespace: args.namespace.clone(),
            dry_run: args.dry_run,
        })
    }
}
