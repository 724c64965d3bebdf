use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::time::Duration;
use vital_access::SuperAdminAllowList;

// Resolver configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub authority_base_url: String,
    pub request_timeout: Duration,
    pub super_admin_allow_list: SuperAdminAllowList,
}

#[derive(Debug, Deserialize)]
struct ResolverConfigOverride {
    authority_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    super_admin_emails: Option<Vec<String>>,
}

impl ResolverConfig {
    pub fn from_env() -> Result<Self> {
        let authority_base_url = std::env::var("VITAL_AUTHORITY_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8700".to_string());
        let timeout_secs: u64 = std::env::var("VITAL_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .with_context(|| "parse VITAL_REQUEST_TIMEOUT_SECS")?;
        let emails = std::env::var("VITAL_SUPER_ADMIN_EMAILS").unwrap_or_default();
        let super_admin_allow_list =
            SuperAdminAllowList::new(emails.split(',').map(str::to_string));
        Ok(Self {
            authority_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            super_admin_allow_list,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("VITAL_RESOLVER_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read VITAL_RESOLVER_CONFIG: {path}"))?;
            let override_cfg: ResolverConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse resolver config yaml")?;
            if let Some(value) = override_cfg.authority_base_url {
                config.authority_base_url = value;
            }
            if let Some(value) = override_cfg.request_timeout_secs {
                config.request_timeout = Duration::from_secs(value);
            }
            if let Some(value) = override_cfg.super_admin_emails {
                config.super_admin_allow_list = SuperAdminAllowList::new(value);
            }
        }
        Ok(config)
    }
}
