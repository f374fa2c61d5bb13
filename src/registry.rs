// src/registry.rs
//! External company-registry proxy client: pass-through JSON lookups against
//! a configured base URL, throttled by an injected token bucket. The payload
//! is forwarded as-is; the registry's schema is not our contract.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::config::RegistryConfig;
use crate::ratelimit::TokenBucket;

pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    bucket: TokenBucket,
}

impl RegistryClient {
    pub fn new(cfg: &RegistryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            bucket: TokenBucket::new(cfg.rate_capacity, cfg.rate_refill),
        }
    }

    /// Spend one token from the outbound budget. The caller maps a refusal
    /// to its own 429.
    pub fn allow(&self) -> bool {
        self.bucket.try_acquire()
    }

    fn company_url(&self, company_number: &str) -> String {
        format!("{}/company/{}", self.base_url, company_number)
    }

    /// Look up a company at the registry. `Ok(None)` means the registry
    /// answered 404; transport and non-404 error statuses bubble up.
    pub async fn company(&self, company_number: &str) -> Result<Option<Value>> {
        let mut req = self.http.get(self.company_url(company_number));
        if let Some(key) = &self.api_key {
            // Registry-style auth: key as basic-auth user, empty password.
            req = req.basic_auth(key, Some(""));
        }
        let resp = req.send().await.context("registry request failed")?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp
            .error_for_status()
            .context("registry returned an error status")?;
        let body = resp
            .json::<Value>()
            .await
            .context("registry returned invalid JSON")?;
        Ok(Some(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(capacity: u32) -> RegistryClient {
        RegistryClient::new(&RegistryConfig {
            base_url: "https://registry.example/api/".into(),
            api_key: None,
            rate_capacity: capacity,
            rate_refill: Duration::from_secs(60),
        })
    }

    #[test]
    fn company_url_joins_without_double_slash() {
        let c = client(1);
        assert_eq!(
            c.company_url("00000006"),
            "https://registry.example/api/company/00000006"
        );
    }

    #[test]
    fn allow_consumes_the_injected_budget() {
        let c = client(2);
        assert!(c.allow());
        assert!(c.allow());
        assert!(!c.allow());
    }
}
