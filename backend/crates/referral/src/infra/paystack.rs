//! Paystack Bank API Client
//!
//! Bank directory and account-name resolution. A non-200 answer to a
//! resolve call is the provider refusing the account; anything else that
//! goes wrong is reported as the service being unavailable.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::config::PaystackConfig;
use crate::error::{ReferralError, ReferralResult, UpstreamFailure};

const DEFAULT_REJECTION: &str = "could not resolve account";

/// Bank entry exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bank {
    pub name: String,
    pub code: String,
    pub slug: String,
}

/// Account holder as reported by the bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAccount {
    pub account_name: String,
    pub account_number: String,
    pub bank_code: String,
}

#[derive(Debug, Deserialize)]
struct BankListResponse {
    #[serde(default)]
    data: Vec<RawBank>,
}

#[derive(Debug, Deserialize)]
struct RawBank {
    name: String,
    code: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    is_deleted: bool,
}

#[derive(Debug, Deserialize)]
struct ResolveResponse {
    data: ResolveData,
}

#[derive(Debug, Deserialize)]
struct ResolveData {
    account_name: String,
    account_number: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    message: Option<String>,
}

#[derive(Clone)]
pub struct PaystackClient {
    http: reqwest::Client,
    config: PaystackConfig,
}

impl PaystackClient {
    pub fn new(config: PaystackConfig) -> ReferralResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ReferralError::Internal(format!("failed to build http client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Active Nigerian banks
    pub async fn list_banks(&self) -> ReferralResult<Vec<Bank>> {
        let response = self
            .http
            .get(self.url("/bank"))
            .query(&[("country", "nigeria"), ("perPage", "100")])
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(unavailable)?;

        if response.status() != StatusCode::OK {
            return Err(ReferralError::Upstream(UpstreamFailure::Unavailable(format!(
                "bank list returned {}",
                response.status()
            ))));
        }

        let body = response.text().await.map_err(unavailable)?;
        parse_banks(&body)
    }

    pub async fn resolve_account(&self, account_number: &str, bank_code: &str) -> ReferralResult<ResolvedAccount> {
        let response = self
            .http
            .get(self.url("/bank/resolve"))
            .query(&[("account_number", account_number), ("bank_code", bank_code)])
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        let body = response.text().await.map_err(unavailable)?;

        if status != StatusCode::OK {
            return Err(ReferralError::Upstream(UpstreamFailure::Rejected(
                rejection_message(&body),
            )));
        }

        parse_resolved(&body, bank_code)
    }
}

fn unavailable(err: reqwest::Error) -> ReferralError {
    ReferralError::Upstream(UpstreamFailure::Unavailable(err.to_string()))
}

fn parse_banks(body: &str) -> ReferralResult<Vec<Bank>> {
    let parsed: BankListResponse = serde_json::from_str(body).map_err(|e| {
        ReferralError::Upstream(UpstreamFailure::Unavailable(format!("unreadable bank list: {}", e)))
    })?;

    Ok(parsed
        .data
        .into_iter()
        .filter(|bank| bank.active && !bank.is_deleted)
        .map(|bank| Bank {
            name: bank.name,
            code: bank.code,
            slug: bank.slug,
        })
        .collect())
}

fn parse_resolved(body: &str, bank_code: &str) -> ReferralResult<ResolvedAccount> {
    let parsed: ResolveResponse = serde_json::from_str(body).map_err(|e| {
        ReferralError::Upstream(UpstreamFailure::Unavailable(format!("unreadable resolve response: {}", e)))
    })?;

    Ok(ResolvedAccount {
        account_name: parsed.data.account_name,
        account_number: parsed.data.account_number,
        bank_code: bank_code.to_string(),
    })
}

fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION.to_string())
}
