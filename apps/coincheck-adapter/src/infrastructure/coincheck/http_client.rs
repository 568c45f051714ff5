//! HTTP client for the Coincheck REST API.
//!
//! One HTTP request per port call; retrying is the gateway's job. Private
//! endpoints are signed with HMAC-SHA256 over `nonce + url + body`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, StatusCode};
use sha2::Sha256;

use crate::application::ports::{
    OrderCreateRequest, RawPayload, TradeAllRequest, VenueError, VenuePort,
};
use crate::domain::shared::OrderId;

use super::api_types::StatusEnvelope;
use super::capabilities::{CredentialField, capabilities};
use super::config::CoincheckConfig;

type HmacSha256 = Hmac<Sha256>;

/// Endpoint access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Private,
}

/// HTTP client for Coincheck.
#[derive(Debug)]
pub struct CoincheckHttpClient {
    client: Client,
    api_key: String,
    api_secret: String,
    base_url: String,
    last_nonce: AtomicU64,
}

impl CoincheckHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &CoincheckConfig) -> Result<Self, VenueError> {
        let missing = capabilities().missing_credentials(&config.credentials);
        if !missing.is_empty() {
            let fields: Vec<_> = missing.iter().map(CredentialField::as_str).collect();
            return Err(VenueError::Configuration {
                message: format!("missing credentials: {}", fields.join(", ")),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VenueError::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: config.credentials.key.clone(),
            api_secret: config.credentials.secret.clone(),
            base_url: config.base_url.clone(),
            last_nonce: AtomicU64::new(0),
        })
    }

    /// Next nonce: milliseconds since the epoch, bumped past the previous
    /// nonce when two requests land in the same millisecond.
    fn next_nonce(&self) -> u64 {
        let now = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let mut previous = self.last_nonce.load(Ordering::Relaxed);
        loop {
            let next = now.max(previous + 1);
            match self.last_nonce.compare_exchange_weak(
                previous,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return next,
                Err(actual) => previous = actual,
            }
        }
    }

    fn signature(&self, nonce: u64, url: &str, body: &str) -> Result<String, VenueError> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes()).map_err(|e| {
            VenueError::Configuration {
                message: e.to_string(),
            }
        })?;
        mac.update(nonce.to_string().as_bytes());
        mac.update(url.as_bytes());
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<String>,
        access: Access,
    ) -> Result<RawPayload, VenueError> {
        let url = format!("{}{path_and_query}", self.base_url);
        let body = body.unwrap_or_default();

        let mut request = self.client.request(method.clone(), &url);
        if !body.is_empty() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }
        if access == Access::Private {
            let nonce = self.next_nonce();
            request = request
                .header("ACCESS-KEY", &self.api_key)
                .header("ACCESS-NONCE", nonce.to_string())
                .header("ACCESS-SIGNATURE", self.signature(nonce, &url, &body)?);
        }

        tracing::debug!(method = %method, url = %url, "Coincheck request");

        let response = request.send().await.map_err(|e| VenueError::Network {
            message: e.to_string(),
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| VenueError::Network {
            message: e.to_string(),
        })?;

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(VenueError::Authentication);
        }
        if !status.is_success() {
            return Err(VenueError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        if let Ok(StatusEnvelope {
            success: Some(false),
            error,
        }) = serde_json::from_str::<StatusEnvelope>(&text)
        {
            return Err(VenueError::Rejected {
                reason: error.unwrap_or_else(|| "unspecified".to_string()),
            });
        }

        Ok(text)
    }
}

#[async_trait]
impl VenuePort for CoincheckHttpClient {
    async fn balance(&self) -> Result<RawPayload, VenueError> {
        self.request(Method::GET, "/api/accounts/balance", None, Access::Private)
            .await
    }

    async fn ticker_all(&self) -> Result<RawPayload, VenueError> {
        self.request(Method::GET, "/api/ticker", None, Access::Public)
            .await
    }

    async fn order_create(&self, request: &OrderCreateRequest) -> Result<RawPayload, VenueError> {
        let body = serde_json::to_string(request).map_err(|e| VenueError::Configuration {
            message: e.to_string(),
        })?;

        tracing::info!(
            order_type = request.order_type,
            pair = %request.pair,
            amount = %request.amount,
            rate = %request.rate,
            "Submitting order to Coincheck"
        );

        self.request(Method::POST, "/api/exchange/orders", Some(body), Access::Private)
            .await
    }

    async fn order_cancel(&self, order_id: &OrderId) -> Result<RawPayload, VenueError> {
        tracing::info!(order_id = %order_id, "Canceling order");
        self.request(
            Method::DELETE,
            &format!("/api/exchange/orders/{order_id}"),
            None,
            Access::Private,
        )
        .await
    }

    async fn order_opens(&self) -> Result<RawPayload, VenueError> {
        self.request(Method::GET, "/api/exchange/orders/opens", None, Access::Private)
            .await
    }

    async fn trade_all(&self, request: &TradeAllRequest) -> Result<RawPayload, VenueError> {
        self.request(
            Method::GET,
            &format!("/api/trades?pair={}&limit={}", request.pair, request.limit),
            None,
            Access::Public,
        )
        .await
    }
}
