//! HTTP transport for the paybridge gateway client.
//!
//! Speaks JSON over HTTPS to the processor. Every request carries basic-auth
//! credentials (`publicKey:privateKey`) and the `X-ApiVersion` header, and is
//! bounded by the configured timeout.
//!
//! # Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | POST | `/merchants/{merchantId}/transactions` | Create a sale |
//! | POST | `/merchants/{merchantId}/client_token` | Generate a client token |
//! | GET | `/merchants/{merchantId}/customers/{customerId}` | Find a vaulted customer |
//!
//! # Errors
//!
//! - 401/403 map to [`TransportError::Unauthorized`]
//! - 404 maps to [`TransportError::NotFound`]
//! - any other non-2xx maps to [`TransportError::Api`], using the
//!   `{"error": {"code", "message"}}` body when the processor sends one

use std::{fmt, time::Duration};

use paybridge_sdk::GatewayTransport;
use paybridge_types::{
    ClientToken, ClientTokenOptions, CustomerRecord, Environment, GatewayCredentials,
    TransactionRequest, TransactionResult, TransportError,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;
use url::Url;

pub const PRODUCTION_API_URL: &str = "https://api.braintreegateway.com";
pub const SANDBOX_API_URL: &str = "https://api.sandbox.braintreegateway.com";
pub const API_VERSION: &str = "6";
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

const USER_AGENT: &str = concat!("paybridge/", env!("CARGO_PKG_VERSION"));

/// Processor base URL for an environment
pub fn default_api_url(environment: Environment) -> &'static str {
    match environment {
        Environment::Production => PRODUCTION_API_URL,
        Environment::Sandbox => SANDBOX_API_URL,
    }
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Overrides the environment's base URL (proxies, test servers)
    pub api_url: Option<Url>,

    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl HttpTransportConfig {
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = Some(api_url);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// State established by `initialize`
struct Session {
    client: Client,
    base_url: Url,
    merchant_id: String,
    public_key: String,
    private_key: String,
}

/// JSON-over-HTTPS gateway transport
#[derive(Default)]
pub struct HttpTransport {
    config: HttpTransportConfig,
    session: Option<Session>,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .field("initialized", &self.session.is_some())
            .finish()
    }
}

#[derive(Deserialize)]
struct TransactionEnvelope {
    transaction: TransactionResult,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenEnvelope<'a> {
    client_token: &'a ClientTokenOptions,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClientTokenResponse {
    client_token: ClientTokenValue,
}

#[derive(Deserialize)]
struct ClientTokenValue {
    value: String,
}

#[derive(Deserialize)]
struct CustomerEnvelope {
    customer: CustomerRecord,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session, TransportError> {
        self.session.as_ref().ok_or(TransportError::NotInitialized)
    }

    /// URL for a path below this merchant
    fn merchant_endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let session = self.session()?;
        let mut path = vec!["merchants", session.merchant_id.as_str()];
        path.extend_from_slice(segments);
        endpoint(&session.base_url, &path)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, TransportError> {
        let session = self.session()?;
        debug!("{} {}", method, url);

        Ok(session
            .client
            .request(method, url)
            .basic_auth(&session.public_key, Some(&session.private_key))
            .header("X-ApiVersion", API_VERSION)
            .header("Accept", "application/json"))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        let response = self
            .request(Method::GET, url)?
            .send()
            .await
            .map_err(map_reqwest_error)?;

        handle_response(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, TransportError> {
        let response = self
            .request(Method::POST, url)?
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        handle_response(response).await
    }
}

impl GatewayTransport for HttpTransport {
    async fn initialize(&mut self, credentials: &GatewayCredentials) -> Result<(), TransportError> {
        let base_url = match &self.config.api_url {
            Some(url) => url.clone(),
            None => Url::parse(default_api_url(credentials.environment()))
                .map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?,
        };
        // Fail early on URLs that cannot take a path
        endpoint(&base_url, &["merchants", credentials.merchant_id()])?;

        let client = Client::builder()
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .user_agent(USER_AGENT)
            .build()
            .map_err(map_reqwest_error)?;

        debug!(
            "HTTP transport initialized for {} ({})",
            base_url,
            credentials.environment()
        );

        self.session = Some(Session {
            client,
            base_url,
            merchant_id: credentials.merchant_id().to_string(),
            public_key: credentials.public_key().to_string(),
            private_key: credentials.private_key().to_string(),
        });
        Ok(())
    }

    async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionResult, TransportError> {
        let url = self.merchant_endpoint(&["transactions"])?;

        let mut transaction: Map<String, JsonValue> = request
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        transaction.insert("type".to_string(), JsonValue::String("sale".to_string()));

        let mut body = Map::new();
        body.insert("transaction".to_string(), JsonValue::Object(transaction));

        let envelope: TransactionEnvelope = self.post(url, &body).await?;
        Ok(envelope.transaction)
    }

    async fn create_client_token(
        &self,
        options: &ClientTokenOptions,
    ) -> Result<ClientToken, TransportError> {
        let url = self.merchant_endpoint(&["client_token"])?;
        let body = ClientTokenEnvelope {
            client_token: options,
        };

        let response: ClientTokenResponse = self.post(url, &body).await?;
        Ok(ClientToken::new(response.client_token.value))
    }

    async fn find_customer(&self, id: &str) -> Result<CustomerRecord, TransportError> {
        if id.trim().is_empty() {
            return Err(TransportError::NotFound);
        }
        let url = self.merchant_endpoint(&["customers", id])?;

        let envelope: CustomerEnvelope = self.get(url).await?;
        Ok(envelope.customer)
    }
}

/// Append percent-encoded path segments to `base`
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, TransportError> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| TransportError::InvalidEndpoint(base.to_string()))?;
        path.pop_if_empty().extend(segments);
    }
    Ok(url)
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_decode() {
        TransportError::Decode(e.to_string())
    } else {
        TransportError::Http(e.to_string())
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;

    if status.is_success() {
        return serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()));
    }

    let text = String::from_utf8_lossy(&body).into_owned();
    debug!("Gateway responded {}: {}", status, text);
    Err(error_from_response(status.as_u16(), &text))
}

fn error_from_response(status: u16, body: &str) -> TransportError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();

    match status {
        404 => TransportError::NotFound,
        401 | 403 => TransportError::Unauthorized(
            parsed
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|| format!("status {}", status)),
        ),
        _ => match parsed {
            Some(envelope) => TransportError::Api {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
            },
            None => TransportError::Api {
                status,
                code: None,
                message: if body.is_empty() {
                    format!("status {}", status)
                } else {
                    body.to_string()
                },
            },
        },
    }
}
