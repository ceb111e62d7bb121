use std::fmt;

use paybridge_types::{
    ClientToken, CustomerRecord, GatewayCredentials, Lookup, PartialSettings, RequestFields,
    TransactionResult,
};
use tracing::{debug, info, warn};

use crate::{
    config,
    error::{GatewayError, Result},
    request::{RequestDefaults, TransactionRequestBuilder},
    source::ConfigSource,
    transport::GatewayTransport,
};

/// Lifecycle of a [`GatewayClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Credentials resolved, transport not initialized yet
    Unconfigured,
    /// Transport initialized; operations may be dispatched
    Ready,
    /// Transport initialization failed. Terminal: build a new client.
    Failed,
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientState::Unconfigured => write!(f, "unconfigured"),
            ClientState::Ready => write!(f, "ready"),
            ClientState::Failed => write!(f, "failed"),
        }
    }
}

/// Record kind targeted by the next [`GatewayClient::find`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupContext {
    #[default]
    None,
    Customer,
}

/// Payment gateway client
///
/// Owns one set of validated credentials and one transport. Several clients with
/// different credentials can live side by side in the same process.
///
/// The lookup context set by [`customer`](Self::customer) is instance state, so
/// `customer` and `find` take `&mut self`. Share a client across tasks only
/// behind your own lock.
///
/// # Example
///
/// ```ignore
/// use paybridge_sdk::{GatewayClient, PartialSettings, SaleFields};
///
/// let base = PartialSettings::new()
///     .with_merchant_id("merchant")
///     .with_public_key("public")
///     .with_private_key("private")
///     .with_production(false);
///
/// let mut client = GatewayClient::connect(&base, &PartialSettings::new(), transport).await?;
///
/// let token = client.generate_client_token(Some("cus_42")).await?;
/// let sale = client
///     .sale(SaleFields::new("10.00").with_payment_method_nonce(nonce).into())
///     .await?;
///
/// if let Lookup::Found(customer) = client.customer().find("cus_42").await {
///     println!("{}", customer.id);
/// }
/// ```
pub struct GatewayClient<T> {
    credentials: GatewayCredentials,
    defaults: RequestDefaults,
    transport: T,
    state: ClientState,
    context: LookupContext,
}

impl<T: GatewayTransport> GatewayClient<T> {
    /// Create an unconfigured client. Call [`initialize`](Self::initialize)
    /// before dispatching anything.
    pub fn new(credentials: GatewayCredentials, transport: T) -> Self {
        Self {
            defaults: RequestDefaults::from_credentials(&credentials),
            credentials,
            transport,
            state: ClientState::Unconfigured,
            context: LookupContext::None,
        }
    }

    /// Resolve `overrides` on top of `base`, then initialize the transport.
    pub async fn connect(
        base: &PartialSettings,
        overrides: &PartialSettings,
        transport: T,
    ) -> Result<Self> {
        let credentials = config::resolve(base, overrides)?;
        let mut client = Self::new(credentials, transport);
        client.initialize().await?;
        Ok(client)
    }

    /// Like [`connect`](Self::connect), reading the base layer from `source`.
    pub async fn connect_with_source(
        source: &impl ConfigSource,
        section: &str,
        overrides: &PartialSettings,
        transport: T,
    ) -> Result<Self> {
        let base = source.read(section);
        Self::connect(&base, overrides, transport).await
    }

    /// One-time transport initialization.
    ///
    /// Moves the client to [`ClientState::Ready`] on success and to
    /// [`ClientState::Failed`] otherwise. Calling it again on a ready client is a
    /// no-op; a failed client stays failed.
    pub async fn initialize(&mut self) -> Result<()> {
        match self.state {
            ClientState::Ready => return Ok(()),
            ClientState::Failed => return Err(GatewayError::NotReady(ClientState::Failed)),
            ClientState::Unconfigured => {}
        }

        match self.transport.initialize(&self.credentials).await {
            Ok(()) => {
                self.state = ClientState::Ready;
                info!(
                    "Gateway client ready (merchant: {}, environment: {})",
                    self.credentials.merchant_id(),
                    self.credentials.environment()
                );
                Ok(())
            }
            Err(e) => {
                self.state = ClientState::Failed;
                warn!(
                    "Gateway initialization failed for merchant {}: {}",
                    self.credentials.merchant_id(),
                    e
                );
                Err(GatewayError::Initialization(e))
            }
        }
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ClientState::Ready
    }

    pub fn credentials(&self) -> &GatewayCredentials {
        &self.credentials
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Current lookup context
    pub fn context(&self) -> LookupContext {
        self.context
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(GatewayError::NotReady(self.state))
        }
    }

    /// Submit a sale.
    ///
    /// The configured merchant account is applied unless `fields` names one.
    pub async fn sale(&self, fields: RequestFields) -> Result<TransactionResult> {
        if fields.is_empty() {
            return Err(GatewayError::Validation(
                "transaction information missing".to_string(),
            ));
        }
        self.ensure_ready()?;

        let request = TransactionRequestBuilder::build(fields, &self.defaults);
        debug!(
            "Submitting sale with {} fields (merchant account: {:?})",
            request.fields().len(),
            request.merchant_account_id()
        );

        let result = self
            .transport
            .create_transaction(&request)
            .await
            .map_err(GatewayError::Transaction)?;

        debug!("Sale {} returned status {:?}", result.id, result.status);
        Ok(result)
    }

    /// Generate a client token, optionally bound to a vaulted customer.
    pub async fn generate_client_token(&self, customer_id: Option<&str>) -> Result<ClientToken> {
        self.ensure_ready()?;

        let options = self.defaults.client_token_options(customer_id);
        debug!(
            "Generating client token (customer: {:?}, merchant account: {:?})",
            options.customer_id, options.merchant_account_id
        );

        self.transport
            .create_client_token(&options)
            .await
            .map_err(GatewayError::Transport)
    }

    /// Scope the next [`find`](Self::find) to customers.
    pub fn customer(&mut self) -> &mut Self {
        self.context = LookupContext::Customer;
        self
    }

    /// Look up a record in the current context, then reset the context.
    ///
    /// Without a context this does nothing and returns [`Lookup::NotFound`].
    pub async fn find(&mut self, id: &str) -> Lookup<CustomerRecord> {
        match std::mem::take(&mut self.context) {
            LookupContext::Customer => self.find_customer(id).await,
            LookupContext::None => {
                debug!("find({}) called without a lookup context", id);
                Lookup::NotFound
            }
        }
    }

    /// Look up a vaulted customer.
    ///
    /// Every failure comes back as [`Lookup::NotFound`]; transport failures other
    /// than a missing record are logged.
    pub async fn find_customer(&self, id: &str) -> Lookup<CustomerRecord> {
        if let Err(e) = self.ensure_ready() {
            warn!("Customer lookup for {} skipped: {}", id, e);
            return Lookup::NotFound;
        }

        match self.transport.find_customer(id).await {
            Ok(customer) => Lookup::Found(customer),
            Err(e) if e.is_not_found() => {
                debug!("Customer {} not found", id);
                Lookup::NotFound
            }
            Err(e) => {
                warn!("Customer lookup for {} failed: {}", id, e);
                Lookup::NotFound
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use paybridge_types::{
        ClientTokenOptions, Environment, RequiredField, TransactionRequest, TransactionStatus,
        TransportError,
    };
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::request::SaleFields;

    #[derive(Clone, Default)]
    struct MockTransport {
        reject_init: bool,
        sale_error: Option<TransportError>,
        lookup_error: Option<TransportError>,
        customers: Vec<CustomerRecord>,
        initialized_with: Arc<Mutex<Option<GatewayCredentials>>>,
        requests: Arc<Mutex<Vec<TransactionRequest>>>,
        token_options: Arc<Mutex<Vec<ClientTokenOptions>>>,
        lookups: Arc<Mutex<Vec<String>>>,
    }

    impl GatewayTransport for MockTransport {
        async fn initialize(
            &mut self,
            credentials: &GatewayCredentials,
        ) -> std::result::Result<(), TransportError> {
            if self.reject_init {
                return Err(TransportError::Unauthorized("bad credentials".to_string()));
            }
            *self.initialized_with.lock() = Some(credentials.clone());
            Ok(())
        }

        async fn create_transaction(
            &self,
            request: &TransactionRequest,
        ) -> std::result::Result<TransactionResult, TransportError> {
            self.requests.lock().push(request.clone());
            if let Some(e) = &self.sale_error {
                return Err(e.clone());
            }
            Ok(TransactionResult {
                id: "txn_1".to_string(),
                status: TransactionStatus::Authorized,
                amount: request.get("amount").map(|v| v.to_string()),
                currency_iso_code: None,
                merchant_account_id: request.merchant_account_id().map(str::to_string),
                customer_id: None,
                processor_response_code: Some("1000".to_string()),
                processor_response_text: Some("Approved".to_string()),
                created_at: None,
            })
        }

        async fn create_client_token(
            &self,
            options: &ClientTokenOptions,
        ) -> std::result::Result<ClientToken, TransportError> {
            self.token_options.lock().push(options.clone());
            Ok(ClientToken::new("token_abc"))
        }

        async fn find_customer(
            &self,
            id: &str,
        ) -> std::result::Result<CustomerRecord, TransportError> {
            self.lookups.lock().push(id.to_string());
            if let Some(e) = &self.lookup_error {
                return Err(e.clone());
            }
            self.customers
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or(TransportError::NotFound)
        }
    }

    fn base() -> PartialSettings {
        PartialSettings::new()
            .with_merchant_id("merchant")
            .with_public_key("public")
            .with_private_key("private")
    }

    fn amount(value: i64) -> RequestFields {
        let mut fields = RequestFields::new();
        fields.insert("amount".to_string(), json!(value));
        fields
    }

    async fn ready_client(
        merchant_account_id: Option<&str>,
        transport: MockTransport,
    ) -> GatewayClient<MockTransport> {
        let overrides = match merchant_account_id {
            Some(id) => PartialSettings::new().with_merchant_account_id(id),
            None => PartialSettings::new(),
        };
        GatewayClient::connect(&base(), &overrides, transport)
            .await
            .unwrap()
    }

    fn unconfigured_client(transport: MockTransport) -> GatewayClient<MockTransport> {
        let credentials = GatewayCredentials::from_settings(&base()).unwrap();
        GatewayClient::new(credentials, transport)
    }

    #[tokio::test]
    async fn test_connect_initializes_transport() {
        let transport = MockTransport::default();
        let initialized_with = transport.initialized_with.clone();

        let client = GatewayClient::connect(
            &base(),
            &PartialSettings::new().with_production(false),
            transport,
        )
        .await
        .unwrap();

        assert!(client.is_ready());
        assert_eq!(client.state(), ClientState::Ready);
        let credentials = initialized_with.lock().clone().unwrap();
        assert_eq!(credentials.merchant_id(), "merchant");
        assert_eq!(credentials.environment(), Environment::Sandbox);
    }

    #[tokio::test]
    async fn test_connect_reports_all_missing_fields() {
        let err = GatewayClient::connect(
            &PartialSettings::new().with_public_key("public"),
            &PartialSettings::new(),
            MockTransport::default(),
        )
        .await
        .err()
        .unwrap();

        match err {
            GatewayError::Config(e) => {
                assert_eq!(
                    e.missing,
                    vec![RequiredField::MerchantId, RequiredField::PrivateKey]
                );
            }
            other => panic!("Expected config error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_initialization_leaves_client_failed() {
        let transport = MockTransport {
            reject_init: true,
            ..Default::default()
        };
        let mut client = unconfigured_client(transport);
        assert!(!client.is_ready());

        let err = client.initialize().await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Initialization(TransportError::Unauthorized(_))
        ));
        assert_eq!(client.state(), ClientState::Failed);
        assert!(!client.is_ready());

        // Failed is terminal
        let err = client.initialize().await.unwrap_err();
        assert!(matches!(err, GatewayError::NotReady(ClientState::Failed)));
        assert!(!client.is_ready());
    }

    #[tokio::test]
    async fn test_connect_surfaces_initialization_error() {
        let transport = MockTransport {
            reject_init: true,
            ..Default::default()
        };
        let err = GatewayClient::connect(&base(), &PartialSettings::new(), transport)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::Initialization(_)));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent_when_ready() {
        let mut client = ready_client(None, MockTransport::default()).await;
        client.initialize().await.unwrap();
        assert!(client.is_ready());
    }

    #[tokio::test]
    async fn test_empty_sale_is_validation_error() {
        let client = ready_client(Some("A1"), MockTransport::default()).await;
        let err = client.sale(RequestFields::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));

        // Regardless of state
        let client = unconfigured_client(MockTransport::default());
        let err = client.sale(RequestFields::new()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sale_applies_default_merchant_account() {
        let transport = MockTransport::default();
        let requests = transport.requests.clone();
        let client = ready_client(Some("A1"), transport).await;

        let result = client.sale(amount(10)).await.unwrap();
        assert_eq!(result.merchant_account_id.as_deref(), Some("A1"));

        let mut fields = amount(10);
        fields.insert("merchantAccountId".to_string(), json!("B2"));
        client.sale(fields).await.unwrap();

        let requests = requests.lock();
        assert_eq!(requests[0].merchant_account_id(), Some("A1"));
        assert_eq!(requests[1].merchant_account_id(), Some("B2"));
    }

    #[tokio::test]
    async fn test_sale_accepts_sale_fields_builder() {
        let transport = MockTransport::default();
        let requests = transport.requests.clone();
        let client = ready_client(None, transport).await;

        client
            .sale(
                SaleFields::new("10.00")
                    .with_payment_method_nonce("fake-valid-nonce")
                    .into(),
            )
            .await
            .unwrap();

        let requests = requests.lock();
        assert_eq!(requests[0].get("paymentMethodNonce"), Some(&json!("fake-valid-nonce")));
        assert_eq!(requests[0].merchant_account_id(), None);
    }

    #[tokio::test]
    async fn test_sale_wraps_transport_failure() {
        let transport = MockTransport {
            sale_error: Some(TransportError::Api {
                status: 422,
                code: Some("81503".to_string()),
                message: "Amount is an invalid format.".to_string(),
            }),
            ..Default::default()
        };
        let client = ready_client(None, transport).await;

        let err = client.sale(amount(10)).await.unwrap_err();
        match &err {
            GatewayError::Transaction(TransportError::Api { status, code, message }) => {
                assert_eq!(*status, 422);
                assert_eq!(code.as_deref(), Some("81503"));
                assert_eq!(message, "Amount is an invalid format.");
            }
            other => panic!("Expected transaction error, got {other:?}"),
        }
        assert!(err.transport_error().is_some());
    }

    #[tokio::test]
    async fn test_sale_on_unconfigured_client() {
        let transport = MockTransport::default();
        let requests = transport.requests.clone();
        let client = unconfigured_client(transport);

        let err = client.sale(amount(10)).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotReady(ClientState::Unconfigured)));
        assert!(requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_client_token_requires_ready() {
        let client = unconfigured_client(MockTransport::default());
        for customer_id in [None, Some("cus_1"), Some("")] {
            let err = client.generate_client_token(customer_id).await.unwrap_err();
            assert!(matches!(err, GatewayError::NotReady(_)));
        }
    }

    #[tokio::test]
    async fn test_client_token_options() {
        let transport = MockTransport::default();
        let token_options = transport.token_options.clone();
        let client = ready_client(Some("A1"), transport).await;

        let token = client.generate_client_token(Some("cus_1")).await.unwrap();
        assert_eq!(token.as_str(), "token_abc");
        client.generate_client_token(None).await.unwrap();

        let options = token_options.lock();
        assert_eq!(options[0].customer_id.as_deref(), Some("cus_1"));
        assert_eq!(options[0].merchant_account_id.as_deref(), Some("A1"));
        assert_eq!(options[1].customer_id, None);
        assert_eq!(options[1].merchant_account_id.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn test_customer_find() {
        let transport = MockTransport {
            customers: vec![CustomerRecord::new("cus_1")],
            ..Default::default()
        };
        let mut client = ready_client(None, transport).await;

        let found = client.customer().find("cus_1").await;
        assert_eq!(found.found().map(|c| c.id.as_str()), Some("cus_1"));
        assert_eq!(client.context(), LookupContext::None);

        assert_eq!(client.customer().find("missing-id").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_find_without_context_is_not_found() {
        let transport = MockTransport {
            customers: vec![CustomerRecord::new("cus_1")],
            ..Default::default()
        };
        let lookups = transport.lookups.clone();
        let mut client = ready_client(None, transport).await;

        assert_eq!(client.find("cus_1").await, Lookup::NotFound);
        assert!(lookups.lock().is_empty());

        // Context is consumed by the previous find
        client.customer().find("cus_1").await;
        assert_eq!(client.find("cus_1").await, Lookup::NotFound);
        assert_eq!(lookups.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_find_swallows_transport_errors() {
        let transport = MockTransport {
            lookup_error: Some(TransportError::Timeout),
            ..Default::default()
        };
        let mut client = ready_client(None, transport).await;

        assert_eq!(client.customer().find("cus_1").await, Lookup::NotFound);
        assert_eq!(client.find_customer("cus_1").await, Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_find_customer_on_unconfigured_client() {
        let transport = MockTransport {
            customers: vec![CustomerRecord::new("cus_1")],
            ..Default::default()
        };
        let lookups = transport.lookups.clone();
        let client = unconfigured_client(transport);

        assert_eq!(client.find_customer("cus_1").await, Lookup::NotFound);
        assert!(lookups.lock().is_empty());
    }

    #[tokio::test]
    async fn test_connect_with_source() {
        let source = crate::source::EnvSource::from_vars([
            ("BRAINTREE_MERCHANT_ID", "env_merchant"),
            ("BRAINTREE_PUBLIC_KEY", "env_public"),
            ("BRAINTREE_PRIVATE_KEY", "env_private"),
            ("BRAINTREE_MERCHANT_ACCOUNT_ID", "A1"),
        ]);

        let client = GatewayClient::connect_with_source(
            &source,
            "braintree",
            &PartialSettings::new().with_merchant_account_id("B2"),
            MockTransport::default(),
        )
        .await
        .unwrap();

        assert_eq!(client.credentials().merchant_id(), "env_merchant");
        assert_eq!(client.credentials().merchant_account_id(), Some("B2"));
    }
}
