//! HTTP client for the pharmacy backend.

use crate::gateway::{CatalogSource, OrderGateway, SaleGateway};
use crate::GatewayError;
use async_trait::async_trait;
use medcart_core::catalog::MedicineRecord;
use medcart_core::checkout::{
    CompletedSale, OrderPaymentMode, OrderRequest, PaymentOutcome, PlacedOrder, SaleRequest,
};
use medcart_core::OrderId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Which catalog listing the client reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogScope {
    /// The storefront listing.
    #[default]
    User,
    /// The admin listing used for counter billing.
    Admin,
}

impl CatalogScope {
    fn path(&self) -> &'static str {
        match self {
            CatalogScope::User => "/user/medicines",
            CatalogScope::Admin => "/admin/medicines",
        }
    }
}

/// Storefront catalog filters, sent as query parameters.
///
/// The admin listing has no such parameters; a filter on an admin-scoped
/// client is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Substring of the medicine name.
    pub search: Option<String>,
}

impl CatalogFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.search.is_none()
    }

    fn query(&self) -> Vec<(&'static str, &str)> {
        let mut query = Vec::new();
        if let Some(category) = non_blank(&self.category) {
            query.push(("category", category));
        }
        if let Some(search) = non_blank(&self.search) {
            query.push(("search", search));
        }
        query
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Deserialize)]
struct CategoryList {
    #[serde(default)]
    categories: Vec<Option<String>>,
}

/// Connection settings.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Backend client. Cheap to clone; clones share one connection pool.
///
/// Requests are sent once. A failure is reported, never retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    scope: CatalogScope,
    filter: CatalogFilter,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for ApiClientInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientInner")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                token: config.token.filter(|t| !t.trim().is_empty()),
            }),
            scope: CatalogScope::default(),
            filter: CatalogFilter::default(),
        })
    }

    /// A client reading the given catalog listing.
    pub fn with_scope(&self, scope: CatalogScope) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            scope,
            filter: self.filter.clone(),
        }
    }

    /// A client whose storefront listing is narrowed by `filter`.
    ///
    /// Only use it for browsing. A session validating against a filtered
    /// listing would treat every filtered-out line as gone.
    pub fn with_filter(&self, filter: CatalogFilter) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            scope: self.scope,
            filter,
        }
    }

    pub fn scope(&self) -> CatalogScope {
        self.scope
    }

    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    /// Distinct storefront categories.
    pub async fn fetch_categories(&self) -> Result<Vec<String>, GatewayError> {
        let list: CategoryList = self.get("/user/medicines/categories", &[]).await?;
        let mut categories: Vec<String> = list.categories.into_iter().flatten().collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    fn catalog_query(&self) -> Vec<(&'static str, &str)> {
        match self.scope {
            CatalogScope::User => self.filter.query(),
            CatalogScope::Admin => Vec::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        tracing::debug!(path, "GET");
        let request = self
            .authorize(self.inner.client.get(self.url(path)))
            .query(query);
        let response = request.send().await.map_err(transport_error)?;
        handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: Option<&B>,
        query: &[(&str, &str)],
    ) -> Result<T, GatewayError> {
        tracing::debug!(path, "POST");
        let mut request = self
            .authorize(self.inner.client.post(self.url(path)))
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(transport_error)?;
        handle_response(response).await
    }
}

fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(e.to_string())
    } else {
        GatewayError::Transport(e.to_string())
    }
}

async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    if status.is_success() {
        let bytes = response.bytes().await.map_err(transport_error)?;
        return serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()));
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GatewayError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Api {
        status: status.as_u16(),
        detail: error_detail(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string()),
    })
}

/// Pull the human-readable part out of an error body.
///
/// The backend puts it under `detail`, either as a string or as a list of
/// validation errors carrying a `msg` each.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl CatalogSource for ApiClient {
    async fn fetch_catalog(&self) -> Result<Vec<MedicineRecord>, GatewayError> {
        self.get(self.scope.path(), &self.catalog_query()).await
    }
}

#[async_trait]
impl OrderGateway for ApiClient {
    async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, GatewayError> {
        self.post("/user/orders", Some(request), &[]).await
    }

    async fn pay_order(
        &self,
        order_id: OrderId,
        mode: OrderPaymentMode,
    ) -> Result<PaymentOutcome, GatewayError> {
        let path = format!("/user/orders/{order_id}/payment");
        self.post::<_, ()>(&path, None, &[("payment_mode", mode.as_str())])
            .await
    }

    async fn list_orders(&self) -> Result<Vec<PlacedOrder>, GatewayError> {
        self.get("/user/orders", &[]).await
    }
}

#[async_trait]
impl SaleGateway for ApiClient {
    async fn record_sale(&self, request: &SaleRequest) -> Result<CompletedSale, GatewayError> {
        self.post("/admin/offline-sales", Some(request), &[]).await
    }
}
