//! HTTP client for the shop API.

use crate::error::Error;
use crate::types::*;
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

#[cfg(test)]
mod tests;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:5000").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Shop Backend API.
#[derive(Debug, Clone)]
pub struct ShopClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ShopClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Returns a copy of this client that sends `Authorization: Bearer <token>`.
    #[must_use]
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..self.clone()
        }
    }

    /// Bearer token in use, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Resolves an API path against the base URL.
    ///
    /// # Errors
    /// Returns error if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let resp = self.request(Method::GET, "/health")?.send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Products
    // ========================================================================

    /// Lists products matching the query.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ListResponse<Product>, Error> {
        let mut url = self.endpoint("/api/products")?;
        let params = serde_urlencoded::to_string(query).unwrap_or_default();
        if !params.is_empty() {
            url.set_query(Some(&params));
        }
        let resp = self.authorize(self.client.get(url)).send().await?;
        self.handle_response(resp).await
    }

    /// Gets a product by id.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_product(&self, id: i32) -> Result<Product, Error> {
        self.get_data(&format!("/api/products/{}", id)).await
    }

    /// Lists product categories.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_categories(&self) -> Result<Vec<String>, Error> {
        self.get_data("/api/products/categories").await
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Places an order.
    ///
    /// # Errors
    /// Returns error if the request fails or the order is rejected.
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<OrderConfirmation, Error> {
        self.send_data(Method::POST, "/api/orders", request).await
    }

    /// Lists orders, newest first.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_orders(&self) -> Result<ListResponse<Order>, Error> {
        let resp = self.request(Method::GET, "/api/orders")?.send().await?;
        self.handle_response(resp).await
    }

    /// Gets an order by its order number.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_order(&self, order_number: &str) -> Result<Order, Error> {
        self.get_data(&format!("/api/orders/{}", order_number)).await
    }

    /// Updates an order's status.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_order_status(&self, order_id: &str, status: &str) -> Result<Order, Error> {
        let body = UpdateStatusRequest {
            status: status.to_string(),
        };
        self.send_data(Method::PUT, &format!("/api/orders/{}/status", order_id), &body)
            .await
    }

    /// Deletes an order by id.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_order(&self, order_id: &str) -> Result<MessageResponse, Error> {
        let resp = self
            .request(Method::DELETE, &format!("/api/orders/{}", order_id))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Logs in. Use [`ShopClient::with_token`] with the returned token for
    /// authenticated calls.
    ///
    /// # Errors
    /// Returns [`Error::Unauthorized`] for bad credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData, Error> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.send_data(Method::POST, "/api/auth/login", &body).await
    }

    /// Logs out the current token.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn logout(&self) -> Result<MessageResponse, Error> {
        let resp = self.request(Method::POST, "/api/auth/logout")?.send().await?;
        self.handle_response(resp).await
    }

    /// Gets the user behind the current token.
    ///
    /// # Errors
    /// Returns [`Error::Unauthorized`] without a valid token.
    pub async fn me(&self) -> Result<User, Error> {
        self.get_data("/api/auth/me").await
    }

    // ========================================================================
    // Admin
    // ========================================================================

    /// Probes database credentials. Returns the server version.
    ///
    /// # Errors
    /// Returns error if the connection fails.
    pub async fn test_connection(&self, request: &ConnectionTestRequest) -> Result<String, Error> {
        self.send_data(Method::POST, "/api/admin/test-connection", request)
            .await
    }

    /// Gets store-wide counters.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn stats(&self) -> Result<AdminStats, Error> {
        self.get_data("/api/admin/stats").await
    }

    /// Lists users.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_users(&self) -> Result<ListResponse<User>, Error> {
        let resp = self.request(Method::GET, "/api/admin/users")?.send().await?;
        self.handle_response(resp).await
    }

    /// Deletes a user.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_user(&self, id: i32) -> Result<MessageResponse, Error> {
        let resp = self
            .request(Method::DELETE, &format!("/api/admin/users/{}", id))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Creates a product.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, Error> {
        self.send_data(Method::POST, "/api/admin/products", input)
            .await
    }

    /// Updates a product.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_product(&self, id: i32, input: &ProductInput) -> Result<Product, Error> {
        self.send_data(Method::PUT, &format!("/api/admin/products/{}", id), input)
            .await
    }

    /// Deletes a product.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_product(&self, id: i32) -> Result<MessageResponse, Error> {
        let resp = self
            .request(Method::DELETE, &format!("/api/admin/products/{}", id))?
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Seeds the mock catalog and demo users.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn seed(&self) -> Result<MessageResponse, Error> {
        let resp = self.request(Method::POST, "/api/admin/seed")?.send().await?;
        self.handle_response(resp).await
    }

    /// Deletes all data.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn clear(&self) -> Result<MessageResponse, Error> {
        let resp = self.request(Method::POST, "/api/admin/clear")?.send().await?;
        self.handle_response(resp).await
    }

    /// Exports all data.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn export(&self) -> Result<ExportData, Error> {
        self.get_data("/api/admin/export").await
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let url = self.endpoint(path)?;
        Ok(self.authorize(self.client.request(method, url)))
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let resp = self.request(Method::GET, path)?.send().await?;
        let envelope: DataResponse<T> = self.handle_response(resp).await?;
        Ok(envelope.data)
    }

    async fn send_data<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.request(method, path)?.json(body).send().await?;
        let envelope: DataResponse<T> = self.handle_response(resp).await?;
        Ok(envelope.data)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = error_message(&text);
        match status.as_u16() {
            401 => Err(Error::Unauthorized(message)),
            404 => Err(Error::NotFound(message)),
            code => Err(Error::Api {
                status: code,
                message,
            }),
        }
    }
}

/// Extracts `message` from an API error body, falling back to the raw text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string())
}
