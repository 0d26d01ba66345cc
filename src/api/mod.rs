pub mod favorites;
pub mod filters;
pub mod listings;
pub mod normalize;
pub mod recommend;
pub mod reference;
pub mod traits;

pub use filters::SearchFilters;
pub use traits::PropertyApi;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use crate::config::Config;
use crate::models::{
    Amenity, City, NewProperty, Property, PropertyType, State, Tag,
};

/// Client for the listing backend. Holds the HTTP client, the resolved base
/// URL and the bearer token of the logged-in user, if any.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.authed(self.http.get(self.url(path)))
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.authed(self.http.post(self.url(path)))
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.authed(self.http.put(self.url(path)))
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.authed(self.http.delete(self.url(path)))
    }

    /// Send a prepared request and parse the body as JSON, turning non-2xx
    /// responses into backend errors.
    pub(crate) async fn send_json(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.context("Failed to reach backend")?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        response.json().await.context("Failed to read response body")
    }

    /// Send a prepared request where only success matters (add/remove/delete).
    pub(crate) async fn send_ok(&self, request: RequestBuilder) -> Result<()> {
        let response = request.send().await.context("Failed to reach backend")?;
        if !response.status().is_success() {
            return Err(backend_error(response).await);
        }
        Ok(())
    }
}

/// Turn an error response into an error carrying the backend's own words:
/// a `message` field when the payload has one, the raw body otherwise.
pub(crate) async fn backend_error(response: Response) -> anyhow::Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or(body);

    if message.trim().is_empty() {
        anyhow!("Backend returned {}", status)
    } else {
        anyhow!("{} ({})", message.trim(), status)
    }
}

#[async_trait]
impl PropertyApi for ApiClient {
    async fn cities(&self) -> Result<Vec<City>> {
        ApiClient::cities(self).await
    }

    async fn cities_by_state(&self, state_id: &str) -> Result<Vec<City>> {
        ApiClient::cities_by_state(self, state_id).await
    }

    async fn states(&self) -> Result<Vec<State>> {
        ApiClient::states(self).await
    }

    async fn property_types(&self) -> Result<Vec<PropertyType>> {
        ApiClient::property_types(self).await
    }

    async fn amenities(&self) -> Result<Vec<Amenity>> {
        ApiClient::amenities(self).await
    }

    async fn property_tags(&self) -> Result<Vec<Tag>> {
        ApiClient::property_tags(self).await
    }

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Property>> {
        ApiClient::search(self, filters).await
    }

    async fn create_listing(&self, listing: &NewProperty) -> Result<Property> {
        ApiClient::create_listing(self, listing).await
    }

    async fn update_listing(&self, id: &str, listing: &NewProperty) -> Result<Property> {
        ApiClient::update_listing(self, id, listing).await
    }

    async fn delete_listing(&self, id: &str) -> Result<()> {
        ApiClient::delete_listing(self, id).await
    }

    async fn my_properties(&self) -> Result<Vec<Property>> {
        ApiClient::my_properties(self).await
    }

    async fn favorites(&self) -> Result<Vec<Property>> {
        ApiClient::favorites(self).await
    }

    async fn add_favorite(&self, property_id: &str) -> Result<()> {
        ApiClient::add_favorite(self, property_id).await
    }

    async fn remove_favorite(&self, property_id: &str) -> Result<()> {
        ApiClient::remove_favorite(self, property_id).await
    }

    async fn recommend(&self, property_id: &str, email: &str) -> Result<()> {
        ApiClient::recommend(self, property_id, email).await
    }

    async fn recommendations(&self) -> Result<Vec<Property>> {
        ApiClient::recommendations(self).await
    }
}
