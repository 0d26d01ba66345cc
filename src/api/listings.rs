//! Listing CRUD and search against /listingProperty.

use anyhow::Result;
use tracing::{debug, info};

use crate::api::filters::SearchFilters;
use crate::api::{normalize, ApiClient};
use crate::models::{NewProperty, Property};

impl ApiClient {
    /// GET /listingProperty/property with the filter query.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Property>> {
        let pairs = filters.query_pairs();
        debug!("Searching listings with {} filter(s)", pairs.len());

        let request = self.get("/listingProperty/property").query(&pairs);
        let body = self.send_json(request).await?;
        let listings = normalize::expect_list(body, &["properties"])?;

        info!("Search returned {} listing(s)", listings.len());
        Ok(listings)
    }

    /// POST /listingProperty/property; the created listing comes back in one
    /// of several wrappings, all handled by the normalizer.
    pub async fn create_listing(&self, listing: &NewProperty) -> Result<Property> {
        let request = self.post("/listingProperty/property").json(listing);
        let body = self.send_json(request).await?;
        normalize::unwrap_listing(body)
    }

    /// PUT /listingProperty/property/{id}.
    pub async fn update_listing(&self, id: &str, listing: &NewProperty) -> Result<Property> {
        let path = format!("/listingProperty/property/{}", id);
        let request = self.put(&path).json(listing);
        let body = self.send_json(request).await?;
        normalize::unwrap_listing(body)
    }

    /// DELETE /listingProperty/property/{id}.
    pub async fn delete_listing(&self, id: &str) -> Result<()> {
        let path = format!("/listingProperty/property/{}", id);
        self.send_ok(self.delete(&path)).await
    }

    /// GET /listingProperty/my-properties: listings owned by the caller.
    pub async fn my_properties(&self) -> Result<Vec<Property>> {
        let body = self.send_json(self.get("/listingProperty/my-properties")).await?;
        normalize::expect_list(body, &["properties", "myProperties"])
    }
}
