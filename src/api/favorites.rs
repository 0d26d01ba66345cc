//! Favorites: the /favProperty endpoints. The list endpoint is the worst
//! offender for envelope drift, returning `favProperty`, `properties` or a
//! bare array depending on backend version.

use anyhow::Result;
use tracing::debug;

use crate::api::{normalize, ApiClient};
use crate::models::Property;

impl ApiClient {
    /// GET /favProperty/property: the caller's saved listings.
    pub async fn favorites(&self) -> Result<Vec<Property>> {
        let body = self.send_json(self.get("/favProperty/property")).await?;
        normalize::expect_list(body, &["favProperty", "properties"])
    }

    /// POST /favProperty/add/{propertyId}.
    pub async fn add_favorite(&self, property_id: &str) -> Result<()> {
        debug!("Favoriting listing {}", property_id);
        let path = format!("/favProperty/add/{}", property_id);
        self.send_ok(self.post(&path)).await
    }

    /// DELETE /favProperty/remove/{propertyId}.
    pub async fn remove_favorite(&self, property_id: &str) -> Result<()> {
        debug!("Unfavoriting listing {}", property_id);
        let path = format!("/favProperty/remove/{}", property_id);
        self.send_ok(self.delete(&path)).await
    }
}
