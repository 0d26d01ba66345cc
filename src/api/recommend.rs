//! Recommendations: /recommendProperty. Incoming records carry the listing
//! nested under `property` with resolved names as siblings; they are
//! flattened into plain listings before anything renders them.

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info};

use crate::api::{normalize, ApiClient};
use crate::models::{Property, Recommendation};

impl ApiClient {
    /// POST /recommendProperty/: recommend a listing to another user by email.
    pub async fn recommend(&self, property_id: &str, email: &str) -> Result<()> {
        debug!("Recommending listing {} to {}", property_id, email);
        let request = self.post("/recommendProperty/").json(&json!({
            "propertyId": property_id,
            "recommendToUserEmail": email,
        }));
        self.send_ok(request).await
    }

    /// GET /recommendProperty/: listings other users recommended to the
    /// caller, flattened for display.
    pub async fn recommendations(&self) -> Result<Vec<Property>> {
        let body = self.send_json(self.get("/recommendProperty/")).await?;
        let records: Vec<Recommendation> =
            normalize::expect_list(body, &["recommendations", "recommendProperty"])?;

        let total = records.len();
        let listings = normalize::flatten_recommendations(records);
        if listings.len() < total {
            info!(
                "Dropped {} recommendation(s) with no usable listing",
                total - listings.len()
            );
        }
        Ok(listings)
    }
}
