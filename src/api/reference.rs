//! Reference data endpoints: cities, states, property types, amenities and
//! tags. Failures here degrade to empty lists with a warning so a flaky
//! reference endpoint never blocks a search.

use anyhow::Result;
use tracing::{debug, warn};

use crate::api::{normalize, ApiClient};
use crate::models::{Amenity, City, PropertyType, State, Tag};

impl ApiClient {
    pub async fn cities(&self) -> Result<Vec<City>> {
        self.reference_list("/listingProperty/city", &["cities"]).await
    }

    /// Cities narrowed to one state, for dependent selection.
    pub async fn cities_by_state(&self, state_id: &str) -> Result<Vec<City>> {
        let request = self.get("/cities").query(&[("stateId", state_id)]);
        let body = match self.send_json(request).await {
            Ok(body) => body,
            Err(err) => {
                warn!("Failed to fetch cities for state {}: {:#}", state_id, err);
                return Ok(Vec::new());
            }
        };
        Ok(normalize::list_or_empty(body, &["cities"]))
    }

    pub async fn states(&self) -> Result<Vec<State>> {
        self.reference_list("/listingProperty/state", &["states"]).await
    }

    pub async fn property_types(&self) -> Result<Vec<PropertyType>> {
        self.reference_list("/listingProperty/propertyType", &["propertyTypes"])
            .await
    }

    pub async fn amenities(&self) -> Result<Vec<Amenity>> {
        self.reference_list("/listingProperty/amenity", &["amenities"]).await
    }

    pub async fn property_tags(&self) -> Result<Vec<Tag>> {
        self.reference_list("/listingProperty/propertyTag", &["propertyTags", "tags"])
            .await
    }

    async fn reference_list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        keys: &[&str],
    ) -> Result<Vec<T>> {
        debug!("Fetching reference data from {}", path);
        let body = match self.send_json(self.get(path)).await {
            Ok(body) => body,
            Err(err) => {
                warn!("Failed to fetch {}: {:#}", path, err);
                return Ok(Vec::new());
            }
        };
        Ok(normalize::list_or_empty(body, keys))
    }
}
