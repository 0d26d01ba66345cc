use anyhow::Result;
use async_trait::async_trait;

use crate::api::filters::SearchFilters;
use crate::models::{Amenity, City, NewProperty, Property, PropertyType, State, Tag};

/// The backend surface the command layer talks to. Abstracted behind a trait
/// so commands can run against an in-memory fake in tests.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    async fn cities(&self) -> Result<Vec<City>>;
    async fn cities_by_state(&self, state_id: &str) -> Result<Vec<City>>;
    async fn states(&self) -> Result<Vec<State>>;
    async fn property_types(&self) -> Result<Vec<PropertyType>>;
    async fn amenities(&self) -> Result<Vec<Amenity>>;
    async fn property_tags(&self) -> Result<Vec<Tag>>;

    async fn search(&self, filters: &SearchFilters) -> Result<Vec<Property>>;
    async fn create_listing(&self, listing: &NewProperty) -> Result<Property>;
    async fn update_listing(&self, id: &str, listing: &NewProperty) -> Result<Property>;
    async fn delete_listing(&self, id: &str) -> Result<()>;
    async fn my_properties(&self) -> Result<Vec<Property>>;

    async fn favorites(&self) -> Result<Vec<Property>>;
    async fn add_favorite(&self, property_id: &str) -> Result<()>;
    async fn remove_favorite(&self, property_id: &str) -> Result<()>;

    async fn recommend(&self, property_id: &str, email: &str) -> Result<()>;
    async fn recommendations(&self) -> Result<Vec<Property>>;
}
