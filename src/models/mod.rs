use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// City reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    #[serde(rename = "_id")]
    pub id: String,
    pub city: String,
}

/// State reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    #[serde(rename = "_id")]
    pub id: String,
    pub state: String,
}

/// Property type reference record (Apartment, Villa, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyType {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type")]
    pub name: String,
}

/// Amenity reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amenity {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Tag reference record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
}

/// Furnishing status, with the backend's exact wire spellings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Furnished {
    Furnished,
    Unfurnished,
    Semi,
}

impl FromStr for Furnished {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "furnished" => Ok(Self::Furnished),
            "unfurnished" => Ok(Self::Unfurnished),
            "semi" => Ok(Self::Semi),
            _ => anyhow::bail!(
                "invalid furnishing '{}' (expected Furnished, Unfurnished or Semi)",
                s
            ),
        }
    }
}

impl fmt::Display for Furnished {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Furnished => write!(f, "Furnished"),
            Self::Unfurnished => write!(f, "Unfurnished"),
            Self::Semi => write!(f, "Semi"),
        }
    }
}

/// Who listed the property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListedBy {
    Builder,
    Owner,
    Agent,
}

impl FromStr for ListedBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "builder" => Ok(Self::Builder),
            "owner" => Ok(Self::Owner),
            "agent" => Ok(Self::Agent),
            _ => anyhow::bail!("invalid lister '{}' (expected Builder, Owner or Agent)", s),
        }
    }
}

/// Sale or rental listing; the backend spells these lowercase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sale,
    Rent,
}

impl FromStr for ListingType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sale" => Ok(Self::Sale),
            "rent" => Ok(Self::Rent),
            _ => anyhow::bail!("invalid listing type '{}' (expected sale or rent)", s),
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sale => write!(f, "sale"),
            Self::Rent => write!(f, "rent"),
        }
    }
}

/// A property listing as the backend returns it, with reference fields
/// already resolved to display names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub property_type: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub area_sq_ft: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub furnished: Option<String>,
    /// Wire format varies (ISO datetime or plain date); kept verbatim
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub listed_by: Option<String>,
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_theme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Payload for creating or replacing a listing; reference fields are ids here
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub title: String,
    pub type_id: String,
    pub price: f64,
    pub state_id: String,
    pub city_id: String,
    pub area_sq_ft: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amenity_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<Vec<String>>,
    pub furnished: Furnished,
    pub available_from: NaiveDate,
    pub listed_by: ListedBy,
    pub listing_type: ListingType,
}

/// The nested listing inside a recommendation record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedListing {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub price: f64,
    #[serde(default)]
    pub area_sq_ft: f64,
    #[serde(default)]
    pub bedrooms: u32,
    #[serde(default)]
    pub bathrooms: u32,
    #[serde(default)]
    pub furnished: Option<String>,
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub listed_by: Option<String>,
    #[serde(default)]
    pub listing_type: Option<ListingType>,
    #[serde(default)]
    pub color_theme: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub is_verified: Option<bool>,
}

/// The user who sent a recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedBy {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Raw recommendation record: the listing is nested under `property` while
/// the resolved reference names sit beside it as siblings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "_id")]
    pub id: String,
    pub property_id: String,
    #[serde(default)]
    pub recommend_to_user_email: String,
    #[serde(default)]
    pub recommend_by_user_id: String,
    #[serde(default)]
    pub property: Option<RecommendedListing>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub recommended_by: Option<RecommendedBy>,
}

impl Recommendation {
    /// Flatten the record into a display listing. Returns None when the
    /// nested property is missing, which some backend records are.
    pub fn into_listing(self) -> Option<Property> {
        let listing = self.property?;
        Some(Property {
            id: listing.id,
            title: listing.title,
            property_type: Some(self.property_type),
            price: listing.price,
            state: self.state,
            city: self.city,
            area_sq_ft: listing.area_sq_ft,
            bedrooms: listing.bedrooms,
            bathrooms: listing.bathrooms,
            amenities: self.amenities,
            tags: self.tags,
            furnished: listing.furnished,
            available_from: listing.available_from,
            listed_by: listing.listed_by,
            listing_type: listing.listing_type,
            color_theme: listing.color_theme,
            rating: listing.rating,
            is_verified: listing.is_verified,
            created_by: Some(self.recommend_by_user_id),
        })
    }
}

/// Registration payload for /auth/register
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Claims recovered from the bearer token payload. Backends disagree on the
/// id key, so all known spellings are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    #[serde(rename = "_id", alias = "id", alias = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_deserializes_from_backend_shape() {
        let body = json!({
            "_id": "663a",
            "title": "Sunny 2BHK",
            "type": "Apartment",
            "price": 1250000,
            "state": "Karnataka",
            "city": "Bengaluru",
            "areaSqFt": 980,
            "bedrooms": 2,
            "bathrooms": 2,
            "amenities": ["Lift", "Parking"],
            "tags": ["near-metro"],
            "furnished": "Semi",
            "availableFrom": "2025-07-01T00:00:00.000Z",
            "listedBy": "Owner",
            "listingType": "rent",
            "rating": 4.5,
            "createdBy": "u1"
        });
        let property: Property = serde_json::from_value(body).unwrap();
        assert_eq!(property.id, "663a");
        assert_eq!(property.property_type.as_deref(), Some("Apartment"));
        assert_eq!(property.listing_type, Some(ListingType::Rent));
        assert_eq!(property.amenities.len(), 2);
    }

    #[test]
    fn property_tolerates_sparse_records() {
        let body = json!({ "_id": "x", "title": "Bare", "price": 100.0 });
        let property: Property = serde_json::from_value(body).unwrap();
        assert!(property.amenities.is_empty());
        assert!(property.listing_type.is_none());
    }

    #[test]
    fn new_property_serializes_camel_case_and_skips_unset_ids() {
        let payload = NewProperty {
            title: "T".into(),
            type_id: "t1".into(),
            price: 5000.0,
            state_id: "s1".into(),
            city_id: "c1".into(),
            area_sq_ft: 420.0,
            bedrooms: 1,
            bathrooms: 1,
            amenity_ids: None,
            tag_ids: Some(vec!["g1".into()]),
            furnished: Furnished::Unfurnished,
            available_from: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            listed_by: ListedBy::Agent,
            listing_type: ListingType::Rent,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["typeId"], "t1");
        assert_eq!(value["availableFrom"], "2025-08-01");
        assert_eq!(value["furnished"], "Unfurnished");
        assert_eq!(value["listingType"], "rent");
        assert!(value.get("amenityIds").is_none());
        assert_eq!(value["tagIds"][0], "g1");
    }

    #[test]
    fn enum_parsing_is_case_insensitive() {
        assert_eq!("semi".parse::<Furnished>().unwrap(), Furnished::Semi);
        assert_eq!("OWNER".parse::<ListedBy>().unwrap(), ListedBy::Owner);
        assert_eq!("Sale".parse::<ListingType>().unwrap(), ListingType::Sale);
        assert!("lease".parse::<ListingType>().is_err());
    }

    #[test]
    fn recommendation_flattens_nested_property_with_siblings() {
        let body = json!({
            "_id": "r1",
            "propertyId": "p1",
            "recommendToUserEmail": "to@example.com",
            "recommendByUserId": "u9",
            "property": {
                "_id": "p1",
                "title": "Lake View Villa",
                "price": 9000000,
                "areaSqFt": 2400,
                "bedrooms": 4,
                "bathrooms": 3,
                "furnished": "Furnished",
                "availableFrom": "2025-09-15",
                "listedBy": "Builder",
                "listingType": "sale"
            },
            "amenities": ["Pool"],
            "tags": ["luxury"],
            "state": "Goa",
            "city": "Panaji",
            "propertyType": "Villa",
            "recommendedBy": { "firstName": "Ana", "lastName": "K", "email": "ana@example.com" }
        });
        let record: Recommendation = serde_json::from_value(body).unwrap();
        let listing = record.into_listing().unwrap();
        assert_eq!(listing.id, "p1");
        assert_eq!(listing.property_type.as_deref(), Some("Villa"));
        assert_eq!(listing.state, "Goa");
        assert_eq!(listing.amenities, vec!["Pool".to_string()]);
        assert_eq!(listing.created_by.as_deref(), Some("u9"));
    }

    #[test]
    fn recommendation_without_nested_property_flattens_to_none() {
        let body = json!({
            "_id": "r2",
            "propertyId": "p-gone",
            "recommendByUserId": "u9",
            "state": "Goa",
            "city": "Panaji",
            "propertyType": "Villa"
        });
        let record: Recommendation = serde_json::from_value(body).unwrap();
        assert!(record.into_listing().is_none());
    }

    #[test]
    fn claims_accept_alternate_id_keys() {
        let a: Claims = serde_json::from_value(json!({ "_id": "u1" })).unwrap();
        let b: Claims = serde_json::from_value(json!({ "id": "u2" })).unwrap();
        let c: Claims = serde_json::from_value(json!({ "userId": "u3", "email": "e" })).unwrap();
        assert_eq!(a.user_id.as_deref(), Some("u1"));
        assert_eq!(b.user_id.as_deref(), Some("u2"));
        assert_eq!(c.user_id.as_deref(), Some("u3"));
    }
}
