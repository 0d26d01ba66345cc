use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Search filters for the property listing endpoint. Every field is
/// optional; unset fields are left out of the query entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Substring match on the listing title
    pub title: Option<String>,
    /// Property type id
    pub type_id: Option<String>,
    /// Minimum price
    pub min_price: Option<i64>,
    /// Maximum price
    pub max_price: Option<i64>,
    /// State id
    pub state_id: Option<String>,
    /// City id
    pub city_id: Option<String>,
    /// Minimum number of bedrooms
    pub min_bedrooms: Option<u32>,
    /// Minimum number of bathrooms
    pub min_bathrooms: Option<u32>,
    /// Amenity ids, all of which must be present
    pub amenity_ids: Vec<String>,
    /// Tag ids
    pub tag_ids: Vec<String>,
    /// Furnishing status (wire spelling: Furnished / Unfurnished / Semi)
    pub furnished: Option<String>,
    /// Minimum rating, 0-5
    pub min_rating: Option<f32>,
    /// sale or rent
    pub listing_type: Option<String>,
    /// Available on or after this date
    pub available_from: Option<NaiveDate>,
}

impl SearchFilters {
    /// Build the query pairs the backend expects: camelCase keys, unset and
    /// empty values skipped, multi-valued filters repeated per value.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        push_str(&mut pairs, "title", self.title.as_deref());
        push_str(&mut pairs, "typeId", self.type_id.as_deref());
        push_display(&mut pairs, "minPrice", self.min_price);
        push_display(&mut pairs, "maxPrice", self.max_price);
        push_str(&mut pairs, "stateId", self.state_id.as_deref());
        push_str(&mut pairs, "cityId", self.city_id.as_deref());
        push_display(&mut pairs, "minBedrooms", self.min_bedrooms);
        push_display(&mut pairs, "minBathrooms", self.min_bathrooms);
        for id in &self.amenity_ids {
            push_str(&mut pairs, "amenityIds", Some(id));
        }
        for id in &self.tag_ids {
            push_str(&mut pairs, "tagIds", Some(id));
        }
        push_str(&mut pairs, "furnished", self.furnished.as_deref());
        push_display(&mut pairs, "minRating", self.min_rating);
        push_str(&mut pairs, "listingType", self.listing_type.as_deref());
        push_display(&mut pairs, "availableFrom", self.available_from);

        pairs
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

fn push_str(pairs: &mut Vec<(String, String)>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
}

fn push_display<T: std::fmt::Display>(
    pairs: &mut Vec<(String, String)>,
    key: &str,
    value: Option<T>,
) {
    if let Some(value) = value {
        pairs.push((key.to_string(), value.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters_produce_no_pairs() {
        let filters = SearchFilters::default();
        assert!(filters.query_pairs().is_empty());
        assert!(filters.is_empty());
    }

    #[test]
    fn empty_strings_are_skipped() {
        let filters = SearchFilters {
            title: Some(String::new()),
            furnished: Some(String::new()),
            ..Default::default()
        };
        assert!(filters.query_pairs().is_empty());
    }

    #[test]
    fn multi_valued_keys_repeat_in_order() {
        let filters = SearchFilters {
            amenity_ids: vec!["a1".into(), "a2".into()],
            tag_ids: vec!["t1".into()],
            ..Default::default()
        };
        let pairs = filters.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("amenityIds".to_string(), "a1".to_string()),
                ("amenityIds".to_string(), "a2".to_string()),
                ("tagIds".to_string(), "t1".to_string()),
            ]
        );
    }

    #[test]
    fn full_filter_set_uses_backend_key_spellings() {
        let filters = SearchFilters {
            title: Some("lake".into()),
            type_id: Some("pt1".into()),
            min_price: Some(1000),
            max_price: Some(5000),
            state_id: Some("s1".into()),
            city_id: Some("c1".into()),
            min_bedrooms: Some(2),
            min_bathrooms: Some(1),
            amenity_ids: vec!["a1".into()],
            tag_ids: vec![],
            furnished: Some("Semi".into()),
            min_rating: Some(3.5),
            listing_type: Some("rent".into()),
            available_from: Some(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
        };
        let pairs = filters.query_pairs();
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "title",
                "typeId",
                "minPrice",
                "maxPrice",
                "stateId",
                "cityId",
                "minBedrooms",
                "minBathrooms",
                "amenityIds",
                "furnished",
                "minRating",
                "listingType",
                "availableFrom",
            ]
        );
        assert!(pairs.contains(&("availableFrom".to_string(), "2025-06-01".to_string())));
        assert!(pairs.contains(&("minRating".to_string(), "3.5".to_string())));
    }
}
