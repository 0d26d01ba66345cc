//! Response-shape normalization. The backend is not consistent about its
//! envelopes: lists arrive under a resource-specific key (`cities`,
//! `properties`, `favProperty`, ...) or as a bare array, and a freshly
//! created listing may come back bare or wrapped in `property` or `data`.
//! Every response in the data-access layer funnels through here.

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::models::{Property, Recommendation};

/// Find the array in `body`: the first of `keys` that holds one, or the
/// body itself when it is already a bare array.
fn find_array(body: &Value, keys: &[&str]) -> Option<Vec<Value>> {
    for key in keys {
        if let Some(Value::Array(items)) = body.get(key) {
            return Some(items.clone());
        }
    }
    match body {
        Value::Array(items) => Some(items.clone()),
        _ => None,
    }
}

fn shape_of(body: &Value) -> String {
    match body {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            format!("object with keys [{}]", keys.join(", "))
        }
        other => format!("{:?}", other).chars().take(80).collect(),
    }
}

/// Strict list extraction: errors when no array can be found under any of
/// the accepted keys, naming the shape that actually arrived.
pub fn expect_list<T: DeserializeOwned>(body: Value, keys: &[&str]) -> Result<Vec<T>> {
    let Some(items) = find_array(&body, keys) else {
        bail!(
            "Expected a list (under one of [{}] or bare), got {}",
            keys.join(", "),
            shape_of(&body)
        );
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(Into::into))
        .collect()
}

/// Lenient list extraction for reference data: an unexpected shape or an
/// undecodable element degrades to an empty or shorter list with a warning,
/// so reference lookups stay best-effort.
pub fn list_or_empty<T: DeserializeOwned>(body: Value, keys: &[&str]) -> Vec<T> {
    let Some(items) = find_array(&body, keys) else {
        warn!(
            "Reference data did not contain a list under [{}]; treating as empty",
            keys.join(", ")
        );
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Skipping malformed reference record: {}", err);
                None
            }
        })
        .collect()
}

/// Unwrap a created or updated listing, wherever the backend put it.
pub fn unwrap_listing(body: Value) -> Result<Property> {
    for key in ["property", "data"] {
        if let Some(inner) = body.get(key) {
            if inner.is_object() {
                return serde_json::from_value(inner.clone())
                    .map_err(|err| anyhow::anyhow!("Listing under '{}' is malformed: {}", key, err));
            }
        }
    }

    let shape = shape_of(&body);
    serde_json::from_value(body)
        .map_err(|err| anyhow::anyhow!("Could not read listing from {}: {}", shape, err))
}

/// Flatten raw recommendation records into display listings, dropping
/// records whose nested property is missing.
pub fn flatten_recommendations(records: Vec<Recommendation>) -> Vec<Property> {
    records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match record.into_listing() {
                Some(listing) => Some(listing),
                None => {
                    warn!("Skipping recommendation {} with no nested property", id);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::City;
    use serde_json::json;

    #[test]
    fn expect_list_reads_enveloped_arrays() {
        let body = json!({ "cities": [ { "_id": "c1", "city": "Pune" } ] });
        let cities: Vec<City> = expect_list(body, &["cities"]).unwrap();
        assert_eq!(cities[0].city, "Pune");
    }

    #[test]
    fn expect_list_reads_bare_arrays() {
        let body = json!([ { "_id": "c1", "city": "Pune" } ]);
        let cities: Vec<City> = expect_list(body, &["cities"]).unwrap();
        assert_eq!(cities.len(), 1);
    }

    #[test]
    fn expect_list_tries_alias_keys_in_order() {
        let body = json!({ "favProperty": [ { "_id": "p1", "title": "T", "price": 1 } ] });
        let listings: Vec<Property> = expect_list(body, &["favProperty", "properties"]).unwrap();
        assert_eq!(listings[0].id, "p1");

        let body = json!({ "properties": [ { "_id": "p2", "title": "T", "price": 1 } ] });
        let listings: Vec<Property> = expect_list(body, &["favProperty", "properties"]).unwrap();
        assert_eq!(listings[0].id, "p2");
    }

    #[test]
    fn expect_list_names_the_offending_shape() {
        let body = json!({ "message": "nope" });
        let err = expect_list::<City>(body, &["cities"]).unwrap_err();
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn list_or_empty_degrades_instead_of_failing() {
        let body = json!({ "unrelated": true });
        let cities: Vec<City> = list_or_empty(body, &["cities"]);
        assert!(cities.is_empty());
    }

    #[test]
    fn list_or_empty_skips_broken_elements() {
        let body = json!({ "cities": [
            { "_id": "c1", "city": "Pune" },
            { "city_missing_id": true }
        ] });
        let cities: Vec<City> = list_or_empty(body, &["cities"]);
        assert_eq!(cities.len(), 1);
    }

    #[test]
    fn unwrap_listing_accepts_all_three_creation_shapes() {
        let bare = json!({ "_id": "p1", "title": "T", "price": 1 });
        let under_property = json!({ "message": "created", "property": bare.clone() });
        let under_data = json!({ "data": bare.clone() });

        assert_eq!(unwrap_listing(bare).unwrap().id, "p1");
        assert_eq!(unwrap_listing(under_property).unwrap().id, "p1");
        assert_eq!(unwrap_listing(under_data).unwrap().id, "p1");
    }

    #[test]
    fn unwrap_listing_rejects_messages_without_a_listing() {
        let body = json!({ "message": "created" });
        assert!(unwrap_listing(body).is_err());
    }

    #[test]
    fn flatten_drops_records_without_property() {
        let records: Vec<Recommendation> = serde_json::from_value(json!([
            {
                "_id": "r1",
                "propertyId": "p1",
                "recommendByUserId": "u1",
                "property": { "_id": "p1", "title": "A", "price": 10 },
                "state": "S", "city": "C", "propertyType": "Flat"
            },
            { "_id": "r2", "propertyId": "p2", "recommendByUserId": "u1" }
        ]))
        .unwrap();

        let listings = flatten_recommendations(records);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "p1");
    }
}
