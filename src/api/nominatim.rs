use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::config::NominatimConfig;
use crate::domain::SearchResult;
use crate::geojson::{Feature, FeatureCollection};

#[derive(Debug, Default, Deserialize)]
struct Address {
    country: Option<String>,
    state: Option<String>,
    province: Option<String>,
    region: Option<String>,
    county: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PlaceProperties {
    name: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    address: Address,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Turn a Nominatim `format=geojson` response into the first search hit.
///
/// The hit's properties are rewritten to the `name` / `country` /
/// `province` / `region` keys the AOI labels are built from.
fn first_result(collection: FeatureCollection) -> Option<SearchResult> {
    let mut feature = collection
        .features
        .into_iter()
        .find(|f| f.geometry.is_some())?;

    let props: PlaceProperties = feature
        .properties
        .take()
        .and_then(|p| serde_json::from_value(Value::Object(p)).ok())
        .unwrap_or_default();

    let name = non_empty(props.name)
        .or_else(|| {
            props
                .display_name
                .as_deref()
                .and_then(|d| d.split(',').next())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_default();
    let address = props.address;

    let mut properties = Map::new();
    properties.insert("name".into(), Value::String(name));
    let fields = [
        ("country", non_empty(address.country)),
        ("province", non_empty(address.state).or(non_empty(address.province))),
        ("region", non_empty(address.region).or(non_empty(address.county))),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            properties.insert(key.into(), Value::String(value));
        }
    }

    Some(SearchResult::from_feature(Feature {
        properties: Some(properties),
        ..feature
    }))
}

/// Look up a free-text place name.
///
/// Asks for the outline polygon where Nominatim has one; otherwise the hit
/// is a point, which needs a buffer before it can be exported.
pub fn search_place(query: &str, config: &NominatimConfig) -> Result<SearchResult> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(config.url.as_str())
        .query(&[
            ("q", query),
            ("format", "geojson"),
            ("polygon_geojson", "1"),
            ("addressdetails", "1"),
            ("limit", "1"),
        ])
        .send()
        .context("Failed to send request to Nominatim API")?;

    if !response.status().is_success() {
        bail!("Nominatim API returned error status: {}", response.status());
    }

    let collection: FeatureCollection = response
        .json()
        .context("Failed to parse Nominatim GeoJSON response")?;

    log::debug!(
        "Nominatim returned {} feature(s) for {query:?}",
        collection.features.len()
    );

    first_result(collection).ok_or_else(|| anyhow::anyhow!("No place found for {query:?}"))
}
