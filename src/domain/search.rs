use crate::geojson::Feature;

/// A resolved search/geocode hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub name: String,
    pub country: Option<String>,
    pub province: Option<String>,
    pub region: Option<String>,
    pub feature: Feature,
}

impl SearchResult {
    /// Read the descriptive fields from the feature's properties
    pub fn from_feature(feature: Feature) -> Self {
        let text = |key: &str| feature.property_str(key).map(str::to_string);
        Self {
            name: text("name").unwrap_or_default(),
            country: text("country"),
            province: text("province"),
            region: text("region"),
            feature,
        }
    }

    /// "country, province, region", skipping missing parts
    pub fn description(&self) -> String {
        [&self.country, &self.province, &self.region]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geojson::Geometry;

    fn feature(properties: serde_json::Value) -> Feature {
        let mut feature = Feature::new(Geometry::Point {
            coordinates: vec![0.0, 0.0],
        });
        feature.properties = properties.as_object().cloned();
        feature
    }

    #[test]
    fn test_description_joins_present_parts() {
        let result = SearchResult::from_feature(feature(serde_json::json!({
            "name": "Boulder",
            "country": "United States",
            "province": "Colorado",
            "region": ""
        })));
        assert_eq!(result.name, "Boulder");
        assert_eq!(result.description(), "United States, Colorado");
    }

    #[test]
    fn test_description_without_country() {
        let result = SearchResult::from_feature(feature(serde_json::json!({
            "name": "Somewhere",
            "region": "North"
        })));
        assert_eq!(result.description(), "North");
    }
}
