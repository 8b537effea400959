use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub property_id: i64,
    pub location: Location,
    pub sq_feet: u32,
    pub num_beds: u32,
    pub num_baths: u32,
    pub description: String,
}

/// Street address plus coordinates. Coordinates stay strings, as the web
/// client stores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub longitude: String,
    pub latitude: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_legacy_document() {
        let doc = json!({
            "propertyId": 2,
            "location": {
                "address": "435", "street": "Main", "city": "Springfield",
                "state": "California", "longitude": "36.507623", "latitude": "-79.145509"
            },
            "sqFeet": 3200, "numBeds": 5, "numBaths": 3,
            "description": "Nice cottage by lake"
        });

        let property: Property = serde_json::from_value(doc).unwrap();
        assert_eq!(property.property_id, 2);
        assert_eq!(property.location.city, "Springfield");
        assert_eq!(property.sq_feet, 3200);
    }
}
