//! Tagged, validated model replies
//!
//! Raw completion text is turned into one [`StructuredReply`] variant per
//! expected [`ReplyShape`]. Anything that does not fit the shape is an
//! [`AppError::SchemaMismatch`].

use crate::types::{AppError, Destination, DestinationKind, Itinerary, Result};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyShape {
    Advice,
    Itinerary,
    City,
    Destinations,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructuredReply {
    Advice(String),
    Itinerary(Itinerary),
    City(CityMatch),
    Destinations(DestinationBatch),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CityMatch {
    pub city: String,
    pub country: String,
    /// Airport IATA code
    pub code: String,
    #[serde(default)]
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedDestination {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub suggested_transport: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub budget: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DestinationBatch {
    pub destinations: Vec<SuggestedDestination>,
    /// Short conversational line shown alongside the results
    #[serde(default)]
    pub message: String,
}

impl SuggestedDestination {
    /// Convert into a catalog-shaped destination; `fallback_id` is used when
    /// the model did not supply an id.
    pub fn into_destination(self, fallback_id: String) -> Destination {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or(fallback_id);
        Destination {
            id,
            kind: DestinationKind::Destination,
            name: self.name,
            location: self.location,
            lat: self.lat,
            lng: self.lng,
            rating: self.rating.unwrap_or(4.5).clamp(0.0, 5.0),
            tags: Vec::new(),
            travel_time: String::new(),
            suggested_transport: self.suggested_transport,
            suggested_duration: String::new(),
            budget: self.budget,
            description: self.reason.clone(),
            ai_reason: self.reason,
            image_url: self.image_url,
            notes: Vec::new(),
            price: None,
            distance: Some(self.distance).filter(|d| !d.is_empty()),
        }
    }
}

impl StructuredReply {
    /// Parse and validate `raw` as the given shape.
    pub fn parse(shape: ReplyShape, raw: &str) -> Result<Self> {
        match shape {
            ReplyShape::Advice => {
                let text = raw.trim();
                if text.is_empty() {
                    return Err(AppError::SchemaMismatch("empty advice text".to_string()));
                }
                Ok(StructuredReply::Advice(text.to_string()))
            }
            ReplyShape::Itinerary => {
                let itinerary: Itinerary = decode(raw)?;
                validate_itinerary(&itinerary)?;
                Ok(StructuredReply::Itinerary(itinerary))
            }
            ReplyShape::City => {
                let city: CityMatch = decode(raw)?;
                if city.city.trim().is_empty() || city.country.trim().is_empty() {
                    return Err(AppError::SchemaMismatch(
                        "city lookup is missing city or country".to_string(),
                    ));
                }
                Ok(StructuredReply::City(city))
            }
            ReplyShape::Destinations => {
                let batch: DestinationBatch = decode(raw)?;
                for (idx, dest) in batch.destinations.iter().enumerate() {
                    if dest.name.trim().is_empty() {
                        return Err(AppError::SchemaMismatch(format!(
                            "destination {} has no name",
                            idx
                        )));
                    }
                    check_coordinates(dest.lat, dest.lng, &dest.name)?;
                }
                Ok(StructuredReply::Destinations(batch))
            }
        }
    }

    pub fn shape(&self) -> ReplyShape {
        match self {
            StructuredReply::Advice(_) => ReplyShape::Advice,
            StructuredReply::Itinerary(_) => ReplyShape::Itinerary,
            StructuredReply::City(_) => ReplyShape::City,
            StructuredReply::Destinations(_) => ReplyShape::Destinations,
        }
    }
}

/// Strip a surrounding markdown code fence, if any.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // replies are objects or arrays, so leading letters can only be a language tag
    let body = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn decode<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| AppError::SchemaMismatch(format!("invalid JSON reply: {}", e)))
}

fn check_coordinates(lat: f64, lng: f64, label: &str) -> Result<()> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::SchemaMismatch(format!(
            "coordinates out of range for '{}': ({}, {})",
            label, lat, lng
        )));
    }
    Ok(())
}

fn validate_itinerary(itinerary: &Itinerary) -> Result<()> {
    if itinerary.items.is_empty() {
        return Err(AppError::SchemaMismatch("itinerary has no items".to_string()));
    }
    for item in &itinerary.items {
        if item.time.trim().is_empty() || item.activity.trim().is_empty() {
            return Err(AppError::SchemaMismatch(
                "itinerary item is missing time or activity".to_string(),
            ));
        }
        check_coordinates(item.lat, item.lng, &item.activity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITINERARY: &str = r#"{
        "date": "2026-05-01",
        "totalBudget": "¥300",
        "transport": "Metro",
        "highlights": ["Echo Wall"],
        "items": [{"time": "09:00", "activity": "Hall of Prayer", "description": "Morning", "lat": 39.88, "lng": 116.40}]
    }"#;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("  {}  "), "{}");
        assert_eq!(strip_code_fence("```json{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```[1, 2]```"), "[1, 2]");
    }

    #[test]
    fn test_parse_fenced_itinerary() {
        let raw = format!("```json\n{}\n```", ITINERARY);
        let reply = StructuredReply::parse(ReplyShape::Itinerary, &raw).unwrap();
        assert_eq!(reply.shape(), ReplyShape::Itinerary);
        match reply {
            StructuredReply::Itinerary(it) => assert_eq!(it.items.len(), 1),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_parse_one_line_fence() {
        let raw = format!("```json{}```", ITINERARY);
        assert!(StructuredReply::parse(ReplyShape::Itinerary, &raw).is_ok());
    }

    #[test]
    fn test_empty_items_is_mismatch() {
        let raw = r#"{"date":"d","totalBudget":"b","transport":"t","highlights":[],"items":[]}"#;
        let err = StructuredReply::parse(ReplyShape::Itinerary, raw).unwrap_err();
        assert!(matches!(err, AppError::SchemaMismatch(_)));
    }

    #[test]
    fn test_out_of_range_coordinates_is_mismatch() {
        let raw = ITINERARY.replace("39.88", "139.88");
        let err = StructuredReply::parse(ReplyShape::Itinerary, &raw).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_prose_instead_of_json_is_mismatch() {
        let err = StructuredReply::parse(ReplyShape::City, "Tokyo is in Japan.").unwrap_err();
        assert!(matches!(err, AppError::SchemaMismatch(_)));
    }

    #[test]
    fn test_city_requires_country() {
        let raw = r#"{"city":"Tokyo","country":"","code":"HND","flag":"🇯🇵"}"#;
        assert!(StructuredReply::parse(ReplyShape::City, raw).is_err());
    }

    #[test]
    fn test_blank_advice_is_mismatch() {
        assert!(StructuredReply::parse(ReplyShape::Advice, "  \n").is_err());
    }

    #[test]
    fn test_suggested_destination_fallback_id() {
        let raw = r#"{"destinations":[{"name":"Gubei Water Town","lat":40.65,"lng":117.25,"reason":"Night views","distance":"130km"}],"message":"Here you go"}"#;
        let reply = StructuredReply::parse(ReplyShape::Destinations, raw).unwrap();
        let StructuredReply::Destinations(batch) = reply else {
            panic!("expected destinations");
        };
        let dest = batch.destinations[0].clone().into_destination("ai-dest-1-0".to_string());
        assert_eq!(dest.id, "ai-dest-1-0");
        assert_eq!(dest.ai_reason, "Night views");
        assert_eq!(dest.distance.as_deref(), Some("130km"));
    }
}
