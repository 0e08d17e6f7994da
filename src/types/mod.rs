use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Place Types =============

/// A departure location chosen in the city picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub city: String,
    pub country: String,
    /// Airport IATA code
    pub code: String,
    pub flag: String,
}

impl Location {
    pub fn new(id: &str, city: &str, country: &str, code: &str, flag: &str) -> Self {
        Self {
            id: id.to_string(),
            city: city.to_string(),
            country: country.to_string(),
            code: code.to_string(),
            flag: flag.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    Destination,
    Hsr,
    Flight,
    Drive,
    Hotel,
    Museum,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialNote {
    pub id: String,
    pub author: String,
    pub likes: u32,
    pub content: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DestinationKind,
    pub name: String,
    pub location: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: f32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub travel_time: String,
    #[serde(default)]
    pub suggested_transport: String,
    #[serde(default)]
    pub suggested_duration: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ai_reason: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub notes: Vec<SocialNote>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

impl Destination {
    /// Case-insensitive match of `query` against the name or any tag.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        self.name.to_lowercase().contains(&query)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&query))
    }
}

// ============= Itinerary Types =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryItem {
    pub time: String,
    pub activity: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_personalized_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
}

/// A generated one-day plan for a single destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(default)]
    pub destination_id: String,
    pub date: String,
    pub total_budget: String,
    pub transport: String,
    pub items: Vec<ItineraryItem>,
    pub highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_comment: Option<String>,
}

/// Row of the `saved_itineraries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItinerary {
    pub id: String,
    pub user_id: String,
    pub destination_id: String,
    pub destination_name: String,
    pub data: Itinerary,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `saved_itineraries`; id and created_at are generated by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSavedItinerary {
    pub user_id: String,
    pub destination_id: String,
    pub destination_name: String,
    pub data: Itinerary,
}

// ============= Conversation Types =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

// ============= Session Types =============

/// The signed-in user as reported by the hosted auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

// ============= Navigation Types =============

/// The four top-level views, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewKind {
    Welcome,
    Map,
    Detail,
    UserCenter,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViewKind::Welcome => "welcome",
            ViewKind::Map => "map",
            ViewKind::Detail => "detail",
            ViewKind::UserCenter => "user-center",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTab {
    #[default]
    Explore,
    Trip,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Network or HTTP failure talking to a hosted service
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Structured AI output did not match the expected shape
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Login required")]
    LoginRequired,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid transition: cannot {action} from {from}")]
    InvalidTransition { from: ViewKind, action: &'static str },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Only rate-limit failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limit_is_retryable() {
        assert!(AppError::RateLimited("429".into()).is_retryable());
        assert!(!AppError::Transport("reset".into()).is_retryable());
        assert!(!AppError::SchemaMismatch("items".into()).is_retryable());
        assert!(!AppError::LoginRequired.is_retryable());
    }

    #[test]
    fn test_itinerary_wire_shape_is_camel_case() {
        let json = serde_json::json!({
            "date": "2026-05-01",
            "totalBudget": "¥300",
            "transport": "Metro",
            "highlights": ["Echo Wall"],
            "items": [{
                "time": "09:00",
                "activity": "Hall of Prayer",
                "description": "Morning visit",
                "lat": 39.8822,
                "lng": 116.4066,
                "transportInfo": "Line 5"
            }]
        });
        let itinerary: Itinerary = serde_json::from_value(json).unwrap();
        assert_eq!(itinerary.total_budget, "¥300");
        assert_eq!(itinerary.destination_id, "");
        assert_eq!(itinerary.items[0].transport_info.as_deref(), Some("Line 5"));
        assert!(itinerary.ai_comment.is_none());
    }

    #[test]
    fn test_destination_matches_name_and_tags() {
        let dest = Destination {
            id: "x".into(),
            kind: DestinationKind::Destination,
            name: "Temple of Heaven".into(),
            location: "Beijing".into(),
            lat: 39.88,
            lng: 116.41,
            rating: 4.8,
            tags: vec!["Temple".into(), "History".into()],
            travel_time: String::new(),
            suggested_transport: String::new(),
            suggested_duration: String::new(),
            budget: String::new(),
            description: String::new(),
            ai_reason: String::new(),
            image_url: String::new(),
            notes: vec![],
            price: None,
            distance: None,
        };
        assert!(dest.matches("temple"));
        assert!(dest.matches("HISTORY"));
        assert!(!dest.matches("beach"));
        assert!(!dest.matches("  "));
    }
}
