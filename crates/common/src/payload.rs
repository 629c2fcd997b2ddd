//! Typed notification payloads.
//!
//! Each notification kind carries its own variant with exactly the fields
//! its template needs, serialized as a `type`-tagged JSON document in the
//! `outbox_tasks.payload` column. Producers construct variants directly,
//! which rules out the missing-required-field class of bugs; genuinely
//! optional fields stay `Option` and degrade at render time.

use serde::{Deserialize, Serialize};

use crate::types::NotificationKind;

/// Payload document for a single notification, tagged by kind.
///
/// Field names serialize in camelCase to match the wire format producers
/// and older rows use (`itemDescription`, `contactUrl`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum NotificationPayload {
    /// A sender asked a traveler to carry an item.
    NewRequest {
        item_description: String,
        item_weight: Option<f64>,
        route: String,
        departure_date: Option<String>,
        sender_first_name: Option<String>,
        request_id: Option<i64>,
        trip_id: Option<i64>,
    },
    /// The traveler accepted; delivered to the sender.
    RequestAccepted {
        item_description: String,
        route: String,
        departure_date: Option<String>,
        traveler_first_name: String,
        traveler_last_name: Option<String>,
        traveler_verified: Option<bool>,
        traveler_rating: Option<f64>,
        contact_url: Option<String>,
        contact_button_text: Option<String>,
        request_id: Option<i64>,
        trip_id: Option<i64>,
    },
    /// The traveler accepted; delivered to the traveler themselves.
    RequestAcceptedTraveler {
        item_description: String,
        item_weight: Option<f64>,
        special_instructions: Option<String>,
        sender_first_name: String,
        sender_last_name: Option<String>,
        contact_url: Option<String>,
        contact_button_text: Option<String>,
        request_id: Option<i64>,
        trip_id: Option<i64>,
    },
    RequestRejected {
        item_description: String,
        route: String,
        message: Option<String>,
        request_id: Option<i64>,
        trip_id: Option<i64>,
    },
    RequestDelivered {
        item_description: String,
        route: String,
        traveler_first_name: String,
        request_id: Option<i64>,
        trip_id: Option<i64>,
    },
    TripCancelled {
        item_description: String,
        route: String,
        departure_date: Option<String>,
        reason: Option<String>,
    },
    /// Fallback for unrecognized or malformed documents.
    Generic {
        title: Option<String>,
        message: Option<String>,
        action_url: Option<String>,
    },
}

impl NotificationPayload {
    /// Decode a stored payload document, degrading instead of failing.
    ///
    /// An unknown `type` tag or a document missing required fields becomes
    /// `Generic`, carrying whatever `title`/`message` strings the raw JSON
    /// holds. A bad payload must never poison the batch it arrived in.
    pub fn from_value(value: &serde_json::Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| {
            let text_field = |key: &str| {
                value
                    .get(key)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            };
            NotificationPayload::Generic {
                title: text_field("title"),
                message: text_field("message"),
                action_url: text_field("actionUrl"),
            }
        })
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationPayload::NewRequest { .. } => NotificationKind::NewRequest,
            NotificationPayload::RequestAccepted { .. } => NotificationKind::RequestAccepted,
            NotificationPayload::RequestAcceptedTraveler { .. } => {
                NotificationKind::RequestAcceptedTraveler
            }
            NotificationPayload::RequestRejected { .. } => NotificationKind::RequestRejected,
            NotificationPayload::RequestDelivered { .. } => NotificationKind::RequestDelivered,
            NotificationPayload::TripCancelled { .. } => NotificationKind::TripCancelled,
            NotificationPayload::Generic { .. } => NotificationKind::Generic,
        }
    }

    /// Title for the in-app history record.
    pub fn title(&self) -> String {
        match self {
            NotificationPayload::NewRequest { .. } => "New item request!".to_string(),
            NotificationPayload::RequestAccepted { .. } => "Your request was accepted!".to_string(),
            NotificationPayload::RequestAcceptedTraveler { .. } => {
                "You accepted a new request!".to_string()
            }
            NotificationPayload::RequestRejected { .. } => "Request not accepted".to_string(),
            NotificationPayload::RequestDelivered { .. } => "Your item was delivered!".to_string(),
            NotificationPayload::TripCancelled { .. } => "Trip cancelled by traveler".to_string(),
            NotificationPayload::Generic { title, .. } => title
                .clone()
                .unwrap_or_else(|| "Notification".to_string()),
        }
    }

    /// One-line summary for the in-app history record.
    pub fn summary(&self) -> String {
        match self {
            NotificationPayload::NewRequest {
                item_description,
                route,
                sender_first_name,
                ..
            } => {
                let sender = sender_first_name.as_deref().unwrap_or("Someone");
                format!("{sender} wants to send: {item_description} ({route})")
            }
            NotificationPayload::RequestAccepted {
                item_description,
                route,
                traveler_first_name,
                ..
            } => format!("{traveler_first_name} will carry your {item_description} ({route})"),
            NotificationPayload::RequestAcceptedTraveler {
                item_description,
                sender_first_name,
                ..
            } => format!("You'll carry {item_description} for {sender_first_name}"),
            NotificationPayload::RequestRejected {
                item_description,
                route,
                ..
            } => format!("Your request for {item_description} was not accepted ({route})"),
            NotificationPayload::RequestDelivered {
                item_description,
                traveler_first_name,
                ..
            } => format!("Your {item_description} was delivered by {traveler_first_name}"),
            NotificationPayload::TripCancelled {
                item_description,
                route,
                ..
            } => format!("Your request for {item_description} was cancelled ({route})"),
            NotificationPayload::Generic { message, .. } => message
                .clone()
                .unwrap_or_else(|| "You have a notification".to_string()),
        }
    }

    /// In-app deep link for the history record, when the kind has one.
    pub fn action_url(&self) -> Option<String> {
        match self {
            NotificationPayload::NewRequest { trip_id, .. } => {
                trip_id.map(|id| format!("/trips/{id}"))
            }
            NotificationPayload::RequestAccepted { request_id, .. }
            | NotificationPayload::RequestAcceptedTraveler { request_id, .. }
            | NotificationPayload::RequestRejected { request_id, .. }
            | NotificationPayload::RequestDelivered { request_id, .. } => {
                request_id.map(|id| format!("/requests/{id}"))
            }
            NotificationPayload::TripCancelled { .. } => None,
            NotificationPayload::Generic { action_url, .. } => action_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        let payload = NotificationPayload::RequestRejected {
            item_description: "books".to_string(),
            route: "Addis Ababa -> Mekelle".to_string(),
            message: None,
            request_id: Some(7),
            trip_id: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "REQUEST_REJECTED");
        assert_eq!(value["itemDescription"], "books");
        assert_eq!(NotificationPayload::from_value(&value), payload);
    }

    #[test]
    fn test_unknown_type_degrades_to_generic() {
        let value = serde_json::json!({
            "type": "SOMETHING_NEW",
            "title": "Heads up",
            "message": "A thing happened"
        });
        let payload = NotificationPayload::from_value(&value);
        assert_eq!(payload.kind(), NotificationKind::Generic);
        assert_eq!(payload.title(), "Heads up");
        assert_eq!(payload.summary(), "A thing happened");
    }

    #[test]
    fn test_malformed_document_degrades_to_generic() {
        // NEW_REQUEST missing its required fields must not fail to decode
        let value = serde_json::json!({ "type": "NEW_REQUEST" });
        let payload = NotificationPayload::from_value(&value);
        assert_eq!(payload.kind(), NotificationKind::Generic);
        assert_eq!(payload.title(), "Notification");
    }

    #[test]
    fn test_action_url_per_kind() {
        let accepted = NotificationPayload::RequestAccepted {
            item_description: "charger".to_string(),
            route: "A -> B".to_string(),
            departure_date: None,
            traveler_first_name: "John".to_string(),
            traveler_last_name: None,
            traveler_verified: None,
            traveler_rating: None,
            contact_url: None,
            contact_button_text: None,
            request_id: Some(42),
            trip_id: Some(9),
        };
        assert_eq!(accepted.action_url(), Some("/requests/42".to_string()));

        let new_request = NotificationPayload::NewRequest {
            item_description: "charger".to_string(),
            item_weight: None,
            route: "A -> B".to_string(),
            departure_date: None,
            sender_first_name: None,
            request_id: Some(42),
            trip_id: Some(9),
        };
        assert_eq!(new_request.action_url(), Some("/trips/9".to_string()));
    }
}
