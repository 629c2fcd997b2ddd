//! Per-kind message templates.
//!
//! Pure mapping from a notification payload to a transport-ready message.
//! Optional payload fields degrade by omitting their line or fragment;
//! rendering never fails and is deterministic for a given payload.

use herald_common::payload::NotificationPayload;
use herald_common::types::{InlineButton, Markup, RenderedMessage};

/// Render a payload into the message the transport will deliver.
pub fn render(payload: &NotificationPayload) -> RenderedMessage {
    match payload {
        NotificationPayload::NewRequest {
            item_description,
            item_weight,
            route,
            departure_date,
            sender_first_name,
            ..
        } => {
            let mut text = String::from("📬 *New item request!*\n\n");
            text.push_str(&format!("📦 {item_description}\n"));
            if let Some(weight) = item_weight {
                text.push_str(&format!("⚖️ {weight} kg\n"));
            }
            text.push_str(&format!("✈️ {route}\n"));
            if let Some(date) = departure_date {
                text.push_str(&format!("📅 {date}\n"));
            }
            text.push('\n');
            if let Some(sender) = sender_first_name {
                text.push_str(&format!("👤 From: {sender}\n\n"));
            }
            text.push_str("_Open the app to accept or decline._");

            markdown(text, vec![])
        }

        NotificationPayload::RequestAccepted {
            item_description,
            route,
            departure_date,
            traveler_first_name,
            traveler_last_name,
            traveler_verified,
            traveler_rating,
            contact_url,
            contact_button_text,
            ..
        } => {
            let mut text = String::from("✅ *Your request was accepted!*\n\n");
            text.push_str(&format!("📦 {item_description}\n"));
            text.push_str(&format!("✈️ {route}\n"));
            if let Some(date) = departure_date {
                text.push_str(&format!("📅 {date}\n"));
            }
            text.push('\n');

            text.push_str(&format!("🧳 *Traveler:* {traveler_first_name}"));
            if let Some(last) = traveler_last_name
                && let Some(initial) = last.chars().next()
            {
                text.push_str(&format!(" {initial}."));
            }
            if *traveler_verified == Some(true) {
                text.push_str(" ✓");
            }
            if let Some(rating) = traveler_rating {
                text.push_str(&format!(" ({rating:.1}⭐)"));
            }
            text.push_str("\n\n");

            text.push_str("_Tap below to coordinate pickup details:_");

            markdown(text, contact_button(contact_url, contact_button_text))
        }

        NotificationPayload::RequestAcceptedTraveler {
            item_description,
            item_weight,
            special_instructions,
            sender_first_name,
            sender_last_name,
            contact_url,
            contact_button_text,
            ..
        } => {
            let mut text = String::from("📦 *You accepted a new request!*\n\n");
            text.push_str(&format!("*Item:* {item_description}\n"));
            if let Some(weight) = item_weight {
                text.push_str(&format!("*Weight:* {weight} kg\n"));
            }
            if let Some(instructions) = special_instructions
                && !instructions.trim().is_empty()
            {
                text.push_str(&format!("*Instructions:* {instructions}\n"));
            }
            text.push('\n');

            text.push_str(&format!("👤 *Sender:* {sender_first_name}"));
            if let Some(last) = sender_last_name
                && let Some(initial) = last.chars().next()
            {
                text.push_str(&format!(" {initial}."));
            }
            text.push_str("\n\n");

            text.push_str("_Tap below to coordinate with sender:_");

            markdown(text, contact_button(contact_url, contact_button_text))
        }

        NotificationPayload::RequestRejected {
            item_description,
            route,
            message,
            ..
        } => {
            let mut text = String::from("❌ *Request not accepted*\n\n");
            text.push_str(&format!("📦 {item_description}\n"));
            text.push_str(&format!("✈️ {route}\n\n"));
            text.push_str(message.as_deref().unwrap_or(
                "The traveler was unable to accept your request. You can search for other travelers on this route.",
            ));

            markdown(text, vec![])
        }

        NotificationPayload::RequestDelivered {
            item_description,
            route,
            traveler_first_name,
            ..
        } => {
            let mut text = String::from("🎉 *Your item was delivered!*\n\n");
            text.push_str(&format!("📦 {item_description}\n"));
            text.push_str(&format!("✈️ {route}\n\n"));
            text.push_str(&format!(
                "Thanks to *{traveler_first_name}* for carrying your item!\n\n"
            ));
            text.push_str("_How was your experience? Leave a review in the app._");

            markdown(text, vec![])
        }

        NotificationPayload::TripCancelled {
            item_description,
            route,
            departure_date,
            reason,
        } => {
            let mut text = String::from("❌ *Trip cancelled by traveler*\n\n");
            text.push_str(&format!("📦 {item_description}\n"));
            text.push_str(&format!("✈️ {route}\n"));
            if let Some(date) = departure_date {
                text.push_str(&format!("📅 {date}\n"));
            }
            text.push('\n');
            if let Some(reason) = reason
                && !reason.trim().is_empty()
                && reason != "No reason provided"
            {
                text.push_str(&format!("*Reason:* {reason}\n\n"));
            }
            text.push_str(
                "_Your request has been automatically cancelled. You can search for other travelers going to your destination._",
            );

            markdown(text, vec![])
        }

        NotificationPayload::Generic { title, .. } => RenderedMessage {
            text: title
                .clone()
                .unwrap_or_else(|| "You have a new notification".to_string()),
            markup: Markup::Plain,
            buttons: vec![],
        },
    }
}

fn markdown(text: String, buttons: Vec<InlineButton>) -> RenderedMessage {
    RenderedMessage {
        text,
        markup: Markup::Markdown,
        buttons,
    }
}

/// The single call-to-action button, present only when the payload carries
/// both the url and the label.
fn contact_button(
    contact_url: &Option<String>,
    contact_button_text: &Option<String>,
) -> Vec<InlineButton> {
    match (contact_url, contact_button_text) {
        (Some(url), Some(label)) => vec![InlineButton {
            label: format!("💬 {label}"),
            url: url.clone(),
        }],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted_payload() -> NotificationPayload {
        NotificationPayload::RequestAccepted {
            item_description: "laptop charger".to_string(),
            route: "Addis Ababa -> Dire Dawa".to_string(),
            departure_date: Some("2025-07-01".to_string()),
            traveler_first_name: "John".to_string(),
            traveler_last_name: Some("Smith".to_string()),
            traveler_verified: Some(true),
            traveler_rating: Some(4.75),
            contact_url: Some("https://t.me/traveler1".to_string()),
            contact_button_text: Some("Message John".to_string()),
            request_id: Some(1),
            trip_id: Some(2),
        }
    }

    #[test]
    fn test_request_accepted_full_payload() {
        let message = render(&accepted_payload());
        assert!(message.text.contains("laptop charger"));
        assert!(message.text.contains("Addis Ababa -> Dire Dawa"));
        assert!(message.text.contains("John S."));
        assert!(message.text.contains("✓"));
        assert!(message.text.contains("(4.8⭐)"));
        assert_eq!(message.markup, Markup::Markdown);
        assert_eq!(
            message.buttons,
            vec![InlineButton {
                label: "💬 Message John".to_string(),
                url: "https://t.me/traveler1".to_string(),
            }]
        );
    }

    #[test]
    fn test_contact_button_requires_both_fields() {
        let mut raw = serde_json::to_value(accepted_payload()).unwrap();
        raw.as_object_mut().unwrap().remove("contactButtonText");
        let message = render(&NotificationPayload::from_value(&raw));
        assert!(message.buttons.is_empty());
    }

    #[test]
    fn test_new_request_missing_weight_omits_line() {
        let payload = NotificationPayload::NewRequest {
            item_description: "documents".to_string(),
            item_weight: None,
            route: "Addis Ababa -> Bahir Dar".to_string(),
            departure_date: Some("2025-07-10".to_string()),
            sender_first_name: Some("Sara".to_string()),
            request_id: None,
            trip_id: None,
        };
        let message = render(&payload);
        assert!(!message.text.contains("⚖️"));
        assert!(!message.text.contains("kg"));
        assert!(message.text.contains("documents"));
    }

    #[test]
    fn test_new_request_with_weight() {
        let payload = NotificationPayload::NewRequest {
            item_description: "documents".to_string(),
            item_weight: Some(2.5),
            route: "Addis Ababa -> Bahir Dar".to_string(),
            departure_date: None,
            sender_first_name: None,
            request_id: None,
            trip_id: None,
        };
        let message = render(&payload);
        assert!(message.text.contains("⚖️ 2.5 kg"));
    }

    #[test]
    fn test_trip_cancelled_placeholder_reason_omitted() {
        let payload = NotificationPayload::TripCancelled {
            item_description: "shoes".to_string(),
            route: "Addis Ababa -> Hawassa".to_string(),
            departure_date: None,
            reason: Some("No reason provided".to_string()),
        };
        let message = render(&payload);
        assert!(!message.text.contains("*Reason:*"));

        let payload = NotificationPayload::TripCancelled {
            item_description: "shoes".to_string(),
            route: "Addis Ababa -> Hawassa".to_string(),
            departure_date: None,
            reason: Some("Flight moved".to_string()),
        };
        let message = render(&payload);
        assert!(message.text.contains("*Reason:* Flight moved"));
    }

    #[test]
    fn test_generic_uses_title_or_default() {
        let message = render(&NotificationPayload::Generic {
            title: Some("Heads up".to_string()),
            message: None,
            action_url: None,
        });
        assert_eq!(message.text, "Heads up");
        assert_eq!(message.markup, Markup::Plain);
        assert!(message.buttons.is_empty());

        let message = render(&NotificationPayload::Generic {
            title: None,
            message: None,
            action_url: None,
        });
        assert_eq!(message.text, "You have a new notification");
    }

    #[test]
    fn test_render_is_deterministic() {
        let payload = accepted_payload();
        assert_eq!(render(&payload), render(&payload));
    }

    #[test]
    fn test_unrecognized_type_falls_back_to_generic() {
        let raw = serde_json::json!({
            "type": "PAYMENT_RECEIVED",
            "title": "Payment received"
        });
        let payload = NotificationPayload::from_value(&raw);
        let message = render(&payload);
        assert_eq!(message.text, "Payment received");
    }
}
