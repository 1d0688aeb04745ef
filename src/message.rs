//! Messages exchanged with the DevTools panel.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;

/// Whether the selected frame's site belongs to a Related Website Set.
/// The panel sends `true`, `false` or `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RwsMembership {
    Yes,
    No,
    #[default]
    Unknown,
}

impl RwsMembership {
    pub fn label(&self) -> &'static str {
        match self {
            RwsMembership::Yes => "Yes",
            RwsMembership::No => "No",
            RwsMembership::Unknown => "Unknown",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMembership {
    Flag(bool),
    Text(String),
}

impl<'de> Deserialize<'de> for RwsMembership {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match RawMembership::deserialize(deserializer)? {
            RawMembership::Flag(true) => RwsMembership::Yes,
            RawMembership::Flag(false) => RwsMembership::No,
            RawMembership::Text(text) => {
                if !text.eq_ignore_ascii_case("unknown") {
                    log::debug!("unrecognised RWS membership {:?}", text);
                }
                RwsMembership::Unknown
            }
        })
    }
}

impl Serialize for RwsMembership {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            RwsMembership::Yes => serializer.serialize_bool(true),
            RwsMembership::No => serializer.serialize_bool(false),
            RwsMembership::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// "Selected frame changed" message driving one popover cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionMessage {
    /// Origin picked in the panel; empty clears the popovers.
    #[serde(rename = "selectedFrame")]
    pub selected_origin: String,
    pub is_inspecting: bool,
    #[serde(rename = "firstPartyCookies")]
    pub first_party_cookie_count: u32,
    #[serde(rename = "thirdPartyCookies")]
    pub third_party_cookie_count: u32,
    #[serde(rename = "blockedCookies")]
    pub blocked_cookie_count: u32,
    pub blocked_reasons: String,
    #[serde(rename = "isOnRWS")]
    pub is_on_rws: RwsMembership,
}

impl SelectionMessage {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn clears_selection(&self) -> bool {
        self.selected_origin.is_empty()
    }
}

/// Sent back to the panel while inspect mode is on and the pointer rests
/// over a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverMessage {
    pub hovered_frame: String,
}

impl HoverMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_panel_message() {
        let msg = SelectionMessage::from_json(
            r#"{
                "selectedFrame": "https://ads.example.com",
                "isInspecting": false,
                "firstPartyCookies": 0,
                "thirdPartyCookies": 3,
                "blockedCookies": 1,
                "blockedReasons": "SameSiteNoneInsecure",
                "isOnRWS": false
            }"#,
        )
        .unwrap();
        assert_eq!(msg.selected_origin, "https://ads.example.com");
        assert_eq!(msg.third_party_cookie_count, 3);
        assert_eq!(msg.blocked_cookie_count, 1);
        assert_eq!(msg.is_on_rws, RwsMembership::No);
        assert!(!msg.clears_selection());
    }

    #[test]
    fn rws_accepts_unknown_and_missing_fields_default() {
        let msg = SelectionMessage::from_json(r#"{"isOnRWS": "unknown"}"#).unwrap();
        assert_eq!(msg.is_on_rws, RwsMembership::Unknown);
        assert!(msg.clears_selection());

        let msg = SelectionMessage::from_json(r#"{"selectedFrame": "x", "isOnRWS": true}"#).unwrap();
        assert_eq!(msg.is_on_rws, RwsMembership::Yes);
    }

    #[test]
    fn unrecognised_rws_text_is_unknown() {
        let msg = SelectionMessage::from_json(r#"{"isOnRWS": "maybe"}"#).unwrap();
        assert_eq!(msg.is_on_rws, RwsMembership::Unknown);
        let msg = SelectionMessage::from_json(r#"{"isOnRWS": true}"#).unwrap();
        assert_eq!(msg.is_on_rws, RwsMembership::Yes);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(SelectionMessage::from_json("{selectedFrame:").is_err());
    }

    #[test]
    fn hover_message_uses_panel_field_names() {
        let json = HoverMessage {
            hovered_frame: "https://ads.example.com".into(),
        }
        .to_json()
        .unwrap();
        assert_eq!(json, r#"{"hoveredFrame":"https://ads.example.com"}"#);
    }
}
