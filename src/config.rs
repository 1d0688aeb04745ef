//! Popover configuration.
//!
//! Everything the engine writes into the host page is tunable here: the
//! marker classes identifying its own elements, tooltip geometry and the
//! list of capability-policy features worth surfacing.

use serde::Deserialize;

use crate::dom::ScrollBehavior;
use crate::error::{read_to_string, Result};

/// Privacy Sandbox features reported from a frame's `allow` attribute.
pub const PRIVACY_SANDBOX_FEATURES: &[&str] = &[
    "attribution-reporting",
    "browsing-topics",
    "join-ad-interest-group",
    "private-aggregation",
    "private-state-token-issuance",
    "private-state-token-redemption",
    "run-ad-auction",
    "shared-storage",
    "shared-storage-select-url",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PopoverConfig {
    /// Marker class of the highlight overlay.
    pub overlay_class: String,
    /// Marker class of the information tooltip.
    pub tooltip_class: String,
    /// Nominal tooltip width used when measuring its height.
    pub tooltip_width: f32,
    /// Horizontal room kept free when the tooltip is narrowed to a frame.
    pub width_margin: f32,
    /// Distance between the tooltip and the frame edge (notch height).
    pub frame_gap: f32,
    /// Inset of viewport-pinned tooltips from the viewport edges.
    pub corner_inset: f32,
    /// Features shown before the list collapses behind "Show more".
    pub compact_feature_limit: usize,
    /// Animate the scroll that brings a new tooltip into view.
    pub smooth_scroll: bool,
    pub allowed_features: Vec<String>,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            overlay_class: "ps-frame-highlighter".into(),
            tooltip_class: "ps-tooltip".into(),
            tooltip_width: 320.0,
            width_margin: 40.0,
            frame_gap: 10.0,
            corner_inset: 10.0,
            compact_feature_limit: 5,
            smooth_scroll: true,
            allowed_features: PRIVACY_SANDBOX_FEATURES
                .iter()
                .map(|f| f.to_string())
                .collect(),
        }
    }
}

impl PopoverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded popover config from {}", path.display());
        Ok(config)
    }

    pub fn scroll_behavior(&self) -> ScrollBehavior {
        if self.smooth_scroll {
            ScrollBehavior::Smooth
        } else {
            ScrollBehavior::Instant
        }
    }

    pub fn is_allowed_feature(&self, name: &str) -> bool {
        self.allowed_features.iter().any(|f| f == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = PopoverConfig::from_toml_str(
            r#"
            tooltip_class = "my-tooltip"
            compact_feature_limit = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.tooltip_class, "my-tooltip");
        assert_eq!(config.compact_feature_limit, 3);
        assert_eq!(config.overlay_class, "ps-frame-highlighter");
        assert_eq!(config.width_margin, 40.0);
        assert!(config.is_allowed_feature("run-ad-auction"));
        assert_eq!(config.scroll_behavior(), ScrollBehavior::Smooth);
    }

    #[test]
    fn smooth_scroll_can_be_turned_off() {
        let config = PopoverConfig::from_toml_str("smooth_scroll = false").unwrap();
        assert_eq!(config.scroll_behavior(), ScrollBehavior::Instant);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(PopoverConfig::from_toml_str("width_margin = \"wide\"").is_err());
    }
}
