//! Frame information tooltip.
//!
//! Built in two steps: [`compose`] gathers everything shown about the
//! frame into a [`Tooltip`], and [`Tooltip::to_element`] turns it into the
//! node attached to the host document once a placement is known.

use std::collections::HashMap;

use crate::config::PopoverConfig;
use crate::dom::{Document, DomNode};
use crate::engine::resolver::ResolvedFrame;
use crate::message::SelectionMessage;
use crate::origin::display_origin;
use crate::render::position::{Notch, TooltipPlacement};

const FONT_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = FONT_SIZE * 1.4;
const PADDING: f32 = 8.0;
const ELLIPSIS: &str = "...";

/// Class of the element holding the feature list and its two renderings.
pub const FEATURES_CLASS: &str = "ps-tooltip-features";
/// Class of the "Show more" / "Show less" button.
pub const TOGGLE_CLASS: &str = "ps-tooltip-toggle";

const UNKNOWN_FRAME_NOTE: &str = "This frame could not be located on the page. It may be a \
     cross-origin frame nested inside another frame, whose details are not accessible from here.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    MainFrame,
    NestedIframe,
    HiddenIframe,
    Iframe,
    Unknown,
}

impl FrameType {
    pub fn label(&self) -> &'static str {
        match self {
            FrameType::MainFrame => "main frame",
            FrameType::NestedIframe => "nested iframe",
            FrameType::HiddenIframe => "hidden iframe",
            FrameType::Iframe => "iframe",
            FrameType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowValue {
    Text(String),
    Link(String),
}

impl RowValue {
    pub fn as_str(&self) -> &str {
        match self {
            RowValue::Text(s) | RowValue::Link(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TooltipRow {
    pub label: &'static str,
    pub value: RowValue,
}

impl TooltipRow {
    fn text(label: &'static str, value: impl ToString) -> Self {
        Self {
            label,
            value: RowValue::Text(value.to_string()),
        }
    }
}

/// Privacy Sandbox features a frame is permitted to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureList {
    pub features: Vec<String>,
    /// Every feature, comma-joined.
    pub expanded: String,
    /// First features plus an ellipsis, when the list is long.
    pub compact: Option<String>,
}

impl FeatureList {
    /// Intersect a capability-policy value with the configured allow-list.
    ///
    /// Directives may be separated by `;`, `,` or whitespace; allow-list
    /// origins such as `'self'` simply never match a feature name.
    pub fn from_policy(policy: &str, config: &PopoverConfig) -> Option<Self> {
        let mut features: Vec<String> = Vec::new();
        for token in policy.split(|c: char| c == ';' || c == ',' || c.is_whitespace()) {
            let token = token.trim().to_ascii_lowercase();
            if config.is_allowed_feature(&token) && !features.contains(&token) {
                features.push(token);
            }
        }
        if features.is_empty() {
            return None;
        }

        let expanded = features.join(", ");
        let limit = config.compact_feature_limit;
        let compact = (features.len() > limit)
            .then(|| format!("{}{}", features[..limit].join(", "), ELLIPSIS));

        Some(Self {
            features,
            expanded,
            compact,
        })
    }

    /// Text shown before the user expands the list.
    pub fn initial_text(&self) -> &str {
        self.compact.as_deref().unwrap_or(&self.expanded)
    }

    pub fn text(&self, expanded: bool) -> &str {
        if expanded {
            &self.expanded
        } else {
            self.initial_text()
        }
    }
}

/// Everything shown about one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub frame_type: FrameType,
    pub rows: Vec<TooltipRow>,
    /// Shown instead of the rows for frames that cannot be located.
    pub note: Option<String>,
    pub features: Option<FeatureList>,
    /// Iframe count rows left out on simple pages.
    pub counts_collapsed: bool,
}

/// Facts read from the element that really hosts the selected origin.
struct TargetFacts {
    frame_type: FrameType,
    origin: Option<String>,
    allow: Option<String>,
}

fn target_facts(document: &Document, frame: &ResolvedFrame) -> Option<TargetFacts> {
    match frame {
        ResolvedFrame::MainDocument => Some(TargetFacts {
            frame_type: FrameType::MainFrame,
            origin: Some(document.origin().to_string()),
            allow: None,
        }),
        ResolvedFrame::Embedded {
            path,
            nested: Some(nested),
        } => {
            let inner_doc = document.accessible_content_document(path)?;
            let inner = inner_doc.node(&nested.path)?;
            Some(TargetFacts {
                frame_type: FrameType::NestedIframe,
                origin: display_origin(inner.attr("src").unwrap_or_default()),
                allow: inner.attr("allow").map(str::to_string),
            })
        }
        ResolvedFrame::Embedded { path, nested: None } => {
            let element = document.node(path)?;
            let hidden = document
                .bounding_client_rect(path)
                .map(|r| r.is_empty())
                .unwrap_or(true);
            Some(TargetFacts {
                frame_type: if hidden {
                    FrameType::HiddenIframe
                } else {
                    FrameType::Iframe
                },
                origin: display_origin(element.attr("src").unwrap_or_default()),
                allow: element.attr("allow").map(str::to_string),
            })
        }
    }
}

/// Gather the tooltip contents for `frame`.
///
/// `frame` is `None` when nothing could be located; the tooltip then only
/// carries an explanatory note. A nested frame that disappeared from its
/// outer document is treated the same way.
pub fn compose(
    document: &Document,
    frame: Option<&ResolvedFrame>,
    message: &SelectionMessage,
    visible_frames: usize,
    hidden_frames: usize,
    config: &PopoverConfig,
) -> Tooltip {
    let Some(facts) = frame.and_then(|f| target_facts(document, f)) else {
        return Tooltip {
            frame_type: FrameType::Unknown,
            rows: Vec::new(),
            note: Some(UNKNOWN_FRAME_NOTE.to_string()),
            features: None,
            counts_collapsed: true,
        };
    };

    let features = facts
        .allow
        .as_deref()
        .and_then(|policy| FeatureList::from_policy(policy, config));

    let mut rows = vec![TooltipRow::text("Type", facts.frame_type.label())];

    let origin = match facts.origin {
        None => RowValue::Text("empty".to_string()),
        Some(o) if o == "about:blank" => RowValue::Text(o),
        Some(o) => RowValue::Link(o),
    };
    rows.push(TooltipRow {
        label: "Origin",
        value: origin,
    });

    let counts_collapsed = visible_frames <= 1 && hidden_frames == 0;
    if !counts_collapsed {
        rows.push(TooltipRow::text("Visible iframes", visible_frames));
        rows.push(TooltipRow::text("Hidden iframes", hidden_frames));
    }

    rows.push(TooltipRow::text(
        "First-party cookies",
        message.first_party_cookie_count,
    ));
    rows.push(TooltipRow::text(
        "Third-party cookies",
        message.third_party_cookie_count,
    ));
    rows.push(TooltipRow::text(
        "Blocked cookies",
        message.blocked_cookie_count,
    ));
    if !message.blocked_reasons.is_empty() {
        rows.push(TooltipRow::text("Blocked reasons", &message.blocked_reasons));
    }
    rows.push(TooltipRow::text("Belongs to RWS", message.is_on_rws.label()));
    if let Some(list) = &features {
        rows.push(TooltipRow::text(
            "Allowed Features (PS related)",
            list.initial_text(),
        ));
    }

    Tooltip {
        frame_type: facts.frame_type,
        rows,
        note: None,
        features,
        counts_collapsed,
    }
}

impl Tooltip {
    pub fn row(&self, label: &str) -> Option<&RowValue> {
        self.rows.iter().find(|r| r.label == label).map(|r| &r.value)
    }

    /// Rows as `Label: value` lines.
    pub fn lines(&self) -> Vec<String> {
        if let Some(note) = &self.note {
            return vec![note.clone()];
        }
        self.rows
            .iter()
            .map(|r| format!("{}: {}", r.label, r.value.as_str()))
            .collect()
    }

    /// Estimated rendered height at `width` pixels wide.
    pub fn measured_height(&self, width: f32) -> f32 {
        let chars_per_line = (width / (FONT_SIZE * 0.6)).max(1.0);
        let mut lines = 0.0;
        for line in self.lines() {
            lines += (line.len() as f32 / chars_per_line).ceil().max(1.0);
        }
        if self.features.as_ref().is_some_and(|f| f.compact.is_some()) {
            lines += 1.0;
        }
        lines * LINE_HEIGHT + PADDING * 2.0
    }

    /// Build the tooltip element for the host document.
    pub fn to_element(
        &self,
        id: &str,
        config: &PopoverConfig,
        placement: &TooltipPlacement,
    ) -> DomNode {
        let notch_class = match placement.notch {
            Notch::Down => "ps-tooltip-notch",
            Notch::Up => "ps-tooltip-notch ps-tooltip-notch-up",
            Notch::Hidden => "ps-tooltip-notch ps-tooltip-notch-hidden",
        };
        let notch = element("div").with_attr("class", notch_class);

        let mut info = element("div").with_attr("class", "ps-tooltip-info");
        if let Some(note) = &self.note {
            info = info.with_child(
                element("p")
                    .with_attr("class", "ps-tooltip-note")
                    .with_child(DomNode::text(note.as_str())),
            );
        }
        for row in &self.rows {
            info = info.with_child(self.row_element(row));
        }

        element("div")
            .with_attr("id", id)
            .with_attr("class", config.tooltip_class.as_str())
            .with_attr("popover", "manual")
            .with_attr("data-frame-type", self.frame_type.label())
            .with_attr("style", placement.style())
            .with_child(notch)
            .with_child(info)
    }

    fn row_element(&self, row: &TooltipRow) -> DomNode {
        let label = element("strong").with_child(DomNode::text(format!("{}: ", row.label)));
        let mut p = element("p").with_attr("class", "ps-tooltip-row").with_child(label);

        let features = self
            .features
            .as_ref()
            .filter(|_| row.label == "Allowed Features (PS related)");

        match (&row.value, features) {
            (_, Some(list)) => {
                let mut span = element("span")
                    .with_attr("class", FEATURES_CLASS)
                    .with_attr("data-expanded", list.expanded.as_str())
                    .with_attr("data-state", "compact")
                    .with_child(DomNode::text(list.initial_text()));
                if let Some(compact) = &list.compact {
                    span.set_attr("data-compact", compact.as_str());
                }
                p = p.with_child(span);
                if list.compact.is_some() {
                    p = p.with_child(
                        element("button")
                            .with_attr("class", TOGGLE_CLASS)
                            .with_child(DomNode::text("Show more")),
                    );
                }
            }
            (RowValue::Link(url), None) => {
                p = p.with_child(
                    element("a")
                        .with_attr("href", url.as_str())
                        .with_attr("target", "_blank")
                        .with_child(DomNode::text(url.as_str())),
                );
            }
            (RowValue::Text(text), None) => {
                p = p.with_child(element("span").with_child(DomNode::text(text.as_str())));
            }
        }
        p
    }
}

fn element(tag: &str) -> DomNode {
    DomNode::element(tag, HashMap::new(), Vec::new())
}

/// Flip a rendered feature list between its compact and expanded text.
///
/// Returns the new state (`true` = expanded), or `None` when the tooltip
/// has no collapsible list.
pub fn toggle_features(tooltip: &mut DomNode) -> Option<bool> {
    let span = tooltip.find_class_mut(FEATURES_CLASS)?;
    let compact = span.attr("data-compact")?.to_string();
    let expanded = span.attr("data-expanded")?.to_string();
    let expand = span.attr("data-state") != Some("expanded");

    span.children = vec![DomNode::text(if expand { expanded } else { compact })];
    span.set_attr("data-state", if expand { "expanded" } else { "compact" });

    if let Some(button) = tooltip.find_class_mut(TOGGLE_CLASS) {
        button.children = vec![DomNode::text(if expand { "Show less" } else { "Show more" })];
    }
    Some(expand)
}
