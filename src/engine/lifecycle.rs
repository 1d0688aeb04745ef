//! Popover lifecycle: one overlay and one tooltip for the frame selected in
//! the panel, torn down before anything new is shown.

use crate::config::PopoverConfig;
use crate::dom::{Document, Rect};
use crate::engine::resolver::{resolve, ResolvedFrame};
use crate::message::{HoverMessage, SelectionMessage};
use crate::origin::display_origin;
use crate::render::overlay::{self, OverlayHandle};
use crate::render::position::{position, TooltipPlacement};
use crate::render::tooltip::{self, compose, Tooltip};

/// Ids of the popovers currently attached to the host document.
#[derive(Debug, Default)]
struct PopoverRegistry {
    overlay: Option<String>,
    tooltip: Option<String>,
}

/// What a `show` cycle put on the page.
#[derive(Debug, Clone)]
pub struct ShowOutcome {
    pub frame: ResolvedFrame,
    pub overlay: Option<OverlayHandle>,
    pub tooltip_id: String,
    pub tooltip: Tooltip,
    pub placement: TooltipPlacement,
    pub scrolled: bool,
}

/// Owns the popovers this engine draws into a host document.
#[derive(Debug)]
pub struct PopoverManager {
    config: PopoverConfig,
    registry: PopoverRegistry,
    next_id: u64,
    inspecting: bool,
}

impl PopoverManager {
    pub fn new(config: PopoverConfig) -> Self {
        Self {
            config,
            registry: PopoverRegistry::default(),
            next_id: 0,
            inspecting: false,
        }
    }

    pub fn config(&self) -> &PopoverConfig {
        &self.config
    }

    pub fn is_inspecting(&self) -> bool {
        self.inspecting
    }

    fn next_id(&mut self, kind: &str) -> String {
        self.next_id += 1;
        format!("ps-{}-{}", kind, self.next_id)
    }

    /// Remove the current overlay/tooltip pair, plus anything else carrying
    /// the marker classes.
    pub fn clear(&mut self, document: &mut Document) {
        for id in [self.registry.overlay.take(), self.registry.tooltip.take()]
            .into_iter()
            .flatten()
        {
            document.remove_by_id(&id);
        }
        let stray = document.remove_by_class(&self.config.overlay_class)
            + document.remove_by_class(&self.config.tooltip_class);
        if stray > 0 {
            log::debug!("removed {} stray popover(s)", stray);
        }
    }

    /// Run one popover cycle for `message`. Returns `None` when the message
    /// clears the selection or nothing on the page matches it.
    pub fn show(
        &mut self,
        document: &mut Document,
        message: &SelectionMessage,
    ) -> Option<ShowOutcome> {
        self.clear(document);
        self.inspecting = message.is_inspecting;

        if message.clears_selection() {
            return None;
        }

        let frames = resolve(document, &message.selected_origin);
        let Some(frame) = frames.first().cloned() else {
            log::debug!("no frame found for {}", message.selected_origin);
            return None;
        };
        let (visible, hidden) = frame_counts(document, &frame, &frames);

        let overlay_id = self.next_id("overlay");
        let overlay = overlay::render(document, &frame, &self.config, &overlay_id);
        if let Some(handle) = &overlay {
            overlay::attach_position(document, handle);
            self.registry.overlay = Some(handle.id.clone());
        }

        let tooltip = compose(
            document,
            Some(&frame),
            message,
            visible,
            hidden,
            &self.config,
        );

        let frame_rect = match &frame {
            ResolvedFrame::MainDocument => Some(document.viewport.client_rect()),
            ResolvedFrame::Embedded { path, .. } => document.bounding_client_rect(path),
        };
        let width = self.config.tooltip_width;
        let height = tooltip.measured_height(width);
        let placement = position(
            height,
            frame_rect,
            overlay.is_none(),
            frame.is_main(),
            &document.viewport,
            &self.config,
        );

        let tooltip_id = self.next_id("tooltip");
        let mut element = tooltip.to_element(&tooltip_id, &self.config, &placement);
        element.bounds = placement.document_rect(width, height, &document.viewport);
        if !document.append_to_body(element) {
            log::warn!("document has no body, tooltip not attached");
            self.clear(document);
            return None;
        }
        document.show_popover(&tooltip_id);
        self.registry.tooltip = Some(tooltip_id.clone());

        let scrolled = overlay.is_some()
            && document.scroll_into_view(&tooltip_id, self.config.scroll_behavior());

        log::info!(
            "showing {} for {}",
            tooltip.frame_type.label(),
            message.selected_origin
        );

        Some(ShowOutcome {
            frame,
            overlay,
            tooltip_id,
            tooltip,
            placement,
            scrolled,
        })
    }

    /// Switch the shown feature list between compact and expanded text.
    pub fn toggle_features(&self, document: &mut Document) -> Option<bool> {
        let id = self.registry.tooltip.as_deref()?;
        let element = document.element_by_id_mut(id)?;
        tooltip::toggle_features(element)
    }

    /// Report the frame under a viewport point while inspect mode is on.
    pub fn hover(&self, document: &Document, x: f32, y: f32) -> Option<HoverMessage> {
        if !self.inspecting {
            return None;
        }
        // Later frames paint over earlier ones.
        document.frames().iter().rev().find_map(|path| {
            let rect = document.bounding_client_rect(path)?;
            if rect.is_empty() || !rect.contains(x, y) {
                return None;
            }
            let src = document.node(path)?.attr("src")?;
            Some(HoverMessage {
                hovered_frame: display_origin(src)?,
            })
        })
    }
}

impl Default for PopoverManager {
    fn default() -> Self {
        Self::new(PopoverConfig::default())
    }
}

/// Visible and hidden frame counts shown in the tooltip. For the main
/// document every frame on the page counts; otherwise the frames matching
/// the selection.
fn frame_counts(
    document: &Document,
    frame: &ResolvedFrame,
    resolved: &[ResolvedFrame],
) -> (usize, usize) {
    let rects: Vec<Option<Rect>> = if frame.is_main() {
        document
            .frames()
            .iter()
            .map(|p| document.bounding_client_rect(p))
            .collect()
    } else {
        resolved
            .iter()
            .filter_map(|f| f.path())
            .map(|p| document.bounding_client_rect(p))
            .collect()
    };
    let visible = rects
        .iter()
        .filter(|r| r.is_some_and(|r| !r.is_empty()))
        .count();
    (visible, rects.len() - visible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ScrollBehavior, Viewport};
    use crate::message::RwsMembership;
    use crate::render::overlay::OverlayGeometry;
    use crate::render::position::{Anchor, Notch};
    use crate::render::tooltip::FrameType;

    const PAGE: &str = r#"<html><body>
        <h1>News</h1>
        <p>Some article text that pushes the frame down the page a little.</p>
        <iframe src="https://ads.example.com/tag" width="320" height="250"
                allow="attribution-reporting shared-storage"></iframe>
        <iframe src="https://tracker.example/p" width="0" height="0"></iframe>
    </body></html>"#;

    fn page() -> Document {
        Document::from_html(PAGE, "https://news.example/article", Viewport::new(1280.0, 800.0))
    }

    fn select(origin: &str) -> SelectionMessage {
        SelectionMessage {
            selected_origin: origin.into(),
            third_party_cookie_count: 3,
            blocked_cookie_count: 1,
            blocked_reasons: "SameSiteNoneInsecure".into(),
            is_on_rws: RwsMembership::No,
            ..Default::default()
        }
    }

    fn single_popover(doc: &Document, config: &PopoverConfig) {
        assert!(doc.count_class(&config.overlay_class) <= 1);
        assert_eq!(doc.count_class(&config.tooltip_class), 1);
    }

    #[test]
    fn end_to_end_visible_iframe() {
        let mut doc = page();
        let mut manager = PopoverManager::default();
        let outcome = manager.show(&mut doc, &select("https://ads.example.com")).unwrap();

        let frame_rect = doc
            .bounding_client_rect(outcome.frame.path().unwrap())
            .unwrap();
        match outcome.overlay.as_ref().unwrap().geometry {
            OverlayGeometry::Frame(rect) => {
                assert_eq!((rect.width, rect.height), (320.0, 250.0));
                assert_eq!((rect.width, rect.height), (frame_rect.width, frame_rect.height));
            }
            other => panic!("expected frame overlay, got {:?}", other),
        }

        let lines = outcome.tooltip.lines();
        for expected in [
            "Type: iframe",
            "Origin: https://ads.example.com",
            "Third-party cookies: 3",
            "Blocked cookies: 1",
            "Belongs to RWS: No",
            "Allowed Features (PS related): attribution-reporting, shared-storage",
        ] {
            assert!(lines.iter().any(|l| l == expected), "missing {expected:?}");
        }

        single_popover(&doc, manager.config());
        assert_eq!(doc.top_layer().len(), 2);
        assert!(outcome.scrolled);
        assert_eq!(doc.last_scroll_behavior(), Some(ScrollBehavior::Smooth));
    }

    #[test]
    fn hidden_frame_gets_detached_tooltip_without_scroll() {
        let mut doc = page();
        let mut manager = PopoverManager::default();
        let outcome = manager.show(&mut doc, &select("https://tracker.example")).unwrap();

        assert!(outcome.overlay.is_none());
        assert_eq!(outcome.tooltip.frame_type, FrameType::HiddenIframe);
        assert_eq!(outcome.placement.notch, Notch::Hidden);
        assert!(matches!(outcome.placement.anchor, Anchor::FixedBottomRight { .. }));
        assert!(!outcome.scrolled);
        assert_eq!(doc.last_scroll_behavior(), None);
        assert_eq!(doc.count_class("ps-frame-highlighter"), 0);
        assert_eq!(doc.count_class("ps-tooltip"), 1);
    }

    #[test]
    fn repeated_shows_keep_one_popover_pair() {
        let mut doc = page();
        let mut manager = PopoverManager::default();
        for origin in [
            "https://ads.example.com",
            "https://tracker.example",
            "https://news.example",
            "https://ads.example.com",
        ] {
            manager.show(&mut doc, &select(origin)).unwrap();
            single_popover(&doc, manager.config());
        }
        assert!(doc.top_layer().len() <= 2);
    }

    #[test]
    fn stray_popovers_are_swept() {
        let mut doc = page();
        let mut manager = PopoverManager::default();
        manager.show(&mut doc, &select("https://ads.example.com")).unwrap();

        // A second manager knows nothing about the first one's registry.
        let mut other = PopoverManager::default();
        other.show(&mut doc, &select("https://ads.example.com")).unwrap();
        single_popover(&doc, other.config());
    }

    #[test]
    fn empty_or_unmatched_selection_clears() {
        let mut doc = page();
        let mut manager = PopoverManager::default();
        manager.show(&mut doc, &select("https://ads.example.com")).unwrap();

        assert!(manager.show(&mut doc, &select("")).is_none());
        assert_eq!(doc.count_class("ps-tooltip"), 0);
        assert_eq!(doc.count_class("ps-frame-highlighter"), 0);
        assert!(doc.top_layer().is_empty());

        manager.show(&mut doc, &select("https://ads.example.com")).unwrap();
        assert!(manager.show(&mut doc, &select("https://nowhere.example")).is_none());
        assert_eq!(doc.count_class("ps-tooltip"), 0);
    }

    #[test]
    fn main_frame_counts_every_frame_and_pins_to_top() {
        let mut doc = page();
        let mut manager = PopoverManager::default();
        let outcome = manager.show(&mut doc, &select("https://news.example")).unwrap();

        assert_eq!(outcome.tooltip.frame_type, FrameType::MainFrame);
        assert_eq!(outcome.tooltip.row("Visible iframes").map(|v| v.as_str()), Some("1"));
        assert_eq!(outcome.tooltip.row("Hidden iframes").map(|v| v.as_str()), Some("1"));
        assert_eq!(
            outcome.overlay.as_ref().map(|o| o.geometry),
            Some(OverlayGeometry::Viewport)
        );
        assert!(matches!(outcome.placement.anchor, Anchor::FixedTop { .. }));
        assert_eq!(outcome.placement.notch, Notch::Up);
    }

    #[test]
    fn scrolled_main_frame_still_pins_to_top() {
        let mut doc = page();
        doc.viewport.scroll_y = 2000.0;
        let mut manager = PopoverManager::default();
        let outcome = manager.show(&mut doc, &select("https://news.example")).unwrap();

        assert!(matches!(outcome.placement.anchor, Anchor::FixedTop { .. }));
        assert_eq!(outcome.placement.notch, Notch::Up);
        assert_eq!(doc.viewport.scroll_y, 2000.0);
    }

    #[test]
    fn instant_scroll_when_smooth_scroll_is_off() {
        let mut doc = page();
        let mut manager = PopoverManager::new(PopoverConfig {
            smooth_scroll: false,
            ..Default::default()
        });
        let outcome = manager.show(&mut doc, &select("https://ads.example.com")).unwrap();
        assert!(outcome.scrolled);
        assert_eq!(doc.last_scroll_behavior(), Some(ScrollBehavior::Instant));
    }

    #[test]
    fn frame_near_top_gets_tooltip_below() {
        let mut doc = Document::from_html(
            r#"<html><body><iframe src="https://ads.example.com/x" height="100"></iframe></body></html>"#,
            "https://news.example/",
            Viewport::default(),
        );
        let mut manager = PopoverManager::default();
        let outcome = manager.show(&mut doc, &select("https://ads.example.com")).unwrap();
        assert_eq!(outcome.placement.notch, Notch::Up);
        assert_eq!(
            outcome.placement.anchor,
            Anchor::Absolute { top: 8.0 + 100.0 + 10.0, left: 8.0 }
        );
    }

    #[test]
    fn toggle_features_through_manager() {
        let mut doc = Document::from_html(
            r#"<html><body><h1>x</h1><h1>y</h1><h1>z</h1><h1>w</h1>
               <iframe src="https://ads.example.com/x"
                 allow="attribution-reporting browsing-topics join-ad-interest-group private-aggregation run-ad-auction shared-storage"></iframe>
               </body></html>"#,
            "https://news.example/",
            Viewport::default(),
        );
        let mut manager = PopoverManager::default();
        assert!(manager.toggle_features(&mut doc).is_none());
        manager.show(&mut doc, &select("https://ads.example.com")).unwrap();
        assert_eq!(manager.toggle_features(&mut doc), Some(true));
        assert_eq!(manager.toggle_features(&mut doc), Some(false));
    }

    #[test]
    fn hover_reports_frame_only_while_inspecting() {
        let mut doc = page();
        let mut manager = PopoverManager::default();
        let rect = doc.bounding_client_rect(&doc.frames()[0]).unwrap();
        let (x, y) = (rect.x + 5.0, rect.y + 5.0);

        assert!(manager.hover(&doc, x, y).is_none());

        let mut msg = select("");
        msg.is_inspecting = true;
        manager.show(&mut doc, &msg);
        assert_eq!(
            manager.hover(&doc, x, y),
            Some(HoverMessage {
                hovered_frame: "https://ads.example.com".into()
            })
        );
        assert!(manager.hover(&doc, 1270.0, 790.0).is_none());
    }
}
