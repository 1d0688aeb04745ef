//! Highlight overlay drawn over the selected frame.

use std::collections::HashMap;

use crate::config::PopoverConfig;
use crate::dom::{Document, DomNode, Rect};
use crate::engine::resolver::ResolvedFrame;

/// What the overlay should cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayGeometry {
    /// The whole viewport, fixed while scrolling (main document).
    Viewport,
    /// A frame's measured box, in document coordinates.
    Frame(Rect),
}

/// Handle to an overlay attached to the host document.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayHandle {
    pub id: String,
    pub geometry: OverlayGeometry,
}

/// Decide what to highlight. `None` means the frame has no visible area.
pub fn plan(document: &Document, frame: &ResolvedFrame) -> Option<OverlayGeometry> {
    match frame {
        ResolvedFrame::MainDocument => {
            (!document.viewport.client_rect().is_empty()).then_some(OverlayGeometry::Viewport)
        }
        ResolvedFrame::Embedded { path, .. } => {
            let rect = document.bounding_client_rect(path)?;
            if rect.is_empty() {
                return None;
            }
            let vp = &document.viewport;
            Some(OverlayGeometry::Frame(rect.translate(vp.scroll_x, vp.scroll_y)))
        }
    }
}

fn overlay_style(geometry: &OverlayGeometry) -> String {
    match geometry {
        OverlayGeometry::Viewport => {
            "position: fixed; top: 0; left: 0; width: 100%; height: 100%;".to_string()
        }
        OverlayGeometry::Frame(rect) => {
            format!("width: {}px; height: {}px;", rect.width, rect.height)
        }
    }
}

/// Create the overlay, append it to `<body>` and show it as a popover.
///
/// Returns `None` for hidden frames and for documents without a body.
pub fn render(
    document: &mut Document,
    frame: &ResolvedFrame,
    config: &PopoverConfig,
    id: &str,
) -> Option<OverlayHandle> {
    let Some(geometry) = plan(document, frame) else {
        log::debug!("frame has no visible area, skipping overlay");
        return None;
    };

    let mut node = DomNode::element("div", HashMap::new(), Vec::new())
        .with_attr("id", id)
        .with_attr("class", config.overlay_class.as_str())
        .with_attr("popover", "manual")
        .with_attr("style", overlay_style(&geometry));
    node.bounds = match geometry {
        OverlayGeometry::Viewport => {
            let vp = &document.viewport;
            vp.client_rect().translate(vp.scroll_x, vp.scroll_y)
        }
        OverlayGeometry::Frame(rect) => rect,
    };

    if !document.append_to_body(node) {
        log::warn!("document has no body, overlay not attached");
        return None;
    }
    document.show_popover(id);

    Some(OverlayHandle {
        id: id.to_string(),
        geometry,
    })
}

/// Pin a frame overlay onto the frame's box. Viewport overlays are already
/// placed.
pub fn attach_position(document: &mut Document, handle: &OverlayHandle) {
    let OverlayGeometry::Frame(rect) = handle.geometry else {
        return;
    };
    if let Some(node) = document.element_by_id_mut(&handle.id) {
        node.set_attr(
            "style",
            format!(
                "position: absolute; top: {}px; left: {}px; width: {}px; height: {}px;",
                rect.y, rect.x, rect.width, rect.height
            ),
        );
    }
}
