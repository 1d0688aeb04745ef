//! Tooltip placement relative to the selected frame.
//!
//! Pure geometry: the caller measures, this module decides, and the
//! lifecycle manager writes the result into the document.

use crate::config::PopoverConfig;
use crate::dom::{Rect, Viewport};

/// Direction of the small arrow joining tooltip and frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notch {
    /// Tooltip sits above the frame.
    Down,
    /// Tooltip sits below the frame or at the top of the viewport.
    Up,
    /// Tooltip is detached from the frame.
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Fixed to the bottom-right corner of the viewport.
    FixedBottomRight { inset: f32 },
    /// Fixed near the top-left corner of the viewport.
    FixedTop { top: f32, left: f32 },
    /// Absolute position in document coordinates.
    Absolute { top: f32, left: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPlacement {
    pub anchor: Anchor,
    pub max_width: Option<f32>,
    pub notch: Notch,
}

impl TooltipPlacement {
    fn detached(config: &PopoverConfig) -> Self {
        Self {
            anchor: Anchor::FixedBottomRight {
                inset: config.corner_inset,
            },
            max_width: None,
            notch: Notch::Hidden,
        }
    }

    pub fn style(&self) -> String {
        let mut style = match self.anchor {
            Anchor::FixedBottomRight { inset } => {
                format!("position: fixed; bottom: {}px; right: {}px;", inset, inset)
            }
            Anchor::FixedTop { top, left } => {
                format!("position: fixed; top: {}px; left: {}px;", top, left)
            }
            Anchor::Absolute { top, left } => {
                format!("position: absolute; top: {}px; left: {}px;", top, left)
            }
        };
        if let Some(max_width) = self.max_width {
            style.push_str(&format!(" max-width: {}px;", max_width));
        }
        style
    }

    /// Where a tooltip of the given size ends up, in document coordinates.
    pub fn document_rect(&self, width: f32, height: f32, viewport: &Viewport) -> Rect {
        let width = self.max_width.map_or(width, |m| width.min(m));
        match self.anchor {
            Anchor::FixedBottomRight { inset } => Rect::new(
                viewport.scroll_x + viewport.width - inset - width,
                viewport.scroll_y + viewport.height - inset - height,
                width,
                height,
            ),
            Anchor::FixedTop { top, left } => Rect::new(
                viewport.scroll_x + left,
                viewport.scroll_y + top,
                width,
                height,
            ),
            Anchor::Absolute { top, left } => Rect::new(left, top, width, height),
        }
    }
}

/// Place a tooltip of `tooltip_height` next to a frame whose client rect
/// is `frame_rect`. Rules, first match wins:
///
/// 1. hidden frame, or geometry unavailable: pinned bottom-right;
/// 2. not enough room above the frame: below it (main document: pinned
///    to the top of the viewport), notch pointing up;
/// 3. otherwise directly above the frame's top-left corner.
pub fn position(
    tooltip_height: f32,
    frame_rect: Option<Rect>,
    is_hidden: bool,
    is_main: bool,
    viewport: &Viewport,
    config: &PopoverConfig,
) -> TooltipPlacement {
    let rect = match frame_rect {
        Some(rect) if !is_hidden && !rect.is_empty() => rect,
        _ => {
            log::debug!("tooltip detached to viewport corner");
            return TooltipPlacement::detached(config);
        }
    };

    // The main document starts at the top of the page whatever the scroll.
    let top_offset = if is_main { 0.0 } else { rect.y + viewport.scroll_y };
    let left = rect.x + viewport.scroll_x;

    if tooltip_height > top_offset {
        if is_main {
            log::debug!("tooltip pinned to top of viewport");
            return TooltipPlacement {
                anchor: Anchor::FixedTop {
                    top: config.corner_inset,
                    left: config.corner_inset,
                },
                max_width: None,
                notch: Notch::Up,
            };
        }
        log::debug!("no room above frame, tooltip placed below");
        return TooltipPlacement {
            anchor: Anchor::Absolute {
                top: top_offset + rect.height + config.frame_gap,
                left,
            },
            max_width: None,
            notch: Notch::Up,
        };
    }

    TooltipPlacement {
        anchor: Anchor::Absolute {
            top: top_offset - tooltip_height - config.frame_gap,
            left,
        },
        max_width: Some((rect.width - config.width_margin).max(0.0)),
        notch: Notch::Down,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> PopoverConfig {
        PopoverConfig::default()
    }

    #[test]
    fn default_sits_above_frame() {
        let vp = Viewport::new(1280.0, 800.0);
        let p = position(
            120.0,
            Some(Rect::new(50.0, 400.0, 300.0, 250.0)),
            false,
            false,
            &vp,
            &cfg(),
        );
        assert_eq!(p.anchor, Anchor::Absolute { top: 270.0, left: 50.0 });
        assert_eq!(p.max_width, Some(260.0));
        assert_eq!(p.notch, Notch::Down);
    }

    #[test]
    fn default_accounts_for_scroll() {
        let mut vp = Viewport::new(1280.0, 800.0);
        vp.scroll_y = 500.0;
        vp.scroll_x = 20.0;
        let p = position(
            120.0,
            Some(Rect::new(50.0, 100.0, 300.0, 250.0)),
            false,
            false,
            &vp,
            &cfg(),
        );
        assert_eq!(p.anchor, Anchor::Absolute { top: 470.0, left: 70.0 });
    }

    #[test]
    fn short_space_moves_tooltip_below() {
        let vp = Viewport::new(1280.0, 800.0);
        let p = position(
            120.0,
            Some(Rect::new(8.0, 40.0, 300.0, 150.0)),
            false,
            false,
            &vp,
            &cfg(),
        );
        assert_eq!(p.anchor, Anchor::Absolute { top: 200.0, left: 8.0 });
        assert_eq!(p.notch, Notch::Up);
    }

    #[test]
    fn short_space_on_main_document_pins_to_top() {
        let vp = Viewport::new(1280.0, 800.0);
        let p = position(120.0, Some(vp.client_rect()), false, true, &vp, &cfg());
        assert_eq!(p.anchor, Anchor::FixedTop { top: 10.0, left: 10.0 });
        assert_eq!(p.notch, Notch::Up);
    }

    #[test]
    fn scrolled_main_document_still_pins_to_top() {
        let mut vp = Viewport::new(1280.0, 800.0);
        vp.scroll_y = 2000.0;
        let p = position(120.0, Some(vp.client_rect()), false, true, &vp, &cfg());
        assert_eq!(p.anchor, Anchor::FixedTop { top: 10.0, left: 10.0 });
        assert_eq!(p.notch, Notch::Up);
        assert_eq!(p.max_width, None);
    }

    #[test]
    fn hidden_or_unreadable_frames_pin_bottom_right() {
        let vp = Viewport::new(1280.0, 800.0);
        for (rect, hidden) in [
            (None, false),
            (Some(Rect::new(0.0, 300.0, 0.0, 0.0)), false),
            (Some(Rect::new(0.0, 300.0, 100.0, 100.0)), true),
        ] {
            let p = position(120.0, rect, hidden, false, &vp, &cfg());
            assert_eq!(p.anchor, Anchor::FixedBottomRight { inset: 10.0 });
            assert_eq!(p.notch, Notch::Hidden);
        }
    }

    #[test]
    fn narrow_frame_never_yields_negative_width() {
        let vp = Viewport::new(1280.0, 800.0);
        let p = position(
            50.0,
            Some(Rect::new(0.0, 400.0, 30.0, 30.0)),
            false,
            false,
            &vp,
            &cfg(),
        );
        assert_eq!(p.max_width, Some(0.0));
    }

    #[test]
    fn document_rect_follows_anchor() {
        let mut vp = Viewport::new(1000.0, 600.0);
        vp.scroll_y = 100.0;
        let detached = TooltipPlacement::detached(&cfg());
        assert_eq!(
            detached.document_rect(200.0, 80.0, &vp),
            Rect::new(790.0, 610.0, 200.0, 80.0)
        );
    }
}
