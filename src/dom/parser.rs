use crate::dom::{Document, DomNode, Viewport};
use crate::origin::serialize_origin;
use crate::render::layout::compute_layout;
use scraper::{ElementRef, Html, Node};
use std::collections::HashMap;

/// Tags whose children should be stripped (invisible/script content)
const SKIP_CHILDREN: &[&str] = &["script", "style", "noscript", "svg", "iframe"];

/// `srcdoc` frames nested deeper than this are left unloaded.
const MAX_SRCDOC_DEPTH: usize = 8;

/// Parse raw HTML into a laid-out [`Document`].
///
/// `srcdoc` iframes are loaded as nested documents that inherit the
/// embedder's origin.
pub fn parse_document(html: &str, url: &str, viewport: Viewport) -> Document {
    let origin = serialize_origin(url).unwrap_or_else(|| "null".to_string());
    parse_with_origin(html, url, origin, viewport, 0)
}

fn parse_with_origin(
    html: &str,
    url: &str,
    origin: String,
    viewport: Viewport,
    depth: usize,
) -> Document {
    let parsed = Html::parse_document(html);

    // Extract <title>
    let title = scraper::Selector::parse("title")
        .ok()
        .and_then(|sel| parsed.select(&sel).next())
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

    let mut root = convert_element(parsed.root_element());
    compute_layout(&mut root, viewport.width);

    if depth < MAX_SRCDOC_DEPTH {
        load_srcdoc_frames(&mut root, &origin, depth);
    } else {
        log::debug!("srcdoc nesting limit reached at {}", url);
    }

    let mut document = Document::with_origin(root, url, origin, viewport);
    document.title = title.trim().to_string();
    document
}

fn load_srcdoc_frames(node: &mut DomNode, origin: &str, depth: usize) {
    if node.is_frame() {
        if let Some(srcdoc) = node.attr("srcdoc").map(str::to_string) {
            let frame_viewport = Viewport::new(node.bounds.width, node.bounds.height);
            let nested = parse_with_origin(
                &srcdoc,
                "about:srcdoc",
                origin.to_string(),
                frame_viewport,
                depth + 1,
            );
            node.content_document = Some(Box::new(nested));
        }
        return;
    }
    for child in &mut node.children {
        load_srcdoc_frames(child, origin, depth);
    }
}

fn convert_element(el: ElementRef<'_>) -> DomNode {
    let tag = el.value().name.local.as_ref().to_string();
    let attributes: HashMap<String, String> = el
        .value()
        .attrs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    // Skip children of invisible elements
    if SKIP_CHILDREN.contains(&tag.as_str()) {
        return DomNode::element(tag, attributes, Vec::new());
    }

    let mut children = Vec::new();

    for child_ref in el.children() {
        match child_ref.value() {
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child_ref) {
                    children.push(convert_element(child_el));
                }
            }
            Node::Text(t) => {
                let s = t.text.to_string();
                if !s.trim().is_empty() {
                    children.push(DomNode::text(s));
                }
            }
            _ => {}
        }
    }

    DomNode::element(tag, attributes, children)
}
