use crate::dom::{DomNode, NodeType, Rect};

/// Replaced-element size of an `<iframe>` without explicit dimensions.
pub const DEFAULT_FRAME_WIDTH: f32 = 300.0;
pub const DEFAULT_FRAME_HEIGHT: f32 = 150.0;

const BLOCK_TAGS: &[&str] = &[
    "html",
    "body",
    "div",
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "table",
    "tr",
    "td",
    "th",
    "form",
    "section",
    "article",
    "aside",
    "main",
    "header",
    "footer",
    "nav",
    "blockquote",
    "pre",
    "figure",
    "figcaption",
    "details",
    "summary",
];

/// Elements that never produce a box.
const NO_BOX_TAGS: &[&str] = &["head", "title", "script", "style", "noscript", "template"];

/// Per-tag vertical margins (top, bottom) in pixels.
fn tag_margins(tag: &str) -> (f32, f32) {
    match tag {
        "h1" => (24.0, 16.0),
        "h2" => (20.0, 12.0),
        "h3" | "h4" => (16.0, 10.0),
        "h5" | "h6" => (12.0, 8.0),
        "p" => (4.0, 10.0),
        "ul" | "ol" => (8.0, 8.0),
        "li" => (2.0, 2.0),
        "section" | "article" | "main" => (16.0, 16.0),
        "nav" | "header" | "footer" => (12.0, 12.0),
        "blockquote" => (12.0, 12.0),
        "pre" => (8.0, 8.0),
        _ => (0.0, 0.0),
    }
}

/// Per-tag padding in pixels.
fn tag_padding(tag: &str, is_block: bool) -> f32 {
    match tag {
        "html" => 0.0,
        "body" => 8.0,
        "section" | "article" | "main" | "aside" => 16.0,
        "nav" | "header" | "footer" => 12.0,
        "blockquote" => 20.0,
        _ if is_block => 4.0,
        _ => 0.0,
    }
}

/// Value of `prop` in the element's inline `style` attribute.
pub fn inline_style<'a>(node: &'a DomNode, prop: &str) -> Option<&'a str> {
    node.attr("style")?.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim().eq_ignore_ascii_case(prop)).then(|| value.trim())
    })
}

/// Parse a CSS/HTML length: `120`, `120px` or `50%` of `available`.
fn parse_length(value: &str, available: f32) -> Option<f32> {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        return pct
            .trim()
            .parse::<f32>()
            .ok()
            .map(|p| (available * p / 100.0).max(0.0));
    }
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f32>().ok().map(|n| n.max(0.0))
}

/// `display: none`, the `hidden` attribute, or a non-rendered tag.
fn generates_no_box(node: &DomNode) -> bool {
    if node.node_type != NodeType::Element {
        return false;
    }
    NO_BOX_TAGS.contains(&node.tag.as_str())
        || node.attr("hidden").is_some()
        || inline_style(node, "display")
            .map(|d| d.eq_ignore_ascii_case("none"))
            .unwrap_or(false)
}

/// Assign document-space bounds to every node (simple top-to-bottom block
/// model). Nodes that generate no box get an empty rect at the current
/// cursor.
pub fn compute_layout(root: &mut DomNode, viewport_width: f32) {
    let mut cursor_y = 0.0;
    layout_node(root, 0.0, &mut cursor_y, viewport_width, 16.0);
}

fn collapse(node: &mut DomNode, x: f32, y: f32) {
    node.bounds = Rect::new(x, y, 0.0, 0.0);
    for child in &mut node.children {
        collapse(child, x, y);
    }
}

fn layout_frame(node: &mut DomNode, x: f32, cursor_y: &mut f32, available_width: f32) {
    let width = inline_style(node, "width")
        .or_else(|| node.attr("width"))
        .and_then(|w| parse_length(w, available_width))
        .unwrap_or(DEFAULT_FRAME_WIDTH);
    let height = inline_style(node, "height")
        .or_else(|| node.attr("height"))
        .and_then(|h| parse_length(h, available_width))
        .unwrap_or(DEFAULT_FRAME_HEIGHT);

    node.bounds = Rect::new(x, *cursor_y, width, height);
    *cursor_y += height;
}

fn layout_node(
    node: &mut DomNode,
    x: f32,
    cursor_y: &mut f32,
    available_width: f32,
    parent_font_size: f32,
) {
    if generates_no_box(node) {
        collapse(node, x, *cursor_y);
        return;
    }

    if node.is_frame() {
        layout_frame(node, x, cursor_y, available_width);
        return;
    }

    let is_block =
        node.node_type == NodeType::Element && BLOCK_TAGS.contains(&node.tag.as_str());

    let font_size = match node.tag.as_str() {
        "h1" => 32.0,
        "h2" => 24.0,
        "h3" => 20.0,
        "h4" => 18.0,
        "h5" | "h6" => 16.0,
        "small" => 12.0,
        _ => parent_font_size,
    };

    let (margin_top, margin_bottom) = tag_margins(&node.tag);
    let padding = tag_padding(&node.tag, is_block);

    if is_block {
        *cursor_y += margin_top;
    }

    let start_y = *cursor_y;

    if padding > 0.0 {
        *cursor_y += padding;
    }

    let child_x = x + padding;
    let child_width = (available_width - padding * 2.0).max(0.0);

    for child in &mut node.children {
        layout_node(child, child_x, cursor_y, child_width, font_size);
    }

    // Text content contributes to height
    if !node.text.trim().is_empty() {
        let line_height = font_size * 1.4;
        let chars_per_line = (available_width / (font_size * 0.6)).max(1.0) as usize;
        let lines = (node.text.len() as f32 / chars_per_line as f32).ceil().max(1.0);
        *cursor_y += lines * line_height;
    }

    if padding > 0.0 {
        *cursor_y += padding;
    }

    let height = *cursor_y - start_y;

    if is_block {
        *cursor_y += margin_bottom;
    }

    let width = if node.node_type == NodeType::Text || is_block {
        available_width
    } else {
        node.children
            .iter()
            .map(|c| c.bounds.x + c.bounds.width - x)
            .fold(0.0, f32::max)
    };

    node.bounds = Rect::new(x, start_y, width, height);
}
