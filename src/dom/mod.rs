pub mod parser;
pub mod serialize;

use std::collections::HashMap;

use crate::origin::{same_origin, serialize_origin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
}

/// Axis-aligned box in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A box with no painted area (hidden frame).
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Visible area of a document and its scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// The viewport itself, in client coordinates.
    pub fn client_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// Child-index path from a document root to one of its nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct DomNode {
    pub tag: String,
    pub attributes: HashMap<String, String>,
    pub text: String,
    pub children: Vec<DomNode>,
    pub node_type: NodeType,
    /// Layout box in document coordinates.
    pub bounds: Rect,
    /// Loaded document of an `<iframe>`, if any. Access goes through
    /// [`Document::accessible_content_document`].
    pub content_document: Option<Box<Document>>,
}

impl DomNode {
    pub fn element(
        tag: impl Into<String>,
        attrs: HashMap<String, String>,
        children: Vec<DomNode>,
    ) -> Self {
        Self {
            tag: tag.into(),
            attributes: attrs,
            text: String::new(),
            children,
            node_type: NodeType::Element,
            bounds: Rect::default(),
            content_document: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: String::new(),
            attributes: HashMap::new(),
            text: content.into(),
            children: Vec::new(),
            node_type: NodeType::Text,
            bounds: Rect::default(),
            content_document: None,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: DomNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn is_frame(&self) -> bool {
        self.node_type == NodeType::Element && self.tag == "iframe"
    }

    /// Collect all text content recursively
    pub fn collect_text(&self) -> String {
        let mut buf = String::new();
        self.collect_text_inner(&mut buf);
        buf
    }

    fn collect_text_inner(&self, buf: &mut String) {
        if !self.text.is_empty() {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(self.text.trim());
        }
        for child in &self.children {
            child.collect_text_inner(buf);
        }
    }

    /// First descendant (or self) carrying `class`.
    pub fn find_class(&self, class: &str) -> Option<&DomNode> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_class(class))
    }

    pub fn find_class_mut(&mut self, class: &str) -> Option<&mut DomNode> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_class_mut(class))
    }
}

pub fn walk_path<'a>(root: &'a DomNode, path: &[usize]) -> Option<&'a DomNode> {
    let mut current = root;
    for &idx in path {
        current = current.children.get(idx)?;
    }
    Some(current)
}

pub fn walk_path_mut<'a>(root: &'a mut DomNode, path: &[usize]) -> Option<&'a mut DomNode> {
    let mut current = root;
    for &idx in path {
        if idx >= current.children.len() {
            return None;
        }
        current = &mut current.children[idx];
    }
    Some(current)
}

fn find_path(
    node: &DomNode,
    current: &mut Vec<usize>,
    pred: &dyn Fn(&DomNode) -> bool,
) -> Option<Vec<usize>> {
    if pred(node) {
        return Some(current.clone());
    }
    for (i, child) in node.children.iter().enumerate() {
        current.push(i);
        if let Some(found) = find_path(child, current, pred) {
            return Some(found);
        }
        current.pop();
    }
    None
}

fn collect_frame_paths(node: &DomNode, current: &mut Vec<usize>, out: &mut Vec<NodePath>) {
    if node.is_frame() {
        out.push(NodePath(current.clone()));
    }
    for (i, child) in node.children.iter().enumerate() {
        current.push(i);
        collect_frame_paths(child, current, out);
        current.pop();
    }
}

/// Remove every element carrying `class`, returning the ids of removed nodes.
fn remove_matching(node: &mut DomNode, class: &str, removed: &mut Vec<String>) {
    node.children.retain(|c| {
        if c.has_class(class) {
            removed.push(c.attr("id").unwrap_or_default().to_string());
            false
        } else {
            true
        }
    });
    for child in &mut node.children {
        remove_matching(child, class, removed);
    }
}

/// A host document: its node tree, where it was loaded from and how it
/// is currently scrolled.
#[derive(Debug, Clone)]
pub struct Document {
    pub root: DomNode,
    pub url: String,
    pub title: String,
    pub viewport: Viewport,
    origin: String,
    top_layer: Vec<String>,
    last_scroll: Option<ScrollBehavior>,
}

impl Document {
    /// Wrap an already laid-out tree. The origin is derived from `url`.
    pub fn new(root: DomNode, url: &str, viewport: Viewport) -> Self {
        let origin = serialize_origin(url).unwrap_or_else(|| "null".to_string());
        Self::with_origin(root, url, origin, viewport)
    }

    /// Documents such as `about:srcdoc` inherit the origin of their embedder.
    pub fn with_origin(root: DomNode, url: &str, origin: String, viewport: Viewport) -> Self {
        Self {
            root,
            url: url.to_string(),
            title: String::new(),
            viewport,
            origin,
            top_layer: Vec::new(),
            last_scroll: None,
        }
    }

    /// Parse and lay out `html` loaded from `url`.
    pub fn from_html(html: &str, url: &str, viewport: Viewport) -> Self {
        parser::parse_document(html, url, viewport)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn node(&self, path: &NodePath) -> Option<&DomNode> {
        walk_path(&self.root, path.as_slice())
    }

    pub fn node_mut(&mut self, path: &NodePath) -> Option<&mut DomNode> {
        walk_path_mut(&mut self.root, path.as_slice())
    }

    /// Every `<iframe>` in document order. Does not descend into nested
    /// documents.
    pub fn frames(&self) -> Vec<NodePath> {
        let mut out = Vec::new();
        collect_frame_paths(&self.root, &mut Vec::new(), &mut out);
        out
    }

    pub fn body_path(&self) -> Option<NodePath> {
        find_path(&self.root, &mut Vec::new(), &|n| {
            n.node_type == NodeType::Element && n.tag == "body"
        })
        .map(NodePath)
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodePath> {
        find_path(&self.root, &mut Vec::new(), &|n| n.attr("id") == Some(id)).map(NodePath)
    }

    pub fn element_by_id(&self, id: &str) -> Option<&DomNode> {
        let path = self.find_by_id(id)?;
        self.node(&path)
    }

    pub fn element_by_id_mut(&mut self, id: &str) -> Option<&mut DomNode> {
        let path = self.find_by_id(id)?;
        self.node_mut(&path)
    }

    /// Elements anywhere in the tree carrying `class`.
    pub fn count_class(&self, class: &str) -> usize {
        fn count(node: &DomNode, class: &str) -> usize {
            usize::from(node.has_class(class))
                + node.children.iter().map(|c| count(c, class)).sum::<usize>()
        }
        count(&self.root, class)
    }

    /// Viewport-relative box of a node, like `getBoundingClientRect`.
    pub fn bounding_client_rect(&self, path: &NodePath) -> Option<Rect> {
        let node = self.node(path)?;
        Some(
            node.bounds
                .translate(-self.viewport.scroll_x, -self.viewport.scroll_y),
        )
    }

    /// The nested document of the frame at `path`, but only when this
    /// document is allowed to script it.
    pub fn accessible_content_document(&self, path: &NodePath) -> Option<&Document> {
        let frame = self.node(path)?;
        if !frame.is_frame() {
            return None;
        }
        let nested = frame.content_document.as_deref()?;
        same_origin(nested.origin(), self.origin()).then_some(nested)
    }

    /// Attach a loaded document to the frame at `path`.
    pub fn attach_content_document(&mut self, path: &NodePath, document: Document) -> bool {
        match self.node_mut(path) {
            Some(frame) if frame.is_frame() => {
                frame.content_document = Some(Box::new(document));
                true
            }
            _ => false,
        }
    }

    /// Append `node` as the last child of `<body>`. Returns `false` when the
    /// document has no body.
    pub fn append_to_body(&mut self, node: DomNode) -> bool {
        let Some(path) = self.body_path() else {
            return false;
        };
        match self.node_mut(&path) {
            Some(body) => {
                body.children.push(node);
                true
            }
            None => false,
        }
    }

    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let Some(path) = self.find_by_id(id) else {
            return false;
        };
        let Some((&last, parent)) = path.as_slice().split_last() else {
            return false;
        };
        let Some(parent) = walk_path_mut(&mut self.root, parent) else {
            return false;
        };
        parent.children.remove(last);
        self.hide_popover(id);
        true
    }

    /// Remove every element carrying `class`. Returns how many were removed.
    pub fn remove_by_class(&mut self, class: &str) -> usize {
        let mut removed = Vec::new();
        remove_matching(&mut self.root, class, &mut removed);
        for id in &removed {
            self.hide_popover(id);
        }
        removed.len()
    }

    /// Promote an element with a `popover` attribute into the top layer.
    pub fn show_popover(&mut self, id: &str) -> bool {
        let is_popover = self
            .element_by_id(id)
            .map(|n| n.attr("popover").is_some())
            .unwrap_or(false);
        if !is_popover {
            return false;
        }
        if !self.top_layer.iter().any(|t| t == id) {
            self.top_layer.push(id.to_string());
        }
        true
    }

    pub fn hide_popover(&mut self, id: &str) {
        self.top_layer.retain(|t| t != id);
    }

    /// Ids of shown popovers, bottom-most first.
    pub fn top_layer(&self) -> &[String] {
        &self.top_layer
    }

    /// Scroll the viewport the minimum amount needed to reveal the element.
    pub fn scroll_into_view(&mut self, id: &str, behavior: ScrollBehavior) -> bool {
        let Some(bounds) = self.element_by_id(id).map(|n| n.bounds) else {
            return false;
        };
        let vp = &mut self.viewport;
        if bounds.y < vp.scroll_y {
            vp.scroll_y = bounds.y.max(0.0);
        } else if bounds.bottom() > vp.scroll_y + vp.height {
            vp.scroll_y = (bounds.bottom() - vp.height).min(bounds.y).max(0.0);
        }
        if bounds.x < vp.scroll_x {
            vp.scroll_x = bounds.x.max(0.0);
        } else if bounds.x + bounds.width > vp.scroll_x + vp.width {
            vp.scroll_x = (bounds.x + bounds.width - vp.width).min(bounds.x).max(0.0);
        }
        self.last_scroll = Some(behavior);
        true
    }

    pub fn last_scroll_behavior(&self) -> Option<ScrollBehavior> {
        self.last_scroll
    }
}
