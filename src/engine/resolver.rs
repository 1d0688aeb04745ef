//! Frame resolution: from a selected origin to the frame elements of the
//! host document that paint it.

use crate::dom::{Document, NodePath};
use crate::origin::{matches, same_origin};

/// An inner frame found inside an outer frame's accessible document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedMatch {
    /// Declared source of the inner frame.
    pub source: String,
    /// Path of the inner frame within the outer frame's document.
    pub path: NodePath,
}

/// A frame element that corresponds to the selected origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFrame {
    /// The host document itself.
    MainDocument,
    /// An `<iframe>` of the host document. When the selected origin was
    /// found one level down, `nested` points at the real target while
    /// `path` stays on the outer frame, the only one paintable from here.
    Embedded {
        path: NodePath,
        nested: Option<NestedMatch>,
    },
}

impl ResolvedFrame {
    pub fn is_main(&self) -> bool {
        matches!(self, ResolvedFrame::MainDocument)
    }

    pub fn path(&self) -> Option<&NodePath> {
        match self {
            ResolvedFrame::MainDocument => None,
            ResolvedFrame::Embedded { path, .. } => Some(path),
        }
    }

    pub fn nested(&self) -> Option<&NestedMatch> {
        match self {
            ResolvedFrame::Embedded { nested, .. } => nested.as_ref(),
            ResolvedFrame::MainDocument => None,
        }
    }
}

/// All frames of `document` painting `selected_origin`, in document order.
pub fn resolve(document: &Document, selected_origin: &str) -> Vec<ResolvedFrame> {
    if selected_origin.is_empty() {
        return Vec::new();
    }

    if same_origin(selected_origin, document.origin()) {
        return vec![ResolvedFrame::MainDocument];
    }

    let mut resolved = Vec::new();
    for path in document.frames() {
        let Some(source) = document.node(&path).and_then(|f| f.attr("src")) else {
            continue;
        };
        if source.is_empty() {
            continue;
        }

        if matches(selected_origin, source) {
            resolved.push(ResolvedFrame::Embedded { path, nested: None });
        } else if let Some(nested) = nested_match(document, &path, selected_origin) {
            log::debug!(
                "{} found inside frame {} as {}",
                selected_origin,
                source,
                nested.source
            );
            resolved.push(ResolvedFrame::Embedded {
                path,
                nested: Some(nested),
            });
        }
    }

    log::debug!("resolved {} frame(s) for {}", resolved.len(), selected_origin);
    resolved
}

/// Look one level into the frame's document for a frame matching
/// `selected_origin`. Cross-origin frames yield `None`.
fn nested_match(document: &Document, path: &NodePath, selected_origin: &str) -> Option<NestedMatch> {
    let inner_doc = document.accessible_content_document(path)?;
    inner_doc.frames().into_iter().find_map(|inner| {
        let source = inner_doc.node(&inner)?.attr("src")?;
        (!source.is_empty() && matches(selected_origin, source)).then(|| NestedMatch {
            source: source.to_string(),
            path: inner,
        })
    })
}
