//! Markup output for nodes, used by the harness to print attached popovers.

use crate::dom::{DomNode, NodeType};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

pub fn to_html(node: &DomNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_node(node: &DomNode, out: &mut String) {
    match node.node_type {
        NodeType::Text => out.push_str(&escape(&node.text, false)),
        NodeType::Element => {
            out.push('<');
            out.push_str(&node.tag);
            // Sorted for stable output.
            let mut attrs: Vec<_> = node.attributes.iter().collect();
            attrs.sort();
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value, true));
                out.push('"');
            }
            out.push('>');
            if VOID_TAGS.contains(&node.tag.as_str()) {
                return;
            }
            for child in &node.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&node.tag);
            out.push('>');
        }
    }
}

fn escape(raw: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn writes_sorted_attributes_and_escapes() {
        let node = DomNode::element("p", HashMap::new(), vec![DomNode::text("a < b")])
            .with_attr("title", "\"q\"")
            .with_attr("class", "row");
        assert_eq!(
            to_html(&node),
            r#"<p class="row" title="&quot;q&quot;">a &lt; b</p>"#
        );
    }
}
