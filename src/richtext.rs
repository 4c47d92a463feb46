//! CMS "blocks" rich text: a tree of text leaves and typed element nodes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::markup;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RichTextNode {
    Text {
        text: String,
    },
    Element {
        #[serde(rename = "type")]
        kind: String,
        children: Vec<RichTextNode>,
        /// Everything else on the node (`url`, `level`, formatting flags, ...).
        #[serde(flatten)]
        attrs: Map<String, Value>,
    },
}

impl<'de> Deserialize<'de> for RichTextNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(value))
    }
}

impl RichTextNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn element(kind: impl Into<String>, children: Vec<RichTextNode>) -> Self {
        Self::Element {
            kind: kind.into(),
            children,
            attrs: Map::new(),
        }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::element("paragraph", vec![Self::text(text)])
    }

    /// Any object with a string `text` is a leaf; other objects are elements
    /// whose `children` are parsed recursively (non-arrays mean no children).
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text { text },
            Value::Object(mut obj) => {
                if matches!(obj.get("text"), Some(Value::String(_)))
                    && let Some(Value::String(text)) = obj.remove("text")
                {
                    return Self::Text { text };
                }
                let kind = match obj.remove("type") {
                    Some(Value::String(kind)) => kind,
                    _ => String::new(),
                };
                let children = match obj.remove("children") {
                    Some(Value::Array(items)) => items.into_iter().map(Self::from_value).collect(),
                    _ => Vec::new(),
                };
                Self::Element {
                    kind,
                    children,
                    attrs: obj,
                }
            }
            _ => Self::Text {
                text: String::new(),
            },
        }
    }

    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Element { children, .. } => children.iter().map(Self::plain_text).collect(),
        }
    }
}

/// Renders a block list; an empty list renders nothing.
pub fn render_html(nodes: &[RichTextNode]) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"rte\">");
    for node in nodes {
        render_node(node, &mut out);
    }
    out.push_str("</div>");
    out
}

fn render_node(node: &RichTextNode, out: &mut String) {
    match node {
        RichTextNode::Text { text } => out.push_str(&markup::escape(text)),
        RichTextNode::Element {
            kind,
            children,
            attrs,
        } => {
            let (open, close) = match kind.as_str() {
                "paragraph" => ("<p>".to_owned(), "</p>"),
                "heading" => ("<h3>".to_owned(), "</h3>"),
                "link" => {
                    let href = attrs.get("url").and_then(Value::as_str).unwrap_or("#");
                    (
                        format!(
                            "<a href=\"{}\" rel=\"noreferrer noopener\">",
                            markup::safe_href(href)
                        ),
                        "</a>",
                    )
                }
                _ => ("<span>".to_owned(), "</span>"),
            };
            out.push_str(&open);
            for child in children {
                render_node(child, out);
            }
            out.push_str(close);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(json: Value) -> Vec<RichTextNode> {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn renders_paragraphs_headings_and_fallback() {
        let blocks = nodes(serde_json::json!([
            { "type": "heading", "level": 2, "children": [ { "type": "text", "text": "Requisitos" } ] },
            { "type": "paragraph", "children": [
                { "text": "Ver " },
                { "type": "link", "url": "https://siu.uncoma.edu.ar", "children": [ { "text": "SIU" } ] }
            ] },
            { "type": "list", "format": "unordered", "children": [ { "text": "x < y" } ] }
        ]));

        let html = render_html(&blocks);
        assert_eq!(
            html,
            "<div class=\"rte\"><h3>Requisitos</h3>\
             <p>Ver <a href=\"https://siu.uncoma.edu.ar\" rel=\"noreferrer noopener\">SIU</a></p>\
             <span>x &lt; y</span></div>"
        );
    }

    #[test]
    fn keeps_extra_attributes_on_elements() {
        let blocks = nodes(serde_json::json!([
            { "type": "heading", "level": 2, "children": [] }
        ]));
        let RichTextNode::Element { kind, attrs, .. } = &blocks[0] else {
            panic!("expected element");
        };
        assert_eq!(kind, "heading");
        assert_eq!(attrs.get("level"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn malformed_children_do_not_fail_parsing() {
        let blocks = nodes(serde_json::json!([
            { "type": "paragraph", "children": "nope" },
            42
        ]));
        assert_eq!(render_html(&blocks), "<div class=\"rte\"><p></p></div>");
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert_eq!(render_html(&[]), "");
    }

    #[test]
    fn plain_text_concatenates_leaves() {
        let node = RichTextNode::element(
            "paragraph",
            vec![RichTextNode::text("Hola "), RichTextNode::paragraph("mundo")],
        );
        assert_eq!(node.plain_text(), "Hola mundo");
    }
}
