//! Atlassian Document Format, the rich-text representation Jira uses for
//! custom text fields.
//!
//! Only the node shapes this tool writes are modeled. Everything else is kept
//! as [`Node::Opaque`] so a read-modify-write cycle never loses content.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u64,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(default)]
    pub content: Vec<Node>,
    /// Top-level keys other than the three above, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A document node. Shapes that do not match a typed variant exactly are
/// stored as `Opaque` and serialized back byte-for-byte equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Node {
    Paragraph(Vec<Node>),
    Text(String),
    /// A text node carrying a single link mark.
    Link { text: String, href: String },
    Opaque(Value),
}

impl Document {
    pub fn empty() -> Self {
        Document {
            version: 1,
            doc_type: "doc".to_string(),
            content: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Interpret a raw field value. Absent, null or unparsable content becomes
    /// an empty document instead of an error.
    pub fn from_field(value: Option<&Value>) -> Self {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return Self::empty();
        };

        match serde_json::from_value::<Document>(value.clone()) {
            Ok(doc) if doc.doc_type == "doc" => doc,
            Ok(doc) => {
                warn!(doc_type = %doc.doc_type, "rich-text field is not a document, starting empty");
                Self::empty()
            }
            Err(err) => {
                warn!(error = %err, "could not parse rich-text field, starting empty");
                Self::empty()
            }
        }
    }

    /// Append a paragraph pointing readers at the PR description.
    pub fn with_solution_note(mut self, pr_url: &str) -> Self {
        self.content.push(solution_paragraph(pr_url));
        self
    }
}

/// `See <pr_url>'s description`, with the URL rendered as a link.
pub fn solution_paragraph(pr_url: &str) -> Node {
    Node::Paragraph(vec![
        Node::Text("See ".to_string()),
        Node::Link {
            text: pr_url.to_string(),
            href: pr_url.to_string(),
        },
        Node::Text("'s description".to_string()),
    ])
}

fn has_exact_keys(object: &Map<String, Value>, keys: &[&str]) -> bool {
    object.len() == keys.len() && keys.iter().all(|key| object.contains_key(*key))
}

/// `[{"type":"link","attrs":{"href":..}}]` and nothing more.
fn single_link_href(marks: &Value) -> Option<&str> {
    let [mark] = marks.as_array()?.as_slice() else {
        return None;
    };
    let mark = mark.as_object()?;
    if !has_exact_keys(mark, &["type", "attrs"]) || mark.get("type")? != "link" {
        return None;
    }
    let attrs = mark.get("attrs")?.as_object()?;
    if !has_exact_keys(attrs, &["href"]) {
        return None;
    }
    attrs.get("href")?.as_str()
}

fn classify(value: &Value) -> Option<Node> {
    let object = value.as_object()?;
    match object.get("type")?.as_str()? {
        "paragraph" if has_exact_keys(object, &["type", "content"]) => {
            let children = object.get("content")?.as_array()?;
            Some(Node::Paragraph(
                children.iter().cloned().map(Node::from).collect(),
            ))
        }
        "text" if has_exact_keys(object, &["type", "text"]) => {
            Some(Node::Text(object.get("text")?.as_str()?.to_string()))
        }
        "text" if has_exact_keys(object, &["type", "text", "marks"]) => Some(Node::Link {
            text: object.get("text")?.as_str()?.to_string(),
            href: single_link_href(object.get("marks")?)?.to_string(),
        }),
        _ => None,
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        classify(&value).unwrap_or(Node::Opaque(value))
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        match node {
            Node::Paragraph(children) => json!({
                "type": "paragraph",
                "content": children.into_iter().map(Value::from).collect::<Vec<_>>(),
            }),
            Node::Text(text) => json!({ "type": "text", "text": text }),
            Node::Link { text, href } => json!({
                "type": "text",
                "text": text,
                "marks": [{ "type": "link", "attrs": { "href": href } }],
            }),
            Node::Opaque(value) => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PR: &str = "https://github.com/acme/widget/pull/42";

    fn note_json(url: &str) -> Value {
        json!({
            "type": "paragraph",
            "content": [
                { "type": "text", "text": "See " },
                { "type": "text", "text": url, "marks": [{ "type": "link", "attrs": { "href": url } }] },
                { "type": "text", "text": "'s description" }
            ]
        })
    }

    #[test]
    fn test_missing_or_null_field_is_empty() {
        assert_eq!(Document::from_field(None), Document::empty());
        assert_eq!(Document::from_field(Some(&Value::Null)), Document::empty());
    }

    #[test]
    fn test_unparsable_field_is_empty() {
        assert_eq!(
            Document::from_field(Some(&json!("plain text"))),
            Document::empty()
        );
        assert_eq!(
            Document::from_field(Some(&json!({ "type": "doc" }))),
            Document::empty()
        );
        assert_eq!(
            Document::from_field(Some(&json!({ "version": 1, "type": "table", "content": [] }))),
            Document::empty()
        );
    }

    #[test]
    fn test_append_to_empty_document() {
        let doc = Document::empty().with_solution_note(PR);
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({ "version": 1, "type": "doc", "content": [note_json(PR)] })
        );
    }

    #[test]
    fn test_unknown_nodes_round_trip() {
        let original = json!({
            "version": 1,
            "type": "doc",
            "content": [
                { "type": "heading", "attrs": { "level": 2 }, "content": [{ "type": "text", "text": "Notes" }] },
                { "type": "paragraph", "content": [
                    { "type": "text", "text": "bold", "marks": [{ "type": "strong" }] },
                    { "type": "mention", "attrs": { "id": "abc" } },
                    { "type": "text", "text": "plain" }
                ] },
                { "type": "paragraph", "attrs": { "localId": "p1" }, "content": [] },
                { "type": "paragraph" }
            ]
        });

        let doc = Document::from_field(Some(&original));
        assert_eq!(doc.content.len(), 4);
        assert!(matches!(doc.content[0], Node::Opaque(_)));
        assert!(matches!(doc.content[1], Node::Paragraph(_)));
        assert!(matches!(doc.content[2], Node::Opaque(_)));
        assert_eq!(serde_json::to_value(&doc).unwrap(), original);
    }

    #[test]
    fn test_extra_top_level_keys_round_trip() {
        let original = json!({ "version": 1, "type": "doc", "content": [], "attrs": { "x": 1 } });
        let doc = Document::from_field(Some(&original));
        assert_eq!(serde_json::to_value(&doc).unwrap(), original);
    }

    #[test]
    fn test_link_with_extra_attrs_stays_opaque() {
        let node = Node::from(json!({
            "type": "text",
            "text": "x",
            "marks": [{ "type": "link", "attrs": { "href": "h", "title": "t" } }]
        }));
        assert!(matches!(node, Node::Opaque(_)));
    }

    #[test]
    fn test_appends_preserve_order() {
        let existing = json!({
            "version": 1,
            "type": "doc",
            "content": [{ "type": "rule" }, { "type": "paragraph", "content": [{ "type": "text", "text": "old" }] }]
        });

        let a = "https://github.com/acme/widget/pull/1";
        let b = "https://github.com/acme/widget/pull/2";
        let doc = Document::from_field(Some(&existing))
            .with_solution_note(a)
            .with_solution_note(b);

        let value = serde_json::to_value(&doc).unwrap();
        let content = value["content"].as_array().unwrap();
        assert_eq!(content.len(), 4);
        assert_eq!(content[0], existing["content"][0]);
        assert_eq!(content[1], existing["content"][1]);
        assert_eq!(content[2], note_json(a));
        assert_eq!(content[3], note_json(b));
    }

    #[test]
    fn test_appended_note_parses_back_as_typed_nodes() {
        let doc = Document::empty().with_solution_note(PR);
        let value = serde_json::to_value(&doc).unwrap();
        let reparsed = Document::from_field(Some(&value));
        assert_eq!(reparsed.content, vec![solution_paragraph(PR)]);
    }
}
