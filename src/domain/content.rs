use serde::Deserialize;

use super::null_as_default;

fn default_block_kind() -> String {
    "block".to_string()
}

/// One rich-text block of a document body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Block {
    #[serde(rename = "_type", default = "default_block_kind")]
    pub kind: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Span>,
}

/// An inline run of text inside a block.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: default_block_kind(),
            style: Some("normal".into()),
            children: vec![Span { text: text.into() }],
        }
    }

    pub fn first_span_text(&self) -> Option<&str> {
        self.children.first().map(|s| s.text.as_str())
    }

    /// Concatenation of every span, in order.
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }
}
