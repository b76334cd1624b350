//! Structured text as delivered by the content API.

use serde::{Deserialize, Serialize};

/// A structured text field: an ordered list of blocks (paragraphs,
/// headings, list items, embedded images).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<RichTextBlock>);

/// A single block of a rich text field.
///
/// Formatting spans and embed data are not needed for plain-text rendering
/// and are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichTextBlock {
    /// Block type (e.g. `paragraph`, `heading1`, `image`)
    #[serde(rename = "type")]
    pub kind: String,

    /// Text content; absent for non-text blocks such as images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RichText {
    /// Rich text consisting of a single paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self(vec![RichTextBlock {
            kind: "paragraph".to_string(),
            text: Some(text.into()),
        }])
    }

    /// Render as plain text, joining blocks with a single space.
    ///
    /// Blocks without text still take part in the join as empty strings.
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .map(|block| block.text.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the field has no blocks at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_text_joins_blocks() {
        let json = r#"[
            {"type": "heading1", "text": "Cricket Tacos", "spans": []},
            {"type": "paragraph", "text": "Crunchy and nutty.", "spans": [{"start": 0, "end": 7, "type": "strong"}]}
        ]"#;
        let rich: RichText = serde_json::from_str(json).unwrap();
        assert_eq!(rich.as_text(), "Cricket Tacos Crunchy and nutty.");
    }

    #[test]
    fn test_as_text_empty() {
        assert_eq!(RichText::default().as_text(), "");
        assert!(RichText::default().is_empty());
    }

    #[test]
    fn test_blocks_without_text_render_empty() {
        let json = r#"[
            {"type": "paragraph", "text": "before"},
            {"type": "image", "url": "https://images.example.com/a.png"},
            {"type": "paragraph", "text": "after"}
        ]"#;
        let rich: RichText = serde_json::from_str(json).unwrap();
        assert_eq!(rich.as_text(), "before  after");
    }

    #[test]
    fn test_malformed_rich_text_is_rejected() {
        let result: Result<RichText, _> = serde_json::from_str(r#""just a string""#);
        assert!(result.is_err());
    }
}
