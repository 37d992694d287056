//! Common part model used in both requests and responses.

use serde::{Deserialize, Serialize};

/// A single piece of content exchanged with the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    /// A text part containing a string value
    Text {
        /// The text content of the part
        text: String,
    },
    /// A part containing inline data
    InlineData {
        /// The inline data content of the part
        #[serde(alias = "inlineData")]
        inline_data: InlineData,
    },
    /// A part referencing a file previously uploaded through the Files API
    FileData {
        /// The file reference
        #[serde(alias = "fileData")]
        file_data: FileData,
    },
    /// Any part kind this crate does not model (function calls, executable code, ...)
    Other(serde_json::Value),
}

impl Part {
    /// Creates a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Creates an inline data part from already base64-encoded bytes.
    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            },
        }
    }

    /// Creates a part referencing an uploaded file by URI.
    pub fn file_data(mime_type: impl Into<String>, file_uri: impl Into<String>) -> Self {
        Self::FileData {
            file_data: FileData {
                mime_type: mime_type.into(),
                file_uri: file_uri.into(),
            },
        }
    }

    /// Returns the text of this part, if it is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A part containing inline data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineData {
    /// The MIME type of the inline data
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    /// The base64-encoded inline data content
    pub data: String,
}

/// A reference to a file stored by the Files API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    /// The MIME type of the referenced file
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    /// The URI returned when the file was uploaded
    #[serde(alias = "fileUri")]
    pub file_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn inline_data_uses_rest_field_names() {
        let part = Part::inline_data("application/pdf", "JVBERi0=");
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({ "inline_data": { "mime_type": "application/pdf", "data": "JVBERi0=" } })
        );
    }

    #[test]
    fn file_data_uses_rest_field_names() {
        let part = Part::file_data("image/png", "https://example.test/files/abc");
        assert_eq!(
            serde_json::to_value(&part).unwrap(),
            json!({ "file_data": { "mime_type": "image/png", "file_uri": "https://example.test/files/abc" } })
        );
    }

    #[test]
    fn camel_case_response_parts_deserialize() {
        let part: Part = serde_json::from_value(json!({
            "inlineData": { "mimeType": "audio/mp3", "data": "AAAA" }
        }))
        .unwrap();
        assert_eq!(part, Part::inline_data("audio/mp3", "AAAA"));
    }

    #[test]
    fn unknown_parts_are_preserved() {
        let raw = json!({ "functionCall": { "name": "lookup", "args": {} } });
        let part: Part = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(part, Part::Other(raw));
        assert_eq!(part.as_text(), None);
    }
}
