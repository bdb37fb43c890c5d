//! Configuration for document serialization

/// Class of the element that holds the background and all blocks.
///
/// Fixed, since stored documents are located and scaled by this class.
pub const CONTAINER_CLASS: &str = "certificate-container";

/// Configuration options for serialized documents
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentConfig {
    /// Content of the `<title>` element
    pub title: String,

    /// Whether to format output with indentation
    pub pretty_print: bool,

    /// Class given to every positioned block
    pub element_class: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            title: "Certificate Template".to_string(),
            pretty_print: true,
            element_class: "certificate-element".to_string(),
        }
    }
}

impl DocumentConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set whether to pretty-print output
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }
}
