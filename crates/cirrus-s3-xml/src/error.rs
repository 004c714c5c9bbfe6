//! XML streaming error types.

/// Errors that can occur while streaming an XML document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An error from the underlying quick-xml parser.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error decoding or unescaping text content.
    #[error("failed to parse XML text: {0}")]
    ParseError(String),

    /// The element path grew past its fixed bound.
    #[error("element path exceeds {max} bytes")]
    PathTooLong {
        /// The path bound that was exceeded.
        max: usize,
    },
}
