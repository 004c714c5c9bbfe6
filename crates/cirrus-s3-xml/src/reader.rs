//! Streaming path-based XML reader.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::XmlError;

/// Maximum length in bytes of a slash-joined element path.
pub const MAX_ELEMENT_PATH_LEN: usize = 512;

/// One event from a [`PathReader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathEvent {
    /// A chunk of leaf text inside the element at `path`.
    ///
    /// The text for one element may arrive over multiple `Text` events;
    /// consumers must accumulate across chunks.
    Text {
        /// Slash-joined path of the enclosing element.
        path: String,
        /// Entity-unescaped text chunk.
        text: String,
    },
    /// The element at `path` has just closed.
    Close {
        /// Slash-joined path of the element that closed.
        path: String,
    },
}

/// A pull-based XML reader that reports element paths instead of a tree.
///
/// Element paths are the slash-joined chain of element names from the
/// document root; `<foo><bar>x</bar></foo>` delivers `x` at path
/// `foo/bar`. Inter-element whitespace is trimmed and never delivered.
#[derive(Debug)]
pub struct PathReader<'a> {
    reader: Reader<&'a [u8]>,
    path: String,
    // Path length before each open element was appended, for truncation on close.
    segment_marks: Vec<usize>,
}

impl<'a> PathReader<'a> {
    /// Creates a reader over a complete XML document.
    #[must_use]
    pub fn new(xml: &'a str) -> Self {
        let mut reader = Reader::from_reader(xml.as_bytes());
        reader.config_mut().trim_text(true);
        Self {
            reader,
            path: String::new(),
            segment_marks: Vec::new(),
        }
    }

    /// Returns the next path event, or `Ok(None)` at end of document.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError`] if the document is malformed, text cannot be
    /// decoded, or an element path exceeds [`MAX_ELEMENT_PATH_LEN`].
    pub fn next_event(&mut self) -> Result<Option<PathEvent>, XmlError> {
        loop {
            match self.reader.read_event()? {
                Event::Start(e) => {
                    self.push_segment(e.name().as_ref())?;
                }
                Event::Empty(e) => {
                    // A self-closing element opens and closes in one event;
                    // only the close is observable to consumers.
                    self.push_segment(e.name().as_ref())?;
                    let path = self.path.clone();
                    self.pop_segment();
                    return Ok(Some(PathEvent::Close { path }));
                }
                Event::End(_) => {
                    let path = self.path.clone();
                    self.pop_segment();
                    return Ok(Some(PathEvent::Close { path }));
                }
                Event::Text(e) => {
                    let decoded = e
                        .decode()
                        .map_err(|err| XmlError::ParseError(err.to_string()))?;
                    let text = quick_xml::escape::unescape(&decoded)
                        .map_err(|err| XmlError::ParseError(err.to_string()))?
                        .into_owned();
                    return Ok(Some(PathEvent::Text {
                        path: self.path.clone(),
                        text,
                    }));
                }
                Event::CData(e) => {
                    let bytes = e.into_inner();
                    let text = std::str::from_utf8(&bytes)
                        .map_err(|err| XmlError::ParseError(err.to_string()))?
                        .to_owned();
                    return Ok(Some(PathEvent::Text {
                        path: self.path.clone(),
                        text,
                    }));
                }
                Event::GeneralRef(e) => {
                    let text = if let Some(ch) = e
                        .resolve_char_ref()
                        .map_err(|err| XmlError::ParseError(err.to_string()))?
                    {
                        ch.to_string()
                    } else {
                        let name = e
                            .decode()
                            .map_err(|err| XmlError::ParseError(err.to_string()))?;
                        match name.as_ref() {
                            "amp" => "&".to_owned(),
                            "lt" => "<".to_owned(),
                            "gt" => ">".to_owned(),
                            "apos" => "'".to_owned(),
                            "quot" => "\"".to_owned(),
                            other => {
                                return Err(XmlError::ParseError(format!(
                                    "unknown entity reference: &{other};"
                                )));
                            }
                        }
                    };
                    return Ok(Some(PathEvent::Text {
                        path: self.path.clone(),
                        text,
                    }));
                }
                Event::Eof => return Ok(None),
                // Declaration, comments, processing instructions, doctype.
                _ => {}
            }
        }
    }

    fn push_segment(&mut self, name: &[u8]) -> Result<(), XmlError> {
        let name = std::str::from_utf8(name)
            .map_err(|err| XmlError::ParseError(err.to_string()))?;
        self.segment_marks.push(self.path.len());
        if !self.path.is_empty() {
            self.path.push('/');
        }
        self.path.push_str(name);
        if self.path.len() > MAX_ELEMENT_PATH_LEN {
            return Err(XmlError::PathTooLong {
                max: MAX_ELEMENT_PATH_LEN,
            });
        }
        Ok(())
    }

    fn pop_segment(&mut self) {
        if let Some(mark) = self.segment_marks.pop() {
            self.path.truncate(mark);
        }
    }
}
