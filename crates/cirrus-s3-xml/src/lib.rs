//! Path-based streaming XML event source for the Cirrus S3 client.
//!
//! S3 response bodies are consumed as a stream of `(element path, text
//! chunk)` events rather than as a document tree, so decoders can run in
//! bounded memory no matter how large the document is. An element path is
//! the slash-joined chain of element names from the root, e.g.
//! `AccessControlPolicy/Owner/ID`; paths are case-sensitive and bounded to
//! [`MAX_ELEMENT_PATH_LEN`] bytes.
//!
//! Two kinds of event are delivered:
//!
//! - [`PathEvent::Text`] for each chunk of leaf text — text for one element
//!   may arrive over multiple events (for example across a CDATA boundary),
//!   so consumers must accumulate.
//! - [`PathEvent::Close`] when an element ends, carrying the path of the
//!   element that just closed.

mod error;
mod reader;

pub use error::XmlError;
pub use reader::{MAX_ELEMENT_PATH_LEN, PathEvent, PathReader};
