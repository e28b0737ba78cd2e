//! Error types for XODE parsing.

use thiserror::Error;

use crate::tree::NodeKind;

/// Errors that can occur while parsing an XODE document or querying the
/// resulting scene tree.
#[derive(Debug, Error)]
pub enum XodeError {
    /// The XML tokenizer rejected the document.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// The outermost element is not the expected root tag.
    #[error("root element must be <{expected}>, found <{found}>")]
    InvalidRoot {
        /// The configured root tag.
        expected: String,
        /// The tag that was found instead.
        found: String,
    },

    /// The document contains no root element at all.
    #[error("document has no <{0}> root element")]
    MissingRoot(String),

    /// An element appeared where its parent's grammar does not allow it.
    #[error("<{child}> is not a valid child of <{parent}>")]
    InvalidChild {
        /// The enclosing element.
        parent: String,
        /// The rejected child element.
        child: String,
    },

    /// Missing required attribute.
    #[error("missing required attribute: {attribute} on <{element}>")]
    MissingAttribute {
        /// The missing attribute name.
        attribute: &'static str,
        /// The element that should have the attribute.
        element: String,
    },

    /// Invalid attribute value.
    #[error("invalid value for {attribute} on <{element}>: {message}")]
    InvalidAttribute {
        /// The attribute with the invalid value.
        attribute: &'static str,
        /// The element containing the attribute.
        element: String,
        /// Description of why the value is invalid.
        message: String,
    },

    /// A joint link names something that has not been parsed yet.
    #[error("joint link '{0}' must reference an already parsed body")]
    UnresolvedLink(String),

    /// A joint link names a node that is not a body.
    #[error("joint link '{0}' must reference a body")]
    LinkNotBody(String),

    /// Both joint links resolved to the same object.
    #[error("joint requires two distinct objects")]
    IdenticalLinks,

    /// A `<joint>` closed without any joint type element.
    #[error("no joint type element found in <joint>")]
    MissingJointType,

    /// A `<geom>` violates its structural rules.
    #[error("invalid <geom>: {0}")]
    InvalidGeom(String),

    /// No node with the given name exists below the queried node.
    #[error("could not find child named '{0}'")]
    NameNotFound(String),

    /// No ancestor carries an engine object of the requested kind.
    #[error("no ancestor with a {0} object found")]
    AncestorNotFound(NodeKind),

    /// Element nesting exceeded the configured limit.
    #[error("element nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),

    /// The sentinel handler was asked to pop itself.
    #[error("handler stack underflow")]
    StackUnderflow,

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`XodeError`] values.
///
/// Several variants carry more detail than a document author needs; this
/// groups them into the failure kinds a caller usually branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed XML.
    Xml,
    /// Wrong, missing or repeated root element.
    Root,
    /// Element not permitted in its position.
    Child,
    /// Missing, malformed or out-of-range value, or a violated structural rule.
    InvalidValue,
    /// Capability-typed ancestor lookup failed.
    AncestorNotFound,
    /// Name lookup failed.
    NotFound,
    /// Parser misuse or resource limit.
    Internal,
    /// The document could not be read.
    Io,
}

impl XodeError {
    /// Create a missing attribute error.
    pub fn missing_attribute(attribute: &'static str, element: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute,
            element: element.into(),
        }
    }

    /// Create an invalid attribute error.
    pub fn invalid_attribute(
        attribute: &'static str,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            attribute,
            element: element.into(),
            message: message.into(),
        }
    }

    /// Create an invalid child error.
    pub fn invalid_child(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::InvalidChild {
            parent: parent.into(),
            child: child.into(),
        }
    }

    /// Create an invalid geom error.
    pub fn invalid_geom(message: impl Into<String>) -> Self {
        Self::InvalidGeom(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::XmlParse(_) => ErrorKind::Xml,
            Self::InvalidRoot { .. } | Self::MissingRoot(_) => ErrorKind::Root,
            Self::InvalidChild { .. } => ErrorKind::Child,
            Self::MissingAttribute { .. }
            | Self::InvalidAttribute { .. }
            | Self::UnresolvedLink(_)
            | Self::LinkNotBody(_)
            | Self::IdenticalLinks
            | Self::MissingJointType
            | Self::InvalidGeom(_) => ErrorKind::InvalidValue,
            Self::AncestorNotFound(_) => ErrorKind::AncestorNotFound,
            Self::NameNotFound(_) => ErrorKind::NotFound,
            Self::DepthExceeded(_) | Self::StackUnderflow => ErrorKind::Internal,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result type for XODE operations.
pub type Result<T> = std::result::Result<T, XodeError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_child_display() {
        let err = XodeError::invalid_child("xode", "test");
        assert!(err.to_string().contains("<test>"));
        assert!(err.to_string().contains("<xode>"));
        assert_eq!(err.kind(), ErrorKind::Child);
    }

    #[test]
    fn test_missing_attribute() {
        let err = XodeError::missing_attribute("y", "torque");
        assert!(err.to_string().contains("y"));
        assert!(err.to_string().contains("torque"));
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }

    #[test]
    fn test_link_failures_are_distinct_but_same_kind() {
        let unresolved = XodeError::UnresolvedLink("body2".into());
        let not_body = XodeError::LinkNotBody("space1".into());
        assert!(matches!(unresolved, XodeError::UnresolvedLink(_)));
        assert!(matches!(not_body, XodeError::LinkNotBody(_)));
        assert_eq!(unresolved.kind(), not_body.kind());
    }

    #[test]
    fn test_ancestor_not_found_display() {
        let err = XodeError::AncestorNotFound(NodeKind::Body);
        assert!(err.to_string().contains("body"));
        assert_eq!(err.kind(), ErrorKind::AncestorNotFound);
    }
}
