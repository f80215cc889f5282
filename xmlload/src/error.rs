use thiserror::Error;

/// Everything that can go wrong turning raw XML text into a [`taci::dom::Element`]
/// tree: malformed XML syntax, or a tree shape the reader itself already rejects
/// (multiple document elements, a closing tag with nothing open to match it).
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed XML: {0}")]
    Malformed(String),
}

impl From<Error> for taci::Error {
    /// Any XML-level failure is a source-structure failure from the interpreter's
    /// point of view: the program text never made it to a well-formed element tree.
    fn from(err: Error) -> taci::Error {
        taci::Error::SourceStructure(err.to_string())
    }
}
