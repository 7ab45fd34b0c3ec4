use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Decode error at byte {pos}: {message}")]
    Decode { pos: usize, message: String },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Expected {expected} resource, found tag {found:#010X}")]
    ResourceMismatch { expected: &'static str, found: u32 },

    #[error("Unsupported {resource} version {version}")]
    UnsupportedVersion { resource: &'static str, version: u32 },

    #[error("<{element}> is missing attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    #[error("<{element}> has invalid {attribute}=\"{value}\"")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("Expected <{expected}> element, found <{found}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("Unknown {kind} label: {label}")]
    UnknownLabel { kind: &'static str, label: String },

    #[error("Sample reference bank {bank_id} offset {offset:#010X} is not in the sample pool")]
    DanglingSample { bank_id: u32, offset: u32 },

    #[error("Sequence index {0} does not fit the one-byte index field")]
    SequenceIndexOverflow(usize),

    #[error("Artifact path '{0}' must be relative with no '.' or '..' segments")]
    InvalidArtifactPath(String),

    #[error("Artifact '{0}' emitted twice")]
    DuplicateArtifact(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
