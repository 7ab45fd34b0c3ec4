pub mod binary;
pub mod header;
pub mod sink;
pub mod xml;

pub use binary::{BinaryReader, BinaryWriter};
pub use header::{ResourceHeader, ResourceType, ResourceVersions};
pub use sink::{FieldSink, XmlSink};
pub use xml::XmlElement;
