//! Sequence codec
//!
//! # Binary layout (after the resource header)
//! ```text
//! byte count u32, sequence bytes
//! sequence index u8, medium u8, cache policy u8
//! font index count u32, font index u8 * n
//! ```
//!
//! The XML form names a sibling raw artifact through `Path` instead of
//! carrying the bytes.

use super::parse_code;
use crate::error::{Error, Result};
use crate::model::enums::{cache_policy_code, cache_policy_label, medium_code, medium_label};
use crate::model::Sequence;
use crate::resource::{
    BinaryReader, BinaryWriter, FieldSink, ResourceHeader, ResourceType, XmlElement, XmlSink,
};
use serde::Serialize;

pub const SEQUENCE_ELEMENT: &str = "Sequence";
pub const FONT_INDICES_ELEMENT: &str = "FontIndicies";
pub const FONT_INDEX_ELEMENT: &str = "FontIndex";

/// A decoded sequence resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceResource {
    pub index: u8,
    #[serde(flatten)]
    pub sequence: Sequence,
}

/// Describe `sequence` field by field; `raw_path` only shows up in text
pub fn write_fields(index: u8, sequence: &Sequence, raw_path: &str, sink: &mut impl FieldSink) {
    sink.binary_u32(sequence.data.len() as u32);
    sink.binary_bytes(&sequence.data);

    sink.u8("Index", index);
    sink.code("Medium", sequence.medium, medium_label);
    sink.code("CachePolicy", sequence.cache_policy, cache_policy_label);
    sink.text_attr("Size", &sequence.data.len());
    sink.text_attr("Path", &raw_path);

    sink.binary_u32(sequence.font_indices.len() as u32);
    sink.begin(FONT_INDICES_ELEMENT);
    for &font in &sequence.font_indices {
        sink.begin(FONT_INDEX_ELEMENT);
        sink.u8("FontIdx", font);
        sink.end();
    }
    sink.end();
}

/// Binary resource with the payload inline
pub fn encode_binary(index: u8, sequence: &Sequence, version: u32) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    ResourceHeader::new(ResourceType::AudioSequence, version).write(&mut writer);
    write_fields(index, sequence, "", &mut writer);
    writer.into_bytes()
}

/// XML metadata pointing at the payload stored at `raw_path`
pub fn encode_xml(index: u8, sequence: &Sequence, raw_path: &str) -> XmlElement {
    let mut sink = XmlSink::new(SEQUENCE_ELEMENT);
    write_fields(index, sequence, raw_path, &mut sink);
    sink.finish()
}

/// Read a binary sequence resource back, checking tag and version
pub fn decode_binary(bytes: &[u8], version: u32) -> Result<SequenceResource> {
    let mut reader = BinaryReader::new(bytes);
    ResourceHeader::expect(&mut reader, ResourceType::AudioSequence, version)?;

    let data = reader.read_sized_bytes()?;
    let index = reader.read_u8()?;
    let medium = reader.read_u8()?;
    let cache_policy = reader.read_u8()?;
    let font_indices = reader.read_list(|r| r.read_u8())?;
    reader.finish()?;

    Ok(SequenceResource {
        index,
        sequence: Sequence {
            data,
            medium,
            cache_policy,
            font_indices,
        },
    })
}

/// Path of the raw sequence artifact named by the metadata
pub fn payload_path(root: &XmlElement) -> Result<&str> {
    root.expect_name(SEQUENCE_ELEMENT)?;
    root.require("Path")
}

/// Rebuild a sequence from its XML metadata and payload
pub fn decode_xml(root: &XmlElement, data: Vec<u8>) -> Result<SequenceResource> {
    root.expect_name(SEQUENCE_ELEMENT)?;

    let size: usize = root.parse("Size")?;
    if size != data.len() {
        return Err(Error::InvalidAttribute {
            element: root.name.clone(),
            attribute: "Size".to_string(),
            value: format!("{} (payload has {} bytes)", size, data.len()),
        });
    }

    let font_indices = root
        .child(FONT_INDICES_ELEMENT)?
        .children_named(FONT_INDEX_ELEMENT)
        .map(|f| f.parse("FontIdx"))
        .collect::<Result<_>>()?;

    Ok(SequenceResource {
        index: root.parse("Index")?,
        sequence: Sequence {
            data,
            medium: parse_code(root, "Medium", "medium", medium_code)?,
            cache_policy: parse_code(root, "CachePolicy", "cache policy", cache_policy_code)?,
            font_indices,
        },
    })
}
