//! Resource header shared by every binary artifact
//!
//! # Layout
//! ```text
//! 0x00: resource type tag u32 LE
//! 0x04: format version    u32 LE
//! 0x08: body
//! ```

use super::binary::{BinaryReader, BinaryWriter};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Format version of every audio resource in this revision
pub const RESOURCE_VERSION: u32 = 2;

/// `Version` attribute written on XML root elements
pub const TEXT_FORMAT_VERSION: u32 = 0;

/// Header size in bytes
pub const HEADER_SIZE: usize = 8;

/// Resource kinds and their type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum ResourceType {
    /// "OAUD"
    Audio = 0x4F41_5544,
    /// "OSMP"
    AudioSample = 0x4F53_4D50,
    /// "OSFT"
    AudioSoundFont = 0x4F53_4654,
    /// "OSEQ"
    AudioSequence = 0x4F53_4551,
}

impl ResourceType {
    /// Four-character type tag as stored in the header
    pub fn tag(&self) -> u32 {
        *self as u32
    }

    /// Look up a resource type by its tag
    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::all().find(|t| t.tag() == tag)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::AudioSample => "AudioSample",
            Self::AudioSoundFont => "AudioSoundFont",
            Self::AudioSequence => "AudioSequence",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Audio,
            Self::AudioSample,
            Self::AudioSoundFont,
            Self::AudioSequence,
        ]
        .into_iter()
    }
}

/// Version written for each resource kind during one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceVersions {
    versions: BTreeMap<ResourceType, u32>,
}

impl ResourceVersions {
    /// Version written for `resource`
    pub fn get(&self, resource: ResourceType) -> u32 {
        self.versions
            .get(&resource)
            .copied()
            .unwrap_or(RESOURCE_VERSION)
    }

    pub fn set(&mut self, resource: ResourceType, version: u32) {
        self.versions.insert(resource, version);
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self {
            versions: ResourceType::all().map(|t| (t, RESOURCE_VERSION)).collect(),
        }
    }
}

/// Parsed resource header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceHeader {
    pub resource_type: ResourceType,
    pub version: u32,
}

impl ResourceHeader {
    pub fn new(resource_type: ResourceType, version: u32) -> Self {
        Self {
            resource_type,
            version,
        }
    }

    /// Write the header; every binary encoder starts with this
    pub fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.resource_type.tag());
        writer.write_u32(self.version);
    }

    /// Read a header of any known resource type
    pub fn read(reader: &mut BinaryReader) -> Result<Self> {
        let pos = reader.position();
        let tag = reader.read_u32()?;
        let resource_type = ResourceType::from_tag(tag).ok_or_else(|| Error::Decode {
            pos,
            message: format!("unknown resource tag {:#010X}", tag),
        })?;
        let version = reader.read_u32()?;
        Ok(Self {
            resource_type,
            version,
        })
    }

    /// Read a header and check it matches `expected` at `version`
    pub fn expect(reader: &mut BinaryReader, expected: ResourceType, version: u32) -> Result<()> {
        let tag = reader.read_u32()?;
        if tag != expected.tag() {
            return Err(Error::ResourceMismatch {
                expected: expected.name(),
                found: tag,
            });
        }
        let found = reader.read_u32()?;
        if found != version {
            return Err(Error::UnsupportedVersion {
                resource: expected.name(),
                version: found,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_spell_ascii() {
        assert_eq!(&ResourceType::AudioSample.tag().to_be_bytes(), b"OSMP");
        assert_eq!(&ResourceType::AudioSoundFont.tag().to_be_bytes(), b"OSFT");
        assert_eq!(&ResourceType::AudioSequence.tag().to_be_bytes(), b"OSEQ");
        assert_eq!(&ResourceType::Audio.tag().to_be_bytes(), b"OAUD");
    }

    #[test]
    fn test_header_layout() {
        let mut writer = BinaryWriter::new();
        ResourceHeader::new(ResourceType::AudioSequence, RESOURCE_VERSION).write(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..4], &0x4F53_4551u32.to_le_bytes());
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());

        let mut reader = BinaryReader::new(&bytes);
        let header = ResourceHeader::read(&mut reader).unwrap();
        assert_eq!(header.resource_type, ResourceType::AudioSequence);
        assert_eq!(header.version, 2);
    }

    #[test]
    fn test_expect_rejects_mismatch() {
        let mut writer = BinaryWriter::new();
        ResourceHeader::new(ResourceType::AudioSample, 2).write(&mut writer);
        let bytes = writer.into_bytes();

        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            ResourceHeader::expect(&mut reader, ResourceType::AudioSoundFont, 2),
            Err(Error::ResourceMismatch { .. })
        ));

        let mut reader = BinaryReader::new(&bytes);
        assert!(matches!(
            ResourceHeader::expect(&mut reader, ResourceType::AudioSample, 3),
            Err(Error::UnsupportedVersion { version: 2, .. })
        ));
    }

    #[test]
    fn test_versions_default_and_override() {
        let mut versions = ResourceVersions::default();
        assert_eq!(versions.get(ResourceType::AudioSoundFont), 2);
        versions.set(ResourceType::AudioSoundFont, 3);
        assert_eq!(versions.get(ResourceType::AudioSoundFont), 3);
        assert_eq!(versions.get(ResourceType::AudioSample), 2);
    }
}
