//! JSON view of decoded binary resources

use super::{sample, sequence, soundfont, SequenceResource, SoundFontResource};
use crate::error::Result;
use crate::model::enums::{cache_policy_label, codec_label, medium_label};
use crate::model::Sample;
use crate::resource::{BinaryReader, ResourceHeader, ResourceType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Top-level JSON structure for one binary resource
#[derive(Debug, Clone, Serialize)]
pub struct ResourceJson {
    /// Resource type name (e.g., "AudioSample")
    pub resource: &'static str,
    /// Type tag as hex
    pub tag: String,
    pub version: u32,
    /// Text labels of the enum codes in the body
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<&'static str, &'static str>,
    #[serde(flatten)]
    pub body: ResourceBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceBody {
    Audio,
    Sample(Sample),
    SoundFont(SoundFontResource),
    Sequence(SequenceResource),
}

/// Decode any binary resource, dispatching on its header tag
pub fn decode_resource(bytes: &[u8]) -> Result<ResourceJson> {
    let mut reader = BinaryReader::new(bytes);
    let header = ResourceHeader::read(&mut reader)?;
    let version = header.version;

    let mut labels = BTreeMap::new();
    let body = match header.resource_type {
        ResourceType::Audio => {
            reader.finish()?;
            ResourceBody::Audio
        }
        ResourceType::AudioSample => {
            let decoded = sample::decode_binary(bytes, version)?;
            labels.insert("codec", codec_label(decoded.codec));
            labels.insert("medium", medium_label(decoded.medium));
            ResourceBody::Sample(decoded)
        }
        ResourceType::AudioSoundFont => {
            let decoded = soundfont::decode_binary(bytes, version)?;
            labels.insert("medium", medium_label(decoded.font.medium));
            labels.insert("cache_policy", cache_policy_label(decoded.font.cache_policy));
            ResourceBody::SoundFont(decoded)
        }
        ResourceType::AudioSequence => {
            let decoded = sequence::decode_binary(bytes, version)?;
            labels.insert("medium", medium_label(decoded.sequence.medium));
            labels.insert(
                "cache_policy",
                cache_policy_label(decoded.sequence.cache_policy),
            );
            ResourceBody::Sequence(decoded)
        }
    };

    Ok(ResourceJson {
        resource: header.resource_type.name(),
        tag: format!("{:#010X}", header.resource_type.tag()),
        version,
        labels,
        body,
    })
}
