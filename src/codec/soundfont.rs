//! Soundfont codec
//!
//! Sample references are already resolved to metadata paths here, so a
//! soundfont artifact names its samples without carrying their data.
//!
//! # Binary layout (after the resource header)
//! ```text
//! table index u32, medium u8, cache policy u8, data1..3 u32
//! drum count u32, instrument count u32, sfx count u32
//! drums:       release u8, pan u8, loaded u8, envelope,
//!              presence u8, sample reference string, tuning f32
//! instruments: valid u8, loaded u8, range lo u8, range hi u8, release u8,
//!              envelope, low slot, normal slot, high slot
//! sfx:         slot
//! ```

use super::envelope::{envelope_from_xml, read_envelope, write_envelope};
use super::sound::{read_slot, slot_from_xml, write_slot};
use super::{check_count, parse_code};
use crate::error::Result;
use crate::model::enums::{cache_policy_code, cache_policy_label, medium_code, medium_label};
use crate::model::{Drum, Instrument, SoundFont};
use crate::resource::header::TEXT_FORMAT_VERSION;
use crate::resource::{
    BinaryReader, BinaryWriter, FieldSink, ResourceHeader, ResourceType, XmlElement, XmlSink,
};
use serde::Serialize;

pub const SOUNDFONT_ELEMENT: &str = "SoundFont";
pub const DRUMS_ELEMENT: &str = "Drums";
pub const DRUM_ELEMENT: &str = "Drum";
pub const INSTRUMENTS_ELEMENT: &str = "Instruments";
pub const INSTRUMENT_ELEMENT: &str = "Instrument";
pub const SFX_TABLE_ELEMENT: &str = "SfxTable";
pub const SFX_ELEMENT: &str = "Sfx";

/// Instrument slot elements, in encoding order
pub const LOW_NOTES_ELEMENT: &str = "LowNotesSound";
pub const NORMAL_NOTES_ELEMENT: &str = "NormalNotesSound";
pub const HIGH_NOTES_ELEMENT: &str = "HighNotesSound";

/// A decoded soundfont resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoundFontResource {
    pub index: u32,
    #[serde(flatten)]
    pub font: SoundFont<String>,
}

/// Describe `font` field by field
pub fn write_fields(index: u32, font: &SoundFont<String>, sink: &mut impl FieldSink) {
    sink.text_attr("Version", &TEXT_FORMAT_VERSION);
    sink.u32("Num", index);
    sink.code("Medium", font.medium, medium_label);
    sink.code("CachePolicy", font.cache_policy, cache_policy_label);
    sink.u32("Data1", font.data1);
    sink.u32("Data2", font.data2);
    sink.u32("Data3", font.data3);

    // Binary puts all three counts up front; text puts each on its container
    sink.binary_u32(font.drums.len() as u32);
    sink.binary_u32(font.instruments.len() as u32);
    sink.binary_u32(font.sound_effects.len() as u32);

    sink.begin(DRUMS_ELEMENT);
    sink.text_attr("Count", &font.drums.len());
    for drum in &font.drums {
        write_drum(drum, sink);
    }
    sink.end();

    sink.begin(INSTRUMENTS_ELEMENT);
    sink.text_attr("Count", &font.instruments.len());
    for instrument in &font.instruments {
        write_instrument(instrument, sink);
    }
    sink.end();

    sink.begin(SFX_TABLE_ELEMENT);
    sink.text_attr("Count", &font.sound_effects.len());
    for sfx in &font.sound_effects {
        write_slot(sfx.as_ref(), SFX_ELEMENT, sink);
    }
    sink.end();
}

fn write_drum(drum: &Drum<String>, sink: &mut impl FieldSink) {
    sink.begin(DRUM_ELEMENT);
    sink.u8("ReleaseRate", drum.release_rate);
    sink.u8("Pan", drum.pan);
    sink.u8("Loaded", drum.loaded as u8);
    write_envelope(&drum.envelope, sink);
    // Drums always carry a reference and tuning, the reference empty when unbound
    sink.binary_u8(drum.sample.is_some() as u8);
    sink.string("SampleRef", drum.sample.as_deref().unwrap_or_default());
    sink.f32("Tuning", drum.tuning);
    sink.end();
}

fn write_instrument(instrument: &Instrument<String>, sink: &mut impl FieldSink) {
    sink.begin(INSTRUMENT_ELEMENT);
    sink.flag("IsValid", instrument.is_valid);
    sink.u8("Loaded", instrument.loaded as u8);
    sink.u8("NormalRangeLo", instrument.normal_range_lo);
    sink.u8("NormalRangeHi", instrument.normal_range_hi);
    sink.u8("ReleaseRate", instrument.release_rate);
    write_envelope(&instrument.envelope, sink);
    write_slot(instrument.low_notes.as_ref(), LOW_NOTES_ELEMENT, sink);
    write_slot(instrument.normal_notes.as_ref(), NORMAL_NOTES_ELEMENT, sink);
    write_slot(instrument.high_notes.as_ref(), HIGH_NOTES_ELEMENT, sink);
    sink.end();
}

/// Binary soundfont resource
pub fn encode_binary(index: u32, font: &SoundFont<String>, version: u32) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    ResourceHeader::new(ResourceType::AudioSoundFont, version).write(&mut writer);
    write_fields(index, font, &mut writer);
    writer.into_bytes()
}

/// XML soundfont document
pub fn encode_xml(index: u32, font: &SoundFont<String>) -> XmlElement {
    let mut sink = XmlSink::new(SOUNDFONT_ELEMENT);
    write_fields(index, font, &mut sink);
    sink.finish()
}

/// Read a binary soundfont resource back, checking tag and version
pub fn decode_binary(bytes: &[u8], version: u32) -> Result<SoundFontResource> {
    let mut reader = BinaryReader::new(bytes);
    ResourceHeader::expect(&mut reader, ResourceType::AudioSoundFont, version)?;

    let index = reader.read_u32()?;
    let medium = reader.read_u8()?;
    let cache_policy = reader.read_u8()?;
    let data1 = reader.read_u32()?;
    let data2 = reader.read_u32()?;
    let data3 = reader.read_u32()?;

    let drum_count = reader.read_u32()?;
    let instrument_count = reader.read_u32()?;
    let sfx_count = reader.read_u32()?;

    let drums = reader.read_items(drum_count, read_drum)?;
    let instruments = reader.read_items(instrument_count, read_instrument)?;
    let sound_effects = reader.read_items(sfx_count, read_slot)?;
    reader.finish()?;

    Ok(SoundFontResource {
        index,
        font: SoundFont {
            medium,
            cache_policy,
            data1,
            data2,
            data3,
            drums,
            instruments,
            sound_effects,
        },
    })
}

fn read_drum(reader: &mut BinaryReader) -> Result<Drum<String>> {
    let release_rate = reader.read_u8()?;
    let pan = reader.read_u8()?;
    let loaded = reader.read_flag()?;
    let envelope = read_envelope(reader)?;
    let present = reader.read_flag()?;
    let reference = reader.read_string()?;
    let tuning = reader.read_f32()?;
    Ok(Drum {
        release_rate,
        pan,
        loaded,
        sample: present.then_some(reference),
        tuning,
        envelope,
    })
}

fn read_instrument(reader: &mut BinaryReader) -> Result<Instrument<String>> {
    Ok(Instrument {
        is_valid: reader.read_flag()?,
        loaded: reader.read_flag()?,
        normal_range_lo: reader.read_u8()?,
        normal_range_hi: reader.read_u8()?,
        release_rate: reader.read_u8()?,
        envelope: read_envelope(reader)?,
        low_notes: read_slot(reader)?,
        normal_notes: read_slot(reader)?,
        high_notes: read_slot(reader)?,
    })
}

/// Rebuild a soundfont from its XML document
pub fn decode_xml(root: &XmlElement) -> Result<SoundFontResource> {
    root.expect_name(SOUNDFONT_ELEMENT)?;

    let drums_element = root.child(DRUMS_ELEMENT)?;
    let drums = drums_element
        .children_named(DRUM_ELEMENT)
        .map(drum_from_xml)
        .collect::<Result<Vec<_>>>()?;
    check_count(drums_element, drums.len())?;

    let instruments_element = root.child(INSTRUMENTS_ELEMENT)?;
    let instruments = instruments_element
        .children_named(INSTRUMENT_ELEMENT)
        .map(instrument_from_xml)
        .collect::<Result<Vec<_>>>()?;
    check_count(instruments_element, instruments.len())?;

    let sfx_element = root.child(SFX_TABLE_ELEMENT)?;
    let sound_effects = sfx_element
        .children_named(SFX_ELEMENT)
        .map(slot_from_xml)
        .collect::<Result<Vec<_>>>()?;
    check_count(sfx_element, sound_effects.len())?;

    Ok(SoundFontResource {
        index: root.parse("Num")?,
        font: SoundFont {
            medium: parse_code(root, "Medium", "medium", medium_code)?,
            cache_policy: parse_code(root, "CachePolicy", "cache policy", cache_policy_code)?,
            data1: root.parse("Data1")?,
            data2: root.parse("Data2")?,
            data3: root.parse("Data3")?,
            drums,
            instruments,
            sound_effects,
        },
    })
}

fn drum_from_xml(element: &XmlElement) -> Result<Drum<String>> {
    let reference = element.require("SampleRef")?;
    Ok(Drum {
        release_rate: element.parse("ReleaseRate")?,
        pan: element.parse("Pan")?,
        loaded: element.parse_flag("Loaded")?,
        sample: (!reference.is_empty()).then(|| reference.to_string()),
        tuning: element.parse("Tuning")?,
        envelope: envelope_from_xml(element)?,
    })
}

fn instrument_from_xml(element: &XmlElement) -> Result<Instrument<String>> {
    Ok(Instrument {
        is_valid: element.parse_flag("IsValid")?,
        loaded: element.parse_flag("Loaded")?,
        normal_range_lo: element.parse("NormalRangeLo")?,
        normal_range_hi: element.parse("NormalRangeHi")?,
        release_rate: element.parse("ReleaseRate")?,
        envelope: envelope_from_xml(element)?,
        low_notes: slot_from_xml(element.child(LOW_NOTES_ELEMENT)?)?,
        normal_notes: slot_from_xml(element.child(NORMAL_NOTES_ELEMENT)?)?,
        high_notes: slot_from_xml(element.child(HIGH_NOTES_ELEMENT)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Envelope, Sound};
    use crate::resource::header::RESOURCE_VERSION;

    fn sound(name: &str, tuning: f32) -> Option<Sound<String>> {
        Some(Sound {
            sample: format!("audio/samples/{}_META", name),
            tuning,
        })
    }

    fn font() -> SoundFont<String> {
        let mut env = Envelope::new();
        env.push(1, 32700);
        env.push(-1, 0);

        SoundFont {
            medium: 2,
            cache_policy: 2,
            data1: 0x0100_0000,
            data2: 0x0004_0012,
            data3: 0,
            drums: vec![
                Drum {
                    release_rate: 10,
                    pan: 64,
                    loaded: true,
                    sample: Some("audio/samples/Snare_META".to_string()),
                    tuning: 1.0,
                    envelope: env.clone(),
                },
                Drum {
                    release_rate: 0,
                    pan: 0,
                    loaded: false,
                    sample: None,
                    tuning: 0.0,
                    envelope: Envelope::new(),
                },
            ],
            instruments: vec![Instrument {
                is_valid: true,
                loaded: false,
                normal_range_lo: 40,
                normal_range_hi: 72,
                release_rate: 208,
                envelope: env,
                low_notes: sound("Bass Low", 2.0),
                normal_notes: sound("Bass", 1.0),
                high_notes: None,
            }],
            sound_effects: vec![None, sound("Door", 0.75), None],
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let font = font();
        let bytes = encode_binary(7, &font, RESOURCE_VERSION);
        let decoded = decode_binary(&bytes, RESOURCE_VERSION).unwrap();
        assert_eq!(decoded.index, 7);
        assert_eq!(decoded.font, font);
    }

    #[test]
    fn test_binary_prefix() {
        let bytes = encode_binary(3, &font(), RESOURCE_VERSION);
        assert_eq!(&bytes[8..12], &3u32.to_le_bytes());
        assert_eq!(bytes[12], 2);
        assert_eq!(bytes[13], 2);
        // drum / instrument / sfx counts follow the data words
        assert_eq!(&bytes[26..30], &2u32.to_le_bytes());
        assert_eq!(&bytes[30..34], &1u32.to_le_bytes());
        assert_eq!(&bytes[34..38], &3u32.to_le_bytes());
        // first drum: release, pan, loaded, envelope count
        assert_eq!(&bytes[38..41], &[10, 64, 1]);
        assert_eq!(&bytes[41..45], &2u32.to_le_bytes());
    }

    #[test]
    fn test_unbound_drum_still_writes_reference() {
        let mut font = font();
        font.drums.remove(0);
        font.instruments.clear();
        font.sound_effects.clear();
        let bytes = encode_binary(0, &font, RESOURCE_VERSION);
        // release, pan, loaded, empty envelope, presence 0, empty string, tuning
        let drum = &bytes[38..];
        assert_eq!(drum.len(), 3 + 4 + 1 + 4 + 4);
        assert_eq!(drum[7], 0);
    }

    #[test]
    fn test_xml_layout() {
        let root = encode_xml(5, &font());
        assert_eq!(root.attribute("Version"), Some("0"));
        assert_eq!(root.attribute("Num"), Some("5"));
        assert_eq!(root.attribute("Medium"), Some("Cart"));
        assert_eq!(root.attribute("CachePolicy"), Some("Either"));
        assert_eq!(root.attribute("Data1"), Some("16777216"));

        let names: Vec<&str> = root.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Drums", "Instruments", "SfxTable"]);

        let drum = &root.child(DRUMS_ELEMENT).unwrap().children[0];
        let attrs: Vec<&str> = drum.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(attrs, vec!["ReleaseRate", "Pan", "Loaded", "SampleRef", "Tuning"]);
        let unbound = &root.child(DRUMS_ELEMENT).unwrap().children[1];
        assert_eq!(unbound.attribute("SampleRef"), Some(""));

        let instrument = &root.child(INSTRUMENTS_ELEMENT).unwrap().children[0];
        assert_eq!(instrument.attribute("IsValid"), Some("true"));
        let slots: Vec<&str> = instrument.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            slots,
            vec!["Envelopes", "LowNotesSound", "NormalNotesSound", "HighNotesSound"]
        );
        assert!(instrument.children[3].attributes.is_empty());

        let sfx = root.child(SFX_TABLE_ELEMENT).unwrap();
        assert_eq!(sfx.attribute("Count"), Some("3"));
        assert_eq!(sfx.children.len(), 3);
    }

    #[test]
    fn test_xml_round_trip() {
        let font = font();
        let text = encode_xml(9, &font).to_bytes().unwrap();
        let decoded = decode_xml(&XmlElement::parse_document(&text).unwrap()).unwrap();
        assert_eq!(decoded.index, 9);
        assert_eq!(decoded.font, font);
    }

    #[test]
    fn test_binary_and_xml_agree() {
        let font = font();
        let from_binary = decode_binary(&encode_binary(1, &font, RESOURCE_VERSION), RESOURCE_VERSION)
            .unwrap();
        let from_xml = decode_xml(&encode_xml(1, &font)).unwrap();
        assert_eq!(from_binary, from_xml);
    }

    #[test]
    fn test_wrong_resource_rejected() {
        let bytes = crate::codec::sample::encode_binary(&Default::default(), RESOURCE_VERSION);
        assert!(decode_binary(&bytes, RESOURCE_VERSION).is_err());
    }
}
