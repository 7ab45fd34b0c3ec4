//! Sound slot codec
//!
//! Binary: presence byte; when present, a legacy byte that is always 1, the
//! sample reference string and the tuning. Text: the element is always
//! written, with `SampleRef` and `Tuning` only when a sound is bound.

use crate::error::Result;
use crate::model::Sound;
use crate::resource::{BinaryReader, FieldSink, XmlElement};

/// Second byte of a present slot. Carries no information, but readers of the
/// v2 layout expect it.
pub const LEGACY_SLOT_MARKER: u8 = 1;

/// Write one slot as `element`, present or not
pub fn write_slot(slot: Option<&Sound<String>>, element: &str, sink: &mut impl FieldSink) {
    sink.begin(element);
    match slot {
        Some(sound) => {
            sink.binary_u8(1);
            sink.binary_u8(LEGACY_SLOT_MARKER);
            sink.string("SampleRef", &sound.sample);
            sink.f32("Tuning", sound.tuning);
        }
        None => sink.binary_u8(0),
    }
    sink.end();
}

/// Read a binary slot, skipping the legacy byte
pub fn read_slot(reader: &mut BinaryReader) -> Result<Option<Sound<String>>> {
    if !reader.read_flag()? {
        return Ok(None);
    }
    let _legacy = reader.read_u8()?;
    Ok(Some(Sound {
        sample: reader.read_string()?,
        tuning: reader.read_f32()?,
    }))
}

/// A slot element without `SampleRef` is empty
pub fn slot_from_xml(element: &XmlElement) -> Result<Option<Sound<String>>> {
    match element.attribute("SampleRef") {
        Some(sample) => Ok(Some(Sound {
            sample: sample.to_string(),
            tuning: element.parse("Tuning")?,
        })),
        None => Ok(None),
    }
}
