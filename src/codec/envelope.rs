//! Envelope codec
//!
//! Binary: point count u32, then `(delay i16, arg i16)` per point.
//! Text: `<Envelopes Count="n">` holding one `<Envelope Delay Arg/>` per point.

use super::check_count;
use crate::error::Result;
use crate::model::{Envelope, EnvelopePoint};
use crate::resource::{BinaryReader, FieldSink, XmlElement};

pub const ENVELOPES_ELEMENT: &str = "Envelopes";
pub const POINT_ELEMENT: &str = "Envelope";

/// Write the `Envelopes` container with one entry per point
pub fn write_envelope(envelope: &Envelope, sink: &mut impl FieldSink) {
    sink.begin(ENVELOPES_ELEMENT);
    sink.u32("Count", envelope.len() as u32);
    for point in envelope.points() {
        sink.begin(POINT_ELEMENT);
        sink.i16("Delay", point.delay);
        sink.i16("Arg", point.arg);
        sink.end();
    }
    sink.end();
}

/// Read a count-prefixed point list
pub fn read_envelope(reader: &mut BinaryReader) -> Result<Envelope> {
    let points = reader.read_list(|r| {
        Ok(EnvelopePoint {
            delay: r.read_i16()?,
            arg: r.read_i16()?,
        })
    })?;
    Ok(points.into_iter().collect())
}

/// Read the `Envelopes` child of `parent`
pub fn envelope_from_xml(parent: &XmlElement) -> Result<Envelope> {
    let container = parent.child(ENVELOPES_ELEMENT)?;
    let envelope = container
        .children_named(POINT_ELEMENT)
        .map(|p| -> Result<EnvelopePoint> {
            Ok(EnvelopePoint {
                delay: p.parse("Delay")?,
                arg: p.parse("Arg")?,
            })
        })
        .collect::<Result<Envelope>>()?;
    check_count(container, envelope.len())?;
    Ok(envelope)
}
