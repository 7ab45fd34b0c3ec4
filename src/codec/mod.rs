//! Resource codecs
//!
//! Each codec writes its fields once through a [`FieldSink`] and offers a
//! binary and an XML decoder for the result.
//!
//! [`FieldSink`]: crate::resource::FieldSink

pub mod envelope;
pub mod json;
pub mod sample;
pub mod sequence;
pub mod sound;
pub mod soundfont;

pub use sequence::SequenceResource;
pub use soundfont::SoundFontResource;

use crate::error::{Error, Result};
use crate::resource::XmlElement;

/// Read a labelled enum attribute back into its code
pub(crate) fn parse_code(
    element: &XmlElement,
    attribute: &str,
    kind: &'static str,
    lookup: fn(&str) -> Option<u8>,
) -> Result<u8> {
    let label = element.require(attribute)?;
    lookup(label).ok_or_else(|| Error::UnknownLabel {
        kind,
        label: label.to_string(),
    })
}

/// Check a container's `Count` attribute against the children found
pub(crate) fn check_count(container: &XmlElement, found: usize) -> Result<()> {
    let count: usize = container.parse("Count")?;
    if count == found {
        Ok(())
    } else {
        Err(container.invalid("Count", &count.to_string()))
    }
}
