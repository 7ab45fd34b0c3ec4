//! Sample codec
//!
//! # Binary layout (after the resource header)
//! ```text
//! codec u8, medium u8, bit26 u8, bit25 u8
//! payload length u32, payload bytes
//! loop start u32, loop end u32, loop count u32
//! loop state count u32, state i16 * n
//! book order i32, book predictor count i32
//! book entry count u32, entry i16 * n
//! ```
//!
//! The XML form carries the same fields except the payload, which is written
//! to a companion raw artifact named by the `Path` attribute.

use super::parse_code;
use crate::error::{Error, Result};
use crate::model::enums::{codec_code, codec_label, medium_code, medium_label};
use crate::model::{AdpcmBook, AdpcmLoop, Sample};
use crate::resource::header::TEXT_FORMAT_VERSION;
use crate::resource::{
    BinaryReader, BinaryWriter, FieldSink, ResourceHeader, ResourceType, XmlElement, XmlSink,
};

pub const SAMPLE_ELEMENT: &str = "Sample";
pub const LOOP_ELEMENT: &str = "ADPCMLoop";
pub const PREDICTOR_ELEMENT: &str = "Predictor";
pub const BOOK_ELEMENT: &str = "ADPCMBook";
pub const BOOK_ENTRY_ELEMENT: &str = "Book";

/// Describe `sample` field by field; `raw_path` only shows up in text
pub fn write_fields(sample: &Sample, raw_path: &str, sink: &mut impl FieldSink) {
    sink.text_attr("Version", &TEXT_FORMAT_VERSION);
    sink.code("Codec", sample.codec, codec_label);
    sink.code("Medium", sample.medium, medium_label);
    sink.u8("bit26", sample.bit26 as u8);
    sink.u8("Relocated", sample.relocated as u8);

    sink.binary_u32(sample.data.len() as u32);
    sink.binary_bytes(&sample.data);

    let adpcm_loop = &sample.adpcm_loop;
    sink.begin(LOOP_ELEMENT);
    sink.u32("Start", adpcm_loop.start);
    sink.u32("End", adpcm_loop.end);
    // Same bits either way; text shows -1 rather than 4294967295
    sink.i32("Count", adpcm_loop.signed_count());
    sink.binary_u32(adpcm_loop.states.len() as u32);
    for &state in &adpcm_loop.states {
        sink.begin(PREDICTOR_ELEMENT);
        sink.i16("State", state);
        sink.end();
    }
    sink.end();

    let book = &sample.book;
    sink.begin(BOOK_ELEMENT);
    sink.i32("Order", book.order);
    sink.i32("Npredictors", book.npredictors);
    sink.binary_u32(book.books.len() as u32);
    for &page in &book.books {
        sink.begin(BOOK_ENTRY_ELEMENT);
        sink.i16("Page", page);
        sink.end();
    }
    sink.end();

    sink.text_attr("Size", &sample.data.len());
    sink.text_attr("Path", &raw_path);
}

/// Binary resource with the payload inline
pub fn encode_binary(sample: &Sample, version: u32) -> Vec<u8> {
    let mut writer = BinaryWriter::new();
    ResourceHeader::new(ResourceType::AudioSample, version).write(&mut writer);
    write_fields(sample, "", &mut writer);
    writer.into_bytes()
}

/// XML metadata pointing at the payload stored at `raw_path`
pub fn encode_xml(sample: &Sample, raw_path: &str) -> XmlElement {
    let mut sink = XmlSink::new(SAMPLE_ELEMENT);
    write_fields(sample, raw_path, &mut sink);
    sink.finish()
}

/// Read a binary sample resource back, checking tag and version
pub fn decode_binary(bytes: &[u8], version: u32) -> Result<Sample> {
    let mut reader = BinaryReader::new(bytes);
    ResourceHeader::expect(&mut reader, ResourceType::AudioSample, version)?;
    let sample = read_body(&mut reader)?;
    reader.finish()?;
    Ok(sample)
}

fn read_body(reader: &mut BinaryReader) -> Result<Sample> {
    let codec = reader.read_u8()?;
    let medium = reader.read_u8()?;
    let bit26 = reader.read_flag()?;
    let relocated = reader.read_flag()?;
    let data = reader.read_sized_bytes()?;

    let adpcm_loop = AdpcmLoop {
        start: reader.read_u32()?,
        end: reader.read_u32()?,
        count: reader.read_u32()?,
        states: reader.read_list(|r| r.read_i16())?,
    };
    let book = AdpcmBook {
        order: reader.read_i32()?,
        npredictors: reader.read_i32()?,
        books: reader.read_list(|r| r.read_i16())?,
    };

    Ok(Sample {
        codec,
        medium,
        bit26,
        relocated,
        data,
        adpcm_loop,
        book,
    })
}

/// Path of the raw payload artifact named by a sample's metadata
pub fn payload_path(root: &XmlElement) -> Result<&str> {
    root.expect_name(SAMPLE_ELEMENT)?;
    root.require("Path")
}

/// Rebuild a sample from its XML metadata and the payload it points at
pub fn decode_xml(root: &XmlElement, data: Vec<u8>) -> Result<Sample> {
    root.expect_name(SAMPLE_ELEMENT)?;

    let size: usize = root.parse("Size")?;
    if size != data.len() {
        return Err(Error::InvalidAttribute {
            element: root.name.clone(),
            attribute: "Size".to_string(),
            value: format!("{} (payload has {} bytes)", size, data.len()),
        });
    }

    let loop_element = root.child(LOOP_ELEMENT)?;
    let adpcm_loop = AdpcmLoop {
        start: loop_element.parse("Start")?,
        end: loop_element.parse("End")?,
        count: loop_element.parse::<i32>("Count")? as u32,
        states: loop_element
            .children_named(PREDICTOR_ELEMENT)
            .map(|p| p.parse("State"))
            .collect::<Result<_>>()?,
    };

    let book_element = root.child(BOOK_ELEMENT)?;
    let book = AdpcmBook {
        order: book_element.parse("Order")?,
        npredictors: book_element.parse("Npredictors")?,
        books: book_element
            .children_named(BOOK_ENTRY_ELEMENT)
            .map(|b| b.parse("Page"))
            .collect::<Result<_>>()?,
    };

    Ok(Sample {
        codec: parse_code(root, "Codec", "codec", codec_code)?,
        medium: parse_code(root, "Medium", "medium", medium_code)?,
        bit26: root.parse_flag("bit26")?,
        relocated: root.parse_flag("Relocated")?,
        data,
        adpcm_loop,
        book,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::header::RESOURCE_VERSION;

    fn looped_adpcm() -> Sample {
        Sample {
            codec: 0,
            medium: 0,
            bit26: false,
            relocated: true,
            data: (0..=255u8).rev().collect(),
            adpcm_loop: AdpcmLoop {
                start: 0x10,
                end: 0x3F0,
                count: u32::MAX,
                states: vec![-5, 0, 7, i16::MIN, i16::MAX, 3, 2, 1, 0, 0, 0, 0, 0, 0, 0, 9],
            },
            book: AdpcmBook {
                order: 2,
                npredictors: 2,
                books: (0..32).map(|i| (i * 97 - 1500) as i16).collect(),
            },
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let sample = looped_adpcm();
        let bytes = encode_binary(&sample, RESOURCE_VERSION);
        let decoded = decode_binary(&bytes, RESOURCE_VERSION).unwrap();
        assert_eq!(decoded, sample);
        assert_eq!(decoded.adpcm_loop.signed_count(), -1);
    }

    #[test]
    fn test_binary_field_offsets() {
        let sample = looped_adpcm();
        let bytes = encode_binary(&sample, RESOURCE_VERSION);
        assert_eq!(&bytes[0..4], &ResourceType::AudioSample.tag().to_le_bytes());
        assert_eq!(&bytes[4..8], &RESOURCE_VERSION.to_le_bytes());
        assert_eq!(&bytes[8..12], &[0, 0, 0, 1]);
        assert_eq!(&bytes[12..16], &256u32.to_le_bytes());
        assert_eq!(&bytes[16..272], sample.data.as_slice());
        // loop start, end, count
        assert_eq!(&bytes[272..276], &0x10u32.to_le_bytes());
        assert_eq!(&bytes[276..280], &0x3F0u32.to_le_bytes());
        assert_eq!(&bytes[280..284], &[0xFF; 4]);
        assert_eq!(&bytes[284..288], &16u32.to_le_bytes());
        let expected_len = 288 + 16 * 2 + 4 + 4 + 4 + 32 * 2;
        assert_eq!(bytes.len(), expected_len);
    }

    #[test]
    fn test_empty_sample() {
        let sample = Sample {
            codec: 5,
            medium: 2,
            ..Sample::default()
        };
        let bytes = encode_binary(&sample, RESOURCE_VERSION);
        assert_eq!(decode_binary(&bytes, RESOURCE_VERSION).unwrap(), sample);
    }

    #[test]
    fn test_truncated_binary() {
        let bytes = encode_binary(&looped_adpcm(), RESOURCE_VERSION);
        assert!(decode_binary(&bytes[..bytes.len() - 1], RESOURCE_VERSION).is_err());
    }

    #[test]
    fn test_xml_attributes() {
        let sample = looped_adpcm();
        let root = encode_xml(&sample, "audio/samples/Strings_RAW");
        let names: Vec<&str> = root.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            names,
            vec!["Version", "Codec", "Medium", "bit26", "Relocated", "Size", "Path"]
        );
        assert_eq!(root.attribute("Codec"), Some("ADPCM"));
        assert_eq!(root.attribute("Medium"), Some("Ram"));
        assert_eq!(root.attribute("Relocated"), Some("1"));
        assert_eq!(root.attribute("Size"), Some("256"));

        let adpcm_loop = root.child(LOOP_ELEMENT).unwrap();
        assert_eq!(adpcm_loop.attribute("Count"), Some("-1"));
        assert_eq!(adpcm_loop.children.len(), 16);
        assert_eq!(adpcm_loop.children[3].attribute("State"), Some("-32768"));

        let book = root.child(BOOK_ELEMENT).unwrap();
        assert_eq!(book.attribute("Npredictors"), Some("2"));
        assert_eq!(book.children_named(BOOK_ENTRY_ELEMENT).count(), 32);
    }

    #[test]
    fn test_xml_round_trip() {
        let sample = looped_adpcm();
        let root = encode_xml(&sample, "audio/samples/Strings_RAW");
        let parsed = XmlElement::parse_document(&root.to_bytes().unwrap()).unwrap();
        assert_eq!(payload_path(&parsed).unwrap(), "audio/samples/Strings_RAW");
        let decoded = decode_xml(&parsed, sample.data.clone()).unwrap();
        assert_eq!(decoded, sample);
    }

    #[test]
    fn test_unmapped_codec_renders_error() {
        let sample = Sample {
            codec: 9,
            medium: 4,
            ..Sample::default()
        };
        let root = encode_xml(&sample, "x_RAW");
        assert_eq!(root.attribute("Codec"), Some("ERROR"));
        assert_eq!(root.attribute("Medium"), Some("ERROR"));
        assert!(matches!(
            decode_xml(&root, Vec::new()),
            Err(Error::UnknownLabel { .. })
        ));

        let bytes = encode_binary(&sample, RESOURCE_VERSION);
        assert_eq!(&bytes[8..10], &[9, 4]);
    }

    #[test]
    fn test_xml_size_mismatch() {
        let sample = looped_adpcm();
        let root = encode_xml(&sample, "x_RAW");
        assert!(decode_xml(&root, vec![0; 3]).is_err());
    }
}
