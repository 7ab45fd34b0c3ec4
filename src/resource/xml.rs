//! Minimal XML element tree for the text resource format
//!
//! Attribute order is kept as inserted, since it is part of what tooling
//! diffs against. Reading and writing go through `quick-xml`.

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::str::FromStr;

/// An element with ordered attributes and child elements
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

fn xml_error(e: impl Display) -> Error {
    Error::Xml(e.to_string())
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing an earlier value of the same name
    pub fn set_attribute(&mut self, name: &str, value: impl Display) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Attribute value, if set
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute that must be present
    pub fn require(&self, name: &str) -> Result<&str> {
        self.attribute(name).ok_or_else(|| Error::MissingAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
        })
    }

    /// Parse a required attribute
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T> {
        let value = self.require(name)?;
        value.parse().map_err(|_| self.invalid(name, value))
    }

    /// Parse a numeric attribute as a 0/1 flag
    pub fn parse_flag(&self, name: &str) -> Result<bool> {
        match self.require(name)? {
            "true" => Ok(true),
            "false" => Ok(false),
            value => value
                .parse::<u8>()
                .map(|v| v != 0)
                .map_err(|_| self.invalid(name, value)),
        }
    }

    pub fn invalid(&self, name: &str, value: &str) -> Error {
        Error::InvalidAttribute {
            element: self.name.clone(),
            attribute: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// First child with the given name
    pub fn child(&self, name: &str) -> Result<&XmlElement> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| Error::UnexpectedElement {
                expected: name.to_string(),
                found: format!("no such child of <{}>", self.name),
            })
    }

    /// Direct children with the given element name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Fail unless this element is called `name`
    pub fn expect_name(&self, name: &str) -> Result<()> {
        if self.name == name {
            Ok(())
        } else {
            Err(Error::UnexpectedElement {
                expected: name.to_string(),
                found: self.name.clone(),
            })
        }
    }

    /// Serialize as an indented document with no declaration
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        self.write_to(&mut writer)?;
        Ok(writer.into_inner())
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start)).map_err(xml_error)?;
        } else {
            writer.write_event(Event::Start(start)).map_err(xml_error)?;
            for child in &self.children {
                child.write_to(writer)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(self.name.as_str())))
                .map_err(xml_error)?;
        }
        Ok(())
    }

    /// Parse a document and return its root element
    pub fn parse_document(bytes: &[u8]) -> Result<XmlElement> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            let finished = match reader.read_event_into(&mut buf).map_err(xml_error)? {
                Event::Start(e) => {
                    stack.push(Self::from_start(&e)?);
                    None
                }
                Event::Empty(e) => Self::attach(&mut stack, Self::from_start(&e)?),
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unbalanced end tag".into()))?;
                    Self::attach(&mut stack, element)
                }
                Event::Eof => return Err(Error::Xml("document has no complete root element".into())),
                _ => None,
            };
            if let Some(root) = finished {
                return Ok(root);
            }
            buf.clear();
        }
    }

    /// Add to the open parent, or hand back the finished root
    fn attach(stack: &mut [XmlElement], element: XmlElement) -> Option<XmlElement> {
        match stack.last_mut() {
            Some(parent) => {
                parent.children.push(element);
                None
            }
            None => Some(element),
        }
    }

    fn from_start(start: &BytesStart) -> Result<XmlElement> {
        let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
        for attr in start.attributes() {
            let attr = attr.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            element.attributes.push((key, value));
        }
        Ok(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> XmlElement {
        let mut root = XmlElement::new("SoundFont");
        root.set_attribute("Version", 0);
        root.set_attribute("Medium", "Cart");
        let mut drums = XmlElement::new("Drums");
        drums.set_attribute("Count", 1);
        let mut drum = XmlElement::new("Drum");
        drum.set_attribute("SampleRef", "audio/samples/Snare & Kick_META");
        drum.set_attribute("Tuning", 1.5f32);
        drums.push(drum);
        root.push(drums);
        root
    }

    #[test]
    fn test_write_shape() {
        let text = String::from_utf8(sample_tree().to_bytes().unwrap()).unwrap();
        assert!(text.starts_with("<SoundFont Version=\"0\" Medium=\"Cart\">"));
        assert!(text.contains("<Drums Count=\"1\">"));
        assert!(text.contains("Snare &amp; Kick"));
        assert!(text.contains("Tuning=\"1.5\"/>"));
        assert!(text.trim_end().ends_with("</SoundFont>"));
    }

    #[test]
    fn test_parse_written_document() {
        let tree = sample_tree();
        let parsed = XmlElement::parse_document(&tree.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, tree);
        let drum = parsed.child("Drums").unwrap().child("Drum").unwrap();
        assert_eq!(
            drum.require("SampleRef").unwrap(),
            "audio/samples/Snare & Kick_META"
        );
        assert_eq!(drum.parse::<f32>("Tuning").unwrap(), 1.5);
    }

    #[test]
    fn test_attribute_errors() {
        let mut el = XmlElement::new("Drum");
        el.set_attribute("Pan", "left");
        assert!(matches!(el.parse::<u8>("Pan"), Err(Error::InvalidAttribute { .. })));
        assert!(matches!(el.require("Tuning"), Err(Error::MissingAttribute { .. })));
        assert!(el.expect_name("Instrument").is_err());
    }

    #[test]
    fn test_parse_flag_forms() {
        let mut el = XmlElement::new("Instrument");
        el.set_attribute("IsValid", true);
        el.set_attribute("Loaded", 0);
        assert!(el.parse_flag("IsValid").unwrap());
        assert!(!el.parse_flag("Loaded").unwrap());
    }

    #[test]
    fn test_unclosed_document() {
        assert!(XmlElement::parse_document(b"<Sample Version=\"0\">").is_err());
    }
}
