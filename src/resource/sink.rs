//! Field sinks: one ordered field list, two output formats
//!
//! Codecs describe a resource once, field by field, against [`FieldSink`].
//! [`BinaryWriter`] turns that into the packed binary body and [`XmlSink`]
//! into an element tree. Named fields appear in both formats; the `binary_*`
//! and `text_*` operations exist in only one of them.

use super::binary::BinaryWriter;
use super::xml::XmlElement;
use std::fmt::Display;

pub trait FieldSink {
    fn u8(&mut self, name: &str, value: u8);
    fn i16(&mut self, name: &str, value: i16);
    fn u32(&mut self, name: &str, value: u32);
    fn i32(&mut self, name: &str, value: i32);
    fn f32(&mut self, name: &str, value: f32);
    /// One byte in binary, `true`/`false` in text
    fn flag(&mut self, name: &str, value: bool);
    fn string(&mut self, name: &str, value: &str);
    /// Raw code in binary, mapped label in text
    fn code(&mut self, name: &str, code: u8, label: fn(u8) -> &'static str);

    /// Open a child element (text only)
    fn begin(&mut self, element: &str);
    /// Close the innermost open element (text only)
    fn end(&mut self);

    fn binary_u8(&mut self, value: u8);
    fn binary_u32(&mut self, value: u32);
    fn binary_bytes(&mut self, bytes: &[u8]);
    fn text_attr(&mut self, name: &str, value: &dyn Display);
}

impl FieldSink for BinaryWriter {
    fn u8(&mut self, _name: &str, value: u8) {
        self.write_u8(value);
    }

    fn i16(&mut self, _name: &str, value: i16) {
        self.write_i16(value);
    }

    fn u32(&mut self, _name: &str, value: u32) {
        self.write_u32(value);
    }

    fn i32(&mut self, _name: &str, value: i32) {
        self.write_i32(value);
    }

    fn f32(&mut self, _name: &str, value: f32) {
        self.write_f32(value);
    }

    fn flag(&mut self, _name: &str, value: bool) {
        self.write_u8(value as u8);
    }

    fn string(&mut self, _name: &str, value: &str) {
        self.write_string(value);
    }

    fn code(&mut self, _name: &str, code: u8, _label: fn(u8) -> &'static str) {
        self.write_u8(code);
    }

    fn begin(&mut self, _element: &str) {}

    fn end(&mut self) {}

    fn binary_u8(&mut self, value: u8) {
        self.write_u8(value);
    }

    fn binary_u32(&mut self, value: u32) {
        self.write_u32(value);
    }

    fn binary_bytes(&mut self, bytes: &[u8]) {
        self.write_bytes(bytes);
    }

    fn text_attr(&mut self, _name: &str, _value: &dyn Display) {}
}

/// Builds an element tree; named fields become attributes of the open element
#[derive(Debug)]
pub struct XmlSink {
    stack: Vec<XmlElement>,
}

impl XmlSink {
    pub fn new(root: &str) -> Self {
        Self {
            stack: vec![XmlElement::new(root)],
        }
    }

    fn current(&mut self) -> &mut XmlElement {
        // The root is never popped before finish()
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn attr(&mut self, name: &str, value: impl Display) {
        self.current().set_attribute(name, value);
    }

    /// Close anything still open and return the root
    pub fn finish(mut self) -> XmlElement {
        while self.stack.len() > 1 {
            self.end();
        }
        self.stack.remove(0)
    }
}

impl FieldSink for XmlSink {
    fn u8(&mut self, name: &str, value: u8) {
        self.attr(name, value);
    }

    fn i16(&mut self, name: &str, value: i16) {
        self.attr(name, value);
    }

    fn u32(&mut self, name: &str, value: u32) {
        self.attr(name, value);
    }

    fn i32(&mut self, name: &str, value: i32) {
        self.attr(name, value);
    }

    fn f32(&mut self, name: &str, value: f32) {
        self.attr(name, value);
    }

    fn flag(&mut self, name: &str, value: bool) {
        self.attr(name, value);
    }

    fn string(&mut self, name: &str, value: &str) {
        self.attr(name, value);
    }

    fn code(&mut self, name: &str, code: u8, label: fn(u8) -> &'static str) {
        self.attr(name, label(code));
    }

    fn begin(&mut self, element: &str) {
        self.stack.push(XmlElement::new(element));
    }

    fn end(&mut self) {
        if self.stack.len() > 1 {
            if let Some(element) = self.stack.pop() {
                self.current().push(element);
            }
        }
    }

    fn binary_u8(&mut self, _value: u8) {}

    fn binary_u32(&mut self, _value: u32) {}

    fn binary_bytes(&mut self, _bytes: &[u8]) {}

    fn text_attr(&mut self, name: &str, value: &dyn Display) {
        self.attr(name, value);
    }
}
