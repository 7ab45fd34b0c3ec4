//! Little-endian binary writer and reader for resource bodies
//!
//! Strings are a u32 byte length followed by UTF-8 bytes, no terminator.

use crate::error::{Error, Result};

/// In-memory resource writer
#[derive(Debug, Default)]
pub struct BinaryWriter {
    data: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a single byte
    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Write a 16-bit signed value (little-endian)
    pub fn write_i16(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 32-bit unsigned value (little-endian)
    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 32-bit signed value (little-endian)
    pub fn write_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a 32-bit float (little-endian)
    pub fn write_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Write raw bytes with no length prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a length-prefixed string
    pub fn write_string(&mut self, value: &str) {
        self.write_u32(value.len() as u32);
        self.write_bytes(value.as_bytes());
    }

    /// Finish writing and take the bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Resource reader over a byte slice
pub struct BinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BinaryReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check if we've reached the end of data
    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(self.error(format!(
                "unexpected end of data, wanted {} bytes, {} left",
                len,
                self.remaining()
            )));
        }
        let data = self.data;
        let bytes = &data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take_array::<1>()?[0])
    }

    /// Read a byte as a flag, any non-zero value is set
    pub fn read_flag(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a 16-bit signed value (little-endian)
    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    /// Read a 32-bit unsigned value (little-endian)
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    /// Read a 32-bit signed value (little-endian)
    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    /// Read a 32-bit float (little-endian)
    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    /// Read a u32 length followed by that many bytes
    pub fn read_sized_bytes(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// Read a length-prefixed string
    pub fn read_string(&mut self) -> Result<String> {
        let start = self.pos;
        let bytes = self.read_sized_bytes()?;
        String::from_utf8(bytes).map_err(|e| Error::Decode {
            pos: start,
            message: format!("string is not UTF-8: {}", e),
        })
    }

    /// Read a u32 count followed by that many items
    pub fn read_list<T>(&mut self, mut read: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_u32()?;
        self.read_items(count, &mut read)
    }

    /// Read `count` items; the count itself was read earlier
    pub fn read_items<T>(
        &mut self,
        count: u32,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        // Capacity is not trusted from the data
        let mut items = Vec::new();
        for _ in 0..count {
            items.push(read(self)?);
        }
        Ok(items)
    }

    /// Fail unless every byte has been consumed
    pub fn finish(&self) -> Result<()> {
        if self.is_eof() {
            Ok(())
        } else {
            Err(self.error(format!("{} trailing bytes", self.remaining())))
        }
    }

    fn error(&self, message: String) -> Error {
        Error::Decode {
            pos: self.pos,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_layout() {
        let mut writer = BinaryWriter::new();
        writer.write_u8(0xAB);
        writer.write_i16(-2);
        writer.write_u32(0x1234_5678);
        writer.write_f32(1.0);
        assert_eq!(
            writer.into_bytes(),
            vec![0xAB, 0xFE, 0xFF, 0x78, 0x56, 0x34, 0x12, 0x00, 0x00, 0x80, 0x3F]
        );
    }

    #[test]
    fn test_string_prefix() {
        let mut writer = BinaryWriter::new();
        writer.write_string("abc");
        writer.write_string("");
        let bytes = writer.into_bytes();
        assert_eq!(bytes, vec![3, 0, 0, 0, b'a', b'b', b'c', 0, 0, 0, 0]);

        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_string().unwrap(), "abc");
        assert_eq!(reader.read_string().unwrap(), "");
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_negative_one_as_u32() {
        let mut writer = BinaryWriter::new();
        writer.write_i32(-1);
        let bytes = writer.into_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert_eq!(reader.read_u32().unwrap(), u32::MAX);
    }

    #[test]
    fn test_truncated_read() {
        let bytes = [1u8, 2, 3];
        let mut reader = BinaryReader::new(&bytes);
        let err = reader.read_u32().unwrap_err();
        assert!(matches!(err, Error::Decode { pos: 0, .. }));
    }

    #[test]
    fn test_huge_count_fails_without_allocating() {
        let bytes = u32::MAX.to_le_bytes();
        let mut reader = BinaryReader::new(&bytes);
        assert!(reader.read_list(|r| r.read_i16()).is_err());
    }

    #[test]
    fn test_finish_reports_trailing() {
        let bytes = [0u8; 2];
        let mut reader = BinaryReader::new(&bytes);
        reader.read_u8().unwrap();
        assert!(reader.finish().is_err());
    }
}
