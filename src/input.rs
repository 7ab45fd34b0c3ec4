//! Reading tool inputs from disk

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::Path;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Read a file, decompressing it if it is gzip
pub fn read_input(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;

    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    let mut data = Vec::new();
    if is_gzip {
        GzDecoder::new(file).read_to_end(&mut data)?;
        return Ok(data);
    }

    file.read_to_end(&mut data)?;
    // Compressed inputs don't always carry the extension
    if data.starts_with(&GZIP_MAGIC) {
        let mut decompressed = Vec::new();
        GzDecoder::new(Cursor::new(data)).read_to_end(&mut decompressed)?;
        Ok(decompressed)
    } else {
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_plain_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("asset.json");
        std::fs::write(&path, b"{}").unwrap();
        assert_eq!(read_input(&path).unwrap(), b"{}");
    }

    #[test]
    fn test_gzip_detected_by_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("asset.bin");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"payload").unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();
        assert_eq!(read_input(&path).unwrap(), b"payload");
    }

    #[test]
    fn test_gzip_detected_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("asset.json.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"sequences":[]}"#).unwrap();
        std::fs::write(&path, encoder.finish().unwrap()).unwrap();
        assert_eq!(read_input(&path).unwrap(), br#"{"sequences":[]}"#);
    }
}
