//! Gzip encoding of backup documents

use super::{DumpError, DumpResult};

/// True when this build can read and write gzip documents
pub fn gzip_available() -> bool {
    cfg!(feature = "gzip")
}

/// Gzip-compress a document
#[cfg(feature = "gzip")]
pub fn compress(data: &[u8]) -> DumpResult<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| DumpError::Compression(format!("Failed to compress: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| DumpError::Compression(format!("Failed to finish gzip stream: {}", e)))
}

/// Decompress a gzip document
#[cfg(feature = "gzip")]
pub fn decompress(data: &[u8]) -> DumpResult<Vec<u8>> {
    use flate2::read::GzDecoder;
    use std::io::Read;

    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DumpError::Compression(format!("Failed to decompress: {}", e)))?;
    Ok(out)
}

#[cfg(not(feature = "gzip"))]
pub fn compress(_data: &[u8]) -> DumpResult<Vec<u8>> {
    Err(DumpError::CompressionUnavailable)
}

#[cfg(not(feature = "gzip"))]
pub fn decompress(_data: &[u8]) -> DumpResult<Vec<u8>> {
    Err(DumpError::CompressionUnavailable)
}

#[cfg(all(test, feature = "gzip"))]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_round_trip() {
        let doc = b"SET NAMES utf8;\nCOMMIT;\n".repeat(50);
        let packed = compress(&doc).unwrap();
        assert_eq!(&packed[..2], &[0x1f, 0x8b]);
        assert!(packed.len() < doc.len());
        assert_eq!(decompress(&packed).unwrap(), doc);
    }

    #[test]
    fn test_decompress_rejects_plain_text() {
        let err = decompress(b"SET NAMES utf8;").unwrap_err();
        assert!(matches!(err, DumpError::Compression(_)));
    }
}
