//! Text encoding detection for input files

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::config::LoaderConfig;
use crate::error::Result;

/// Guess the encoding of a file from its first `encoding_sample_bytes` bytes
///
/// Falls back to `fallback_encoding` when the sample is inconclusive (empty
/// or pure ASCII).
pub fn detect_encoding(path: &Path, config: &LoaderConfig) -> Result<&'static Encoding> {
    let file = File::open(path)?;
    let limit = config.encoding_sample_bytes as u64;

    let mut sample = Vec::with_capacity(config.encoding_sample_bytes);
    file.take(limit).read_to_end(&mut sample)?;

    // A short read means the whole file fit in the sample
    let at_eof = (sample.len() as u64) < limit;
    let fallback = encoding_for_label(&config.fallback_encoding);
    let encoding = detect_encoding_from_bytes(&sample, at_eof, fallback);

    debug!(
        "Detected encoding {} for {} ({} byte sample)",
        encoding.name(),
        path.display(),
        sample.len()
    );
    Ok(encoding)
}

/// Statistical guess over a byte sample
///
/// `at_eof` tells the detector whether the sample ends the file, so a
/// multi-byte sequence cut off by the sample limit is not held against UTF-8.
pub fn detect_encoding_from_bytes(
    sample: &[u8],
    at_eof: bool,
    fallback: &'static Encoding,
) -> &'static Encoding {
    // Nothing to go on: every supported encoding agrees on ASCII
    if sample.is_ascii() {
        return fallback;
    }

    // BOMs are unambiguous
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return encoding;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, at_eof);
    detector.guess(None, true)
}

/// Resolve an encoding label, defaulting to UTF-8 for unknown labels
pub fn encoding_for_label(label: &str) -> &'static Encoding {
    Encoding::for_label(label.as_bytes()).unwrap_or(UTF_8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, WINDOWS_1251};
    use std::io::Write;

    #[test]
    fn test_inconclusive_sample_uses_fallback() {
        assert_eq!(detect_encoding_from_bytes(b"", true, UTF_8), UTF_8);
        assert_eq!(
            detect_encoding_from_bytes(b"", true, WINDOWS_1251),
            WINDOWS_1251
        );
        assert_eq!(
            detect_encoding_from_bytes(b"Date,Total\n2024-01-05,10\n", true, UTF_8),
            UTF_8
        );
    }

    #[test]
    fn test_detects_utf8() {
        let text = "Date,Product,Total\n2024-01-05,Молоко,10\n2024-01-06,Хлеб,20\n";
        assert_eq!(
            detect_encoding_from_bytes(text.as_bytes(), true, UTF_8),
            UTF_8
        );
    }

    #[test]
    fn test_detects_windows_1251() {
        let text = "Дата,Товар,Сумма\n2024-01-05,Молоко свежее,10\n2024-01-06,Хлеб ржаной,20\n\
                    2024-01-07,Сыр российский,30\n2024-01-08,Масло сливочное,40\n";
        let (bytes, _, had_errors) = WINDOWS_1251.encode(text);
        assert!(!had_errors);
        assert_eq!(
            detect_encoding_from_bytes(&bytes, true, UTF_8),
            WINDOWS_1251
        );
    }

    #[test]
    fn test_bom_wins() {
        let bytes = [0xFF, 0xFE, b'D', 0x00, b'a', 0x00];
        assert_eq!(detect_encoding_from_bytes(&bytes, true, UTF_8), UTF_16LE);
    }

    #[test]
    fn test_detect_encoding_reads_prefix_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // Valid UTF-8 prefix longer than the sample
        for _ in 0..2000 {
            writeln!(file, "2024-01-05,Кофе,10").unwrap();
        }
        let config = LoaderConfig {
            encoding_sample_bytes: 100,
            ..LoaderConfig::default()
        };
        assert_eq!(detect_encoding(file.path(), &config).unwrap(), UTF_8);
    }

    #[test]
    fn test_detect_encoding_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            detect_encoding(file.path(), &LoaderConfig::default()).unwrap(),
            UTF_8
        );
    }

    #[test]
    fn test_encoding_for_label() {
        assert_eq!(encoding_for_label("utf-8"), UTF_8);
        assert_eq!(encoding_for_label("cp1251"), WINDOWS_1251);
        assert_eq!(encoding_for_label("nonsense"), UTF_8);
    }
}
