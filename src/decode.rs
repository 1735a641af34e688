use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

/// Text decoded from raw file bytes, with the encoding that was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static str,
}

/// Decodes file contents: byte-order mark first, then strict UTF-8, then
/// charset detection. Binary-looking data is rejected.
pub fn decode_text(bytes: &[u8]) -> Result<DecodedText, String> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return decode_strict(encoding, &bytes[bom_len..]);
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        if text.contains('\0') {
            return Err("binary content (NUL bytes)".to_owned());
        }
        return Ok(DecodedText {
            text: text.to_owned(),
            encoding: UTF_8.name(),
        });
    }

    if bytes.contains(&0) {
        return Err("binary content (NUL bytes)".to_owned());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    debug!("Detected encoding {} for non-UTF-8 content", encoding.name());
    decode_strict(encoding, bytes)
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Result<DecodedText, String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| DecodedText {
            text: text.into_owned(),
            encoding: encoding.name(),
        })
        .ok_or_else(|| format!("content is not valid {}", encoding.name()))
}
