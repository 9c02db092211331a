//! Text decoding for documents read from disk.
//!
//! Detection order is fixed: byte-order marks first (UTF-8, UTF-16LE,
//! UTF-16BE), then strict UTF-8, and finally a lossy UTF-8 decode that
//! substitutes U+FFFD for invalid sequences. A lossy result is flagged so
//! callers can refuse to write it back. [`encode_text`] goes the other way,
//! so rewritten files keep the encoding they were read with.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    /// Invalid UTF-8 forced through replacement characters.
    Lossy,
}

#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: TextEncoding,
}

impl DecodedText {
    pub fn is_lossy(&self) -> bool {
        self.encoding == TextEncoding::Lossy
    }
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

pub fn decode_text(bytes: &[u8]) -> DecodedText {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return match std::str::from_utf8(rest) {
            Ok(text) => DecodedText {
                text: text.to_string(),
                encoding: TextEncoding::Utf8Bom,
            },
            Err(_) => lossy(rest),
        };
    }

    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        if let Some(text) = decode_utf16(rest, u16::from_le_bytes) {
            return DecodedText {
                text,
                encoding: TextEncoding::Utf16Le,
            };
        }
    } else if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        if let Some(text) = decode_utf16(rest, u16::from_be_bytes) {
            return DecodedText {
                text,
                encoding: TextEncoding::Utf16Be,
            };
        }
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => DecodedText {
            text: text.to_string(),
            encoding: TextEncoding::Utf8,
        },
        Err(_) => lossy(bytes),
    }
}

/// Encode `text` back into `encoding`, byte-order mark included.
/// A lossy decode has no faithful encoding and is written as plain UTF-8.
pub fn encode_text(text: &str, encoding: TextEncoding) -> Vec<u8> {
    match encoding {
        TextEncoding::Utf8 | TextEncoding::Lossy => text.as_bytes().to_vec(),
        TextEncoding::Utf8Bom => [UTF8_BOM, text.as_bytes()].concat(),
        TextEncoding::Utf16Le => encode_utf16(text, UTF16_LE_BOM, u16::to_le_bytes),
        TextEncoding::Utf16Be => encode_utf16(text, UTF16_BE_BOM, u16::to_be_bytes),
    }
}

fn encode_utf16(text: &str, bom: &[u8], to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(bom.len() + text.len() * 2);
    bytes.extend_from_slice(bom);
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&to_bytes(unit));
    }
    bytes
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| to_unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .ok()
}

fn lossy(bytes: &[u8]) -> DecodedText {
    DecodedText {
        text: String::from_utf8_lossy(bytes).into_owned(),
        encoding: TextEncoding::Lossy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8() {
        let decoded = decode_text("---\ntitle: 你好\n---\n".as_bytes());
        assert_eq!(decoded.encoding, TextEncoding::Utf8);
        assert!(decoded.text.contains("你好"));
        assert!(!decoded.is_lossy());
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"---\ntitle: A\n---\n");
        let decoded = decode_text(&bytes);
        assert_eq!(decoded.encoding, TextEncoding::Utf8Bom);
        assert!(decoded.text.starts_with("---"));
    }

    #[test]
    fn test_utf16_le_with_bom() {
        let mut bytes = UTF16_LE_BOM.to_vec();
        for unit in "标题".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode_text(&bytes);
        assert_eq!(decoded.encoding, TextEncoding::Utf16Le);
        assert_eq!(decoded.text, "标题");
    }

    #[test]
    fn test_utf16_be_with_bom() {
        let mut bytes = UTF16_BE_BOM.to_vec();
        for unit in "ab".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let decoded = decode_text(&bytes);
        assert_eq!(decoded.encoding, TextEncoding::Utf16Be);
        assert_eq!(decoded.text, "ab");
    }

    #[test]
    fn test_encode_restores_original_bytes() {
        let text = "---\ntitle: 标题\n---\n";
        for encoding in [
            TextEncoding::Utf8,
            TextEncoding::Utf8Bom,
            TextEncoding::Utf16Le,
            TextEncoding::Utf16Be,
        ] {
            let bytes = encode_text(text, encoding);
            let decoded = decode_text(&bytes);
            assert_eq!(decoded.encoding, encoding);
            assert_eq!(decoded.text, text);
        }
        assert!(encode_text("a", TextEncoding::Utf16Le).starts_with(UTF16_LE_BOM));
        assert!(encode_text("a", TextEncoding::Utf8Bom).starts_with(UTF8_BOM));
    }

    #[test]
    fn test_invalid_utf8_falls_back_to_lossy() {
        let decoded = decode_text(&[b'a', 0xC3, 0x28, b'b']);
        assert!(decoded.is_lossy());
        assert!(decoded.text.starts_with('a'));
        assert!(decoded.text.contains('\u{FFFD}'));
    }
}
