//! Decoding of interpreter output.
//!
//! Interpreters print in whatever encoding they were told to use (JScript with
//! `//U` writes UTF-16LE). Decoding is strict: invalid sequences and embedded
//! NUL characters are reported instead of being replaced or truncated.

use std::fmt;

/// Text encoding of an interpreter's stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    /// Canonical label, as used in runtime descriptors.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
        }
    }

    /// Parse a label case-insensitively (`utf-8`, `UTF8`, `utf-16le`, ...).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "utf8" => Some(Self::Utf8),
            "utf16le" => Some(Self::Utf16Le),
            "utf16be" => Some(Self::Utf16Be),
            _ => None,
        }
    }

    /// Decode `bytes` into a string.
    ///
    /// A leading byte-order mark is dropped.
    ///
    /// # Errors
    /// Returns an error on invalid sequences, odd-length UTF-16 input, or
    /// embedded NUL characters.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, TextDecodeError> {
        let text = match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| TextDecodeError::new(*self, e.to_string()))?,
            Self::Utf16Le | Self::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(TextDecodeError::new(
                        *self,
                        format!("odd number of bytes ({})", bytes.len()),
                    ));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| match self {
                        Self::Utf16Be => u16::from_be_bytes([pair[0], pair[1]]),
                        _ => u16::from_le_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| TextDecodeError::new(*self, e.to_string()))?
            }
        };

        if let Some(offset) = text.find('\0') {
            return Err(TextDecodeError::new(
                *self,
                format!("embedded NUL at offset {offset}"),
            ));
        }

        Ok(match text.strip_prefix('\u{feff}') {
            Some(rest) => rest.to_string(),
            None => text,
        })
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output that could not be decoded in the declared encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDecodeError {
    pub encoding: TextEncoding,
    pub detail: String,
}

impl TextDecodeError {
    fn new(encoding: TextEncoding, detail: impl Into<String>) -> Self {
        Self {
            encoding,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TextDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} output: {}", self.encoding, self.detail)
    }
}

impl std::error::Error for TextDecodeError {}
