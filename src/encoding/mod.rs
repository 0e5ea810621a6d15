//! # Text Encoding
//!
//! Printers render single-byte symbol sets, not UTF-8. Text items of a
//! [`Document`](crate::document::Document) are transcoded through the
//! document's target [`Codepage`] right before transmission.
//!
//! ## Supported Codepages
//!
//! | Label(s) | Codepage | Source |
//! |----------|----------|--------|
//! | `cp850`, `850`, `ibm850` | PC-850 Multilingual | built-in table |
//! | `cp437`, `437`, `ibm437`, `pc-8` | PC-8 | built-in table |
//! | `latin1`, `latin-1`, `iso-8859-1` | ISO 8859-1 | code point ≤ U+00FF |
//! | `ascii`, `us-ascii` | ASCII | code point ≤ U+007F |
//! | `utf-8`, `utf8` | UTF-8 | passthrough |
//! | any other WHATWG label | e.g. `windows-1252` | `encoding_rs` |
//!
//! Encoding is strict: a character outside the codepage is an error, not a
//! silent `?`, so a misconfigured job fails before any byte is sent.
//!
//! ## Example
//!
//! ```
//! use printstream::encoding::Codepage;
//!
//! let cp = Codepage::from_label("cp850")?;
//! assert_eq!(cp.encode("é")?, vec![0x82]);
//! # Ok::<(), printstream::PrintStreamError>(())
//! ```

pub mod cp437;
pub mod cp850;

use std::fmt;
use std::str::FromStr;

use encoding_rs::{Encoding, EncoderResult};

use crate::error::{PrintStreamError, Result};

/// Character-to-byte mapping used for human-readable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codepage {
    Utf8,
    Ascii,
    Latin1,
    Cp437,
    Cp850,
    /// Any other single-byte or legacy encoding known to `encoding_rs`.
    Whatwg(&'static Encoding),
}

impl Default for Codepage {
    fn default() -> Self {
        Codepage::Cp850
    }
}

impl Codepage {
    /// Resolve a codepage label such as `"cp850"` or `"windows-1252"`.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let cp = match normalized.as_str() {
            "cp850" | "850" | "ibm850" | "pc-850" => Codepage::Cp850,
            "cp437" | "437" | "ibm437" | "pc-8" | "pc-437" => Codepage::Cp437,
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Codepage::Latin1,
            "ascii" | "us-ascii" => Codepage::Ascii,
            "utf-8" | "utf8" => Codepage::Utf8,
            other => {
                let encoding = Encoding::for_label(other.as_bytes())
                    .ok_or_else(|| PrintStreamError::UnknownCodepage(label.to_string()))?;
                if encoding == encoding_rs::UTF_8 {
                    Codepage::Utf8
                } else if encoding.output_encoding() != encoding {
                    // UTF-16 and the replacement encoding cannot be produced
                    return Err(PrintStreamError::UnknownCodepage(label.to_string()));
                } else {
                    Codepage::Whatwg(encoding)
                }
            }
        };
        Ok(cp)
    }

    /// Canonical name of the codepage.
    pub fn name(&self) -> &'static str {
        match *self {
            Codepage::Utf8 => "utf-8",
            Codepage::Ascii => "ascii",
            Codepage::Latin1 => "latin-1",
            Codepage::Cp437 => "cp437",
            Codepage::Cp850 => "cp850",
            Codepage::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Transcode `text` into this codepage.
    ///
    /// Fails with [`PrintStreamError::Unencodable`] on the first character
    /// the codepage cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match *self {
            Codepage::Utf8 => Ok(text.as_bytes().to_vec()),
            Codepage::Ascii => self.encode_with(text, |ch| ch.is_ascii().then_some(ch as u8)),
            Codepage::Latin1 => self.encode_with(text, |ch| u8::try_from(u32::from(ch)).ok()),
            Codepage::Cp437 => self.encode_with(text, cp437::encode_char),
            Codepage::Cp850 => self.encode_with(text, cp850::encode_char),
            Codepage::Whatwg(encoding) => self.encode_whatwg(encoding, text),
        }
    }

    fn encode_with(&self, text: &str, map: impl Fn(char) -> Option<u8>) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(text.len());
        for ch in text.chars() {
            let byte = map(ch).ok_or_else(|| self.unencodable(ch))?;
            out.push(byte);
        }
        Ok(out)
    }

    fn encode_whatwg(&self, encoding: &'static Encoding, text: &str) -> Result<Vec<u8>> {
        let mut encoder = encoding.new_encoder();
        let mut out = Vec::with_capacity(text.len() + 16);
        let mut rest = text;
        loop {
            let (result, read) =
                encoder.encode_from_utf8_to_vec_without_replacement(rest, &mut out, true);
            rest = &rest[read..];
            match result {
                EncoderResult::InputEmpty => return Ok(out),
                EncoderResult::OutputFull => out.reserve(rest.len() + 16),
                EncoderResult::Unmappable(ch) => return Err(self.unencodable(ch)),
            }
        }
    }

    fn unencodable(&self, ch: char) -> PrintStreamError {
        PrintStreamError::Unencodable {
            ch,
            codepage: self.name().to_string(),
        }
    }
}

impl fmt::Display for Codepage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codepage {
    type Err = PrintStreamError;

    fn from_str(s: &str) -> Result<Self> {
        Codepage::from_label(s)
    }
}
