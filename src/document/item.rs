//! # Content Items
//!
//! A document is a flat list of content items. Each item is tagged with the
//! rule used to turn it into bytes:
//!
//! | Kind | Payload | Encoded as |
//! |------|---------|------------|
//! | [`ItemKind::Control`] | characters | UTF-8 (command channel) |
//! | [`ItemKind::Text`] | characters | document target codepage |
//! | [`ItemKind::Binary`] | bytes | unchanged |

use crate::encoding::Codepage;
use crate::error::{PrintStreamError, Result};

/// Codepage of the printer command channel.
///
/// Escape sequences are plain ASCII, so they never need the localized
/// codepage used for human-readable text.
pub const CONTROL_ENCODING: Codepage = Codepage::Utf8;

/// Serialization rule of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Printer command or escape sequence
    Control,
    /// Text to print
    Text,
    /// Raw bytes (raster rows, barcode tokens)
    Binary,
}

impl ItemKind {
    /// Numeric tag used by item streams built outside this crate.
    ///
    /// `1` = control, `2` = text, `3` = binary.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            1 => Ok(ItemKind::Control),
            2 => Ok(ItemKind::Text),
            3 => Ok(ItemKind::Binary),
            other => Err(PrintStreamError::InvalidItem(format!(
                "unknown item kind {}",
                other
            ))),
        }
    }

    pub fn code(&self) -> u8 {
        match self {
            ItemKind::Control => 1,
            ItemKind::Text => 2,
            ItemKind::Binary => 3,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            ItemKind::Control => "control stream",
            ItemKind::Text => "text stream",
            ItemKind::Binary => "bytes stream",
        }
    }
}

/// Raw payload before kind validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Chars(String),
    Bytes(Vec<u8>),
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Chars(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Chars(s)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

/// One immutable entry of a document.
///
/// The payload always matches the kind: control and text items carry
/// characters, binary items carry bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    kind: ItemKind,
    payload: Payload,
}

impl ContentItem {
    /// Build an item, checking the payload representation against `kind`.
    pub fn new(kind: ItemKind, payload: impl Into<Payload>) -> Result<Self> {
        let payload = payload.into();
        let matches = matches!(
            (kind, &payload),
            (ItemKind::Control | ItemKind::Text, Payload::Chars(_))
                | (ItemKind::Binary, Payload::Bytes(_))
        );
        if !matches {
            return Err(PrintStreamError::InvalidItem(format!(
                "{} cannot carry {}",
                kind.describe(),
                match payload {
                    Payload::Chars(_) => "character data",
                    Payload::Bytes(_) => "raw bytes",
                }
            )));
        }
        Ok(Self { kind, payload })
    }

    /// Build an item from a numeric kind tag (see [`ItemKind::from_code`]).
    pub fn from_raw(code: u8, payload: impl Into<Payload>) -> Result<Self> {
        Self::new(ItemKind::from_code(code)?, payload)
    }

    pub fn control(seq: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Control,
            payload: Payload::Chars(seq.into()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Text,
            payload: Payload::Chars(text.into()),
        }
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: ItemKind::Binary,
            payload: Payload::Bytes(bytes.into()),
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Character payload of control and text items.
    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Chars(s) => Some(s),
            Payload::Bytes(_) => None,
        }
    }

    /// Encode this item for transmission.
    ///
    /// `target` only applies to text items.
    pub fn encode(&self, target: Codepage) -> Result<Vec<u8>> {
        match (&self.kind, &self.payload) {
            (ItemKind::Control, Payload::Chars(seq)) => CONTROL_ENCODING.encode(seq),
            (ItemKind::Text, Payload::Chars(text)) => target.encode(text),
            (ItemKind::Binary, Payload::Bytes(bytes)) => Ok(bytes.clone()),
            // Constructors keep kind and payload in step
            (kind, _) => Err(PrintStreamError::InvalidItem(format!(
                "corrupt {}",
                kind.describe()
            ))),
        }
    }
}
