//! # Error Types
//!
//! This module defines error types used throughout the printstream library.

use thiserror::Error;

/// Main error type for printstream operations
#[derive(Debug, Error)]
pub enum PrintStreamError {
    /// Content item whose payload does not match its kind
    #[error("Invalid content item: {0}")]
    InvalidItem(String),

    /// Character outside a barcode or charset alphabet
    #[error("Unsupported character {ch:?} for {context}")]
    UnsupportedCharacter { ch: char, context: &'static str },

    /// Transmission attempted on a closed adapter
    #[error("Adapter is not open")]
    AdapterNotOpen,

    /// Adapter holds a transport handle while flagged closed
    #[error("Adapter already connected: {0}")]
    AlreadyConnected(String),

    /// Mutation the document model does not offer
    #[error("Not supported: {0}")]
    NotSupported(&'static str),

    /// Document has content to send but no adapter attached
    #[error("Document has no printer adapter")]
    NoAdapter,

    /// Codepage label that cannot be resolved
    #[error("Unknown codepage: {0}")]
    UnknownCodepage(String),

    /// Text character the target codepage cannot represent
    #[error("Character {ch:?} cannot be encoded in {codepage}")]
    Unencodable { ch: char, codepage: String },

    /// Command parameter outside its allowed values
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Transport-level errors (connection, spooler)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Image loading error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for printstream operations
pub type Result<T> = std::result::Result<T, PrintStreamError>;
