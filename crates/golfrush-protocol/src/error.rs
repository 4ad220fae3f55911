//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an outbound event failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// An inbound frame was malformed, named an unknown event, or was
    /// missing required fields.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
