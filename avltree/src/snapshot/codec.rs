//! Byte encodings for snapshot keys and values.

/// Conversion of a key or value to and from its snapshot bytes.
///
/// Each encoded field is stored length-prefixed, so implementations only
/// see their own bytes.
pub trait SnapshotCodec: Sized {
    /// Append the encoded form of `self` to `out`.
    fn encode(&self, out: &mut Vec<u8>);

    /// Decode a value from exactly the bytes produced by [`encode`](Self::encode).
    fn decode(bytes: &[u8]) -> Result<Self, CodecError>;
}

/// A field's bytes could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecError {
    pub reason: &'static str,
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for CodecError {}

impl SnapshotCodec for String {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        std::str::from_utf8(bytes)
            .map(ToOwned::to_owned)
            .map_err(|_| CodecError {
                reason: "invalid utf-8",
            })
    }
}

impl SnapshotCodec for Vec<u8> {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self);
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(bytes.to_vec())
    }
}

impl SnapshotCodec for u64 {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        <[u8; 8]>::try_from(bytes)
            .map(Self::from_le_bytes)
            .map_err(|_| CodecError {
                reason: "expected 8 bytes",
            })
    }
}

impl SnapshotCodec for i64 {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        <[u8; 8]>::try_from(bytes)
            .map(Self::from_le_bytes)
            .map_err(|_| CodecError {
                reason: "expected 8 bytes",
            })
    }
}
