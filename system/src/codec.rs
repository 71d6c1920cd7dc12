use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Wire encoding of a single frame. Text frames carry JSON, binary frames carry bincode.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Codec {
    Json,
    Bincode,
}

#[derive(Debug)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed json frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed bincode frame: {0}")]
    Bincode(#[from] bincode::Error),
}

impl Codec {
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Frame, CodecError> {
        match self {
            Codec::Json => Ok(Frame::Text(serde_json::to_string(value)?)),
            Codec::Bincode => Ok(Frame::Binary(bincode::serialize(value)?)),
        }
    }
}

pub fn decode_text<T: DeserializeOwned>(text: &str) -> Result<T, CodecError> {
    Ok(serde_json::from_str(text)?)
}

pub fn decode_binary<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(bincode::deserialize(bytes)?)
}
