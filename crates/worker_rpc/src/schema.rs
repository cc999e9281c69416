//! Worker RPC message definitions.
//!
//! Hand-written `prost` messages; tags are the wire contract and must not be
//! renumbered.

use prost::Message;

/// Translate a piece of text between two languages.
#[derive(Clone, PartialEq, Message)]
pub struct TranslateRequest {
    #[prost(string, tag = "1")]
    pub text: String,

    #[prost(string, tag = "2")]
    pub source_language: String,

    #[prost(string, tag = "3")]
    pub target_language: String,

    #[prost(string, tag = "4")]
    pub user_id: String,

    /// Request timestamp in milliseconds since the Unix epoch.
    #[prost(int64, tag = "5")]
    pub timestamp: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct TranslateResponse {
    #[prost(string, tag = "1")]
    pub translated_text: String,

    #[prost(bool, tag = "2")]
    pub success: bool,

    #[prost(string, tag = "3")]
    pub error_message: String,

    /// Time spent inside the worker, in milliseconds.
    #[prost(int64, tag = "4")]
    pub processing_time_ms: i64,
}

/// Process a raw audio clip.
#[derive(Clone, PartialEq, Message)]
pub struct AudioRequest {
    /// Raw audio bytes (no base64).
    #[prost(bytes = "vec", tag = "1")]
    pub audio_data: Vec<u8>,

    #[prost(string, tag = "2")]
    pub source_language: String,

    #[prost(string, tag = "3")]
    pub target_language: String,

    /// Container format hint, e.g. "wav".
    #[prost(string, tag = "4")]
    pub format: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct AudioResponse {
    #[prost(bytes = "vec", tag = "1")]
    pub processed_audio: Vec<u8>,

    #[prost(bool, tag = "2")]
    pub success: bool,

    #[prost(string, tag = "3")]
    pub error_message: String,

    #[prost(int64, tag = "4")]
    pub processed_size: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct LanguagesRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct Language {
    /// ISO 639-1 code.
    #[prost(string, tag = "1")]
    pub code: String,

    #[prost(string, tag = "2")]
    pub name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct LanguagesResponse {
    #[prost(message, repeated, tag = "1")]
    pub languages: Vec<Language>,
}

#[derive(Clone, PartialEq, Message)]
pub struct HealthRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct HealthResponse {
    #[prost(string, tag = "1")]
    pub service: String,

    #[prost(bool, tag = "2")]
    pub ok: bool,
}
