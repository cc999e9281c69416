//! RPC handler for the translate service.

use crate::dictionary::{supported_languages, translate};
use prost::Message;
use std::time::Instant;
use tracing::debug;
use worker_rpc::subjects::{METHOD_LANGUAGES, METHOD_TRANSLATE, TRANSLATE_SERVICE};
use worker_rpc::{
    Error, Language, LanguagesResponse, Result, RpcHandler, TranslateRequest, TranslateResponse,
};

/// Answers `translate` and `languages` requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TranslateHandler;

impl TranslateHandler {
    pub fn new() -> Self {
        Self
    }

    /// Handle one decoded translate request.
    pub fn translate(&self, req: &TranslateRequest) -> TranslateResponse {
        let started = Instant::now();

        if req.text.trim().is_empty() {
            return TranslateResponse {
                success: false,
                error_message: "text is required".to_string(),
                ..Default::default()
            };
        }
        if req.target_language.trim().is_empty() {
            return TranslateResponse {
                success: false,
                error_message: "target language is required".to_string(),
                ..Default::default()
            };
        }

        let source = if req.source_language.is_empty() {
            "en"
        } else {
            req.source_language.as_str()
        };
        let translated_text = translate(&req.text, source, &req.target_language);

        debug!(
            "Translated {} chars {}->{} for user {}",
            req.text.len(),
            source,
            req.target_language,
            req.user_id
        );

        TranslateResponse {
            translated_text,
            success: true,
            error_message: String::new(),
            processing_time_ms: started.elapsed().as_millis() as i64,
        }
    }

    pub fn languages(&self) -> LanguagesResponse {
        LanguagesResponse {
            languages: supported_languages()
                .iter()
                .map(|(code, name)| Language {
                    code: (*code).to_string(),
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }
}

impl RpcHandler for TranslateHandler {
    const SERVICE: &'static str = TRANSLATE_SERVICE;

    fn handle(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
        match method {
            METHOD_TRANSLATE => {
                let req = TranslateRequest::decode(payload)?;
                Ok(self.translate(&req).encode_to_vec())
            }
            METHOD_LANGUAGES => Ok(self.languages().encode_to_vec()),
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, source: &str, target: &str) -> TranslateRequest {
        TranslateRequest {
            text: text.to_string(),
            source_language: source.to_string(),
            target_language: target.to_string(),
            user_id: "u1".to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_handle_translate_over_bytes() {
        let handler = TranslateHandler::new();
        let payload = request("hello", "en", "es").encode_to_vec();
        let reply = handler.handle(METHOD_TRANSLATE, &payload).unwrap();
        let resp = TranslateResponse::decode(reply.as_slice()).unwrap();
        assert!(resp.success);
        assert_eq!(resp.translated_text, "hola");
        assert!(resp.processing_time_ms >= 0);
    }

    #[test]
    fn test_empty_text_fails_in_band() {
        let resp = TranslateHandler::new().translate(&request("   ", "en", "es"));
        assert!(!resp.success);
        assert_eq!(resp.error_message, "text is required");
    }

    #[test]
    fn test_missing_source_defaults_to_english() {
        let resp = TranslateHandler::new().translate(&request("goodbye", "", "es"));
        assert_eq!(resp.translated_text, "adiós");
    }

    #[test]
    fn test_languages() {
        let reply = TranslateHandler::new()
            .handle(METHOD_LANGUAGES, &[])
            .unwrap();
        let resp = LanguagesResponse::decode(reply.as_slice()).unwrap();
        assert_eq!(resp.languages.len(), 8);
        assert_eq!(resp.languages[2].code, "fr");
        assert_eq!(resp.languages[2].name, "French");
    }

    #[test]
    fn test_unknown_method() {
        let err = TranslateHandler::new().handle("nope", &[]).unwrap_err();
        assert!(matches!(err, Error::UnknownMethod(m) if m == "nope"));
    }

    #[test]
    fn test_garbage_payload_is_decode_error() {
        let err = TranslateHandler::new()
            .handle(METHOD_TRANSLATE, &[0xff, 0xff, 0xff])
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
