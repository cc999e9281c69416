//! RPC handler for the audio service.

use crate::synth::synthesize;
use prost::Message;
use tracing::debug;
use worker_rpc::subjects::{AUDIO_SERVICE, METHOD_PROCESS};
use worker_rpc::{AudioRequest, AudioResponse, Error, Result, RpcHandler};

/// Answers `process` requests with a synthetic clip.
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioHandler;

impl AudioHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn process(&self, req: &AudioRequest) -> AudioResponse {
        let processed_audio = synthesize(req.audio_data.len());
        debug!(
            "Processed {} bytes of {} audio ({}->{}) into {} bytes",
            req.audio_data.len(),
            req.format,
            req.source_language,
            req.target_language,
            processed_audio.len()
        );

        AudioResponse {
            processed_size: processed_audio.len() as i64,
            processed_audio,
            success: true,
            error_message: String::new(),
        }
    }
}

impl RpcHandler for AudioHandler {
    const SERVICE: &'static str = AUDIO_SERVICE;

    fn handle(&self, method: &str, payload: &[u8]) -> Result<Vec<u8>> {
        match method {
            METHOD_PROCESS => {
                let req = AudioRequest::decode(payload)?;
                Ok(self.process(&req).encode_to_vec())
            }
            other => Err(Error::UnknownMethod(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_over_bytes() {
        let req = AudioRequest {
            audio_data: vec![1u8; 10_240],
            source_language: "en".to_string(),
            target_language: "es".to_string(),
            format: "wav".to_string(),
        };
        let reply = AudioHandler::new()
            .handle(METHOD_PROCESS, &req.encode_to_vec())
            .unwrap();
        let resp = AudioResponse::decode(reply.as_slice()).unwrap();
        assert!(resp.success);
        assert_eq!(resp.processed_size, 10_284);
        assert_eq!(resp.processed_audio.len(), 10_284);
    }

    #[test]
    fn test_empty_audio_gets_minimum_clip() {
        let resp = AudioHandler::new().process(&AudioRequest::default());
        assert!(resp.success);
        assert_eq!(resp.processed_size, 1068);
        assert_eq!(resp.processed_audio.len(), 1068);
    }
}
