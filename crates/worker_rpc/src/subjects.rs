//! NATS subject layout for worker RPC.
//!
//! Subjects follow `{prefix}.{service}.{method}`, e.g. `worker.translate.translate`.

/// Translate worker service name.
pub const TRANSLATE_SERVICE: &str = "translate";

/// Audio worker service name.
pub const AUDIO_SERVICE: &str = "audio";

pub const METHOD_TRANSLATE: &str = "translate";
pub const METHOD_LANGUAGES: &str = "languages";
pub const METHOD_PROCESS: &str = "process";
/// Answered by every [`crate::WorkerService`] without involving the handler.
pub const METHOD_HEALTH: &str = "health";

/// Default subject prefix.
pub const DEFAULT_PREFIX: &str = "worker";

/// Builds subjects under a configurable prefix.
#[derive(Debug, Clone)]
pub struct Subjects {
    prefix: String,
}

impl Subjects {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Subject for one method of one service.
    pub fn method(&self, service: &str, method: &str) -> String {
        format!("{}.{}.{}", self.prefix, service, method)
    }

    /// Wildcard covering every method of a service.
    pub fn service_wildcard(&self, service: &str) -> String {
        format!("{}.{}.*", self.prefix, service)
    }

    pub fn translate(&self) -> String {
        self.method(TRANSLATE_SERVICE, METHOD_TRANSLATE)
    }

    pub fn languages(&self) -> String {
        self.method(TRANSLATE_SERVICE, METHOD_LANGUAGES)
    }

    pub fn process_audio(&self) -> String {
        self.method(AUDIO_SERVICE, METHOD_PROCESS)
    }

    pub fn health(&self, service: &str) -> String {
        self.method(service, METHOD_HEALTH)
    }
}

impl Default for Subjects {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

/// Extract the method token (last segment) from a concrete subject.
pub fn method_of(subject: &str) -> &str {
    subject.rsplit('.').next().unwrap_or(subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_layout() {
        let subjects = Subjects::default();
        assert_eq!(subjects.translate(), "worker.translate.translate");
        assert_eq!(subjects.languages(), "worker.translate.languages");
        assert_eq!(subjects.process_audio(), "worker.audio.process");
        assert_eq!(subjects.health(AUDIO_SERVICE), "worker.audio.health");
        assert_eq!(subjects.service_wildcard(TRANSLATE_SERVICE), "worker.translate.*");
    }

    #[test]
    fn test_custom_prefix() {
        let subjects = Subjects::new("demo.rpc");
        assert_eq!(subjects.translate(), "demo.rpc.translate.translate");
    }

    #[test]
    fn test_method_of() {
        assert_eq!(method_of("worker.translate.languages"), "languages");
        assert_eq!(method_of("health"), "health");
    }
}
