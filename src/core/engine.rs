//! The inference backend seam.

/// An image+prompt-to-text model backend.
///
/// Implementations run on the worker thread and are never invoked
/// concurrently; they may block for the whole inference.
pub trait InferenceEngine: Send {
    fn infer(&mut self, image_path: &str, prompt: &str) -> anyhow::Result<String>;
}

/// Deterministic stand-in backend used by the binary and by smoke tests.
///
/// Echoes the prompt and image reference back as a canned caption, so the
/// full queue/worker/broker path can run without a model download.
pub struct DemoEngine {
    model_id: String,
}

impl DemoEngine {
    pub fn new(model_id: impl Into<String>) -> DemoEngine {
        DemoEngine {
            model_id: model_id.into(),
        }
    }
}

impl InferenceEngine for DemoEngine {
    fn infer(&mut self, image_path: &str, prompt: &str) -> anyhow::Result<String> {
        Ok(format!(
            "[{}] {image_path}: no answer to \"{prompt}\" without a real model backend",
            self.model_id
        ))
    }
}
