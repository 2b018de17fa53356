pub mod normalize;
pub mod ollama;
pub mod prompt;
pub mod taxonomy;

use anyhow::Result;

/// A text-generation backend. Output is untrusted free text.
pub trait Generator {
    fn generate(&self, prompt: &str, max_output_tokens: u32) -> Result<String>;
}
