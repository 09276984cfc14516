//! Unified configuration surface for LangExtract.
//!
//! Aggregates the per-module options (chunking, alignment, validation,
//! multi-pass, provider, inference, progress reporting) behind one
//! builder so callers don't have to construct each module's config type
//! by hand. Loading this from a file or environment is outside this
//! crate's scope; callers own that and hand the crate a built
//! `LangExtractConfig`.

use crate::{
    alignment::AlignmentOptions,
    chunking::ChunkingConfig,
    data::FormatType,
    logging::ProgressHandler,
    multipass::MultiPassConfig,
    providers::ProviderConfig,
    resolver::ValidationConfig,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// The main unified configuration for LangExtract operations.
#[derive(Clone)]
pub struct LangExtractConfig {
    /// Core processing configuration
    pub processing: ProcessingConfig,
    /// Provider configuration
    pub provider: ProviderConfig,
    /// Validation and output processing
    pub validation: ValidationConfig,
    /// Text chunking configuration
    pub chunking: ChunkingConfig,
    /// Alignment configuration
    pub alignment: AlignmentOptions,
    /// Multi-pass extraction configuration
    pub multipass: MultiPassConfig,
    /// Inference-specific parameters
    pub inference: InferenceConfig,
    /// Progress reporting configuration
    pub progress: ProgressConfig,
}

/// Core processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Output format type
    pub format_type: FormatType,
    /// Maximum characters per chunk for processing
    pub max_char_buffer: usize,
    /// Additional context for the prompt
    pub additional_context: Option<String>,
    /// Enable debug mode
    pub debug: bool,
    /// Whether to wrap output in code fences
    pub fence_output: Option<bool>,
    /// Whether to use schema constraints
    pub use_schema_constraints: bool,
    /// Custom parameters for extensibility
    pub custom_params: HashMap<String, serde_json::Value>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            format_type: FormatType::Json,
            max_char_buffer: 2000,
            additional_context: None,
            debug: false,
            fence_output: None,
            use_schema_constraints: true,
            custom_params: HashMap::new(),
        }
    }
}

/// Configuration for language model inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: Option<usize>,
    /// Number of candidate outputs to generate
    pub num_candidates: usize,
    /// Stop sequences to halt generation
    pub stop_sequences: Vec<String>,
    /// Additional provider-specific parameters
    pub extra_params: HashMap<String, serde_json::Value>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: None,
            num_candidates: 1,
            stop_sequences: vec![],
            extra_params: HashMap::new(),
        }
    }
}

/// Configuration for progress reporting
#[derive(Clone)]
pub struct ProgressConfig {
    /// Progress handler for reporting extraction progress
    pub handler: Option<Arc<dyn ProgressHandler>>,
    /// Whether to show progress messages
    pub show_progress: bool,
    /// Whether to show debug information
    pub show_debug: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            handler: None,
            show_progress: true,
            show_debug: false,
        }
    }
}

impl std::fmt::Debug for ProgressConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressConfig")
            .field("handler", &self.handler.as_ref().map(|_| "<ProgressHandler>"))
            .field("show_progress", &self.show_progress)
            .field("show_debug", &self.show_debug)
            .finish()
    }
}

impl Default for LangExtractConfig {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig::default(),
            provider: ProviderConfig::ollama("mistral", None),
            validation: ValidationConfig::default(),
            chunking: ChunkingConfig::default(),
            alignment: AlignmentOptions::default(),
            multipass: MultiPassConfig::default(),
            inference: InferenceConfig::default(),
            progress: ProgressConfig::default(),
        }
    }
}

impl std::fmt::Debug for LangExtractConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LangExtractConfig")
            .field("processing", &self.processing)
            .field("provider", &self.provider)
            .field("validation", &self.validation)
            .field("chunking", &self.chunking)
            .field("alignment", &self.alignment)
            .field("multipass", &self.multipass)
            .field("inference", &self.inference)
            .field("progress", &self.progress)
            .finish()
    }
}

impl LangExtractConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: ProviderConfig) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_processing(mut self, processing: ProcessingConfig) -> Self {
        self.processing = processing;
        self
    }

    pub fn with_validation(mut self, validation: ValidationConfig) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    pub fn with_alignment(mut self, alignment: AlignmentOptions) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_multipass(mut self, multipass: MultiPassConfig) -> Self {
        self.multipass = multipass;
        self
    }

    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    pub fn with_progress(mut self, progress: ProgressConfig) -> Self {
        self.progress = progress;
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.processing.debug = enabled;
        self.progress.show_debug = enabled;
        self
    }

    /// Set maximum characters per chunk
    pub fn with_max_char_buffer(mut self, size: usize) -> Self {
        self.processing.max_char_buffer = size;
        self.chunking.max_chunk_size = size;
        self
    }

    /// Set temperature for inference
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.inference.temperature = temperature.clamp(0.0, 1.0);
        self
    }

    /// Set the number of worker tasks the multi-pass coordinator may run concurrently
    pub fn with_concurrent_chunks(mut self, concurrent_chunks: usize) -> Self {
        self.multipass.concurrent_chunks = concurrent_chunks.max(1);
        self
    }

    /// Set progress handler
    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress.handler = Some(handler);
        self
    }

    /// Enable quiet mode (no progress output)
    pub fn with_quiet_mode(mut self) -> Self {
        self.progress.show_progress = false;
        self.progress.show_debug = false;
        self
    }

    /// Enable verbose mode (show all output)
    pub fn with_verbose_mode(mut self) -> Self {
        self.progress.show_progress = true;
        self.progress.show_debug = true;
        self
    }
}

impl LangExtractConfig {
    /// Create a configuration optimized for OpenAI
    pub fn for_openai(model: &str, api_key: Option<String>) -> Self {
        Self::new().with_provider(ProviderConfig::openai(model, api_key)).with_inference(InferenceConfig {
            temperature: 0.2,
            max_tokens: Some(2000),
            ..Default::default()
        })
    }

    /// Create a configuration optimized for Ollama
    pub fn for_ollama(model: &str, base_url: Option<String>) -> Self {
        Self::new()
            .with_provider(ProviderConfig::ollama(model, base_url))
            .with_inference(InferenceConfig {
                temperature: 0.3,
                max_tokens: Some(1500),
                ..Default::default()
            })
            .with_max_char_buffer(1500)
    }

    /// Create a configuration for high-throughput processing: more
    /// concurrent chunk workers and more passes.
    pub fn for_high_performance() -> Self {
        Self::new().with_concurrent_chunks(8).with_multipass(MultiPassConfig {
            max_passes: 3,
            concurrent_chunks: 8,
            ..Default::default()
        })
    }

    /// Create a configuration for memory-constrained processing: smaller
    /// chunks, fewer concurrent workers.
    pub fn for_memory_efficient() -> Self {
        Self::new().with_max_char_buffer(1000).with_concurrent_chunks(2).with_multipass(MultiPassConfig {
            concurrent_chunks: 2,
            ..Default::default()
        })
    }
}

/// Converts the unified configuration into the flat [`crate::ExtractConfig`]
/// the top-level `extract` entry point consumes.
impl From<LangExtractConfig> for crate::ExtractConfig {
    fn from(config: LangExtractConfig) -> Self {
        let provider_config_value = serde_json::to_value(&config.provider).unwrap_or_default();
        let mut language_model_params = HashMap::new();
        language_model_params.insert("provider_config".to_string(), provider_config_value);

        Self {
            model_id: config.provider.model.clone(),
            api_key: config.provider.api_key.clone(),
            format_type: config.processing.format_type,
            max_char_buffer: config.processing.max_char_buffer,
            temperature: config.inference.temperature,
            fence_output: config.processing.fence_output,
            use_schema_constraints: config.processing.use_schema_constraints,
            batch_length: config.multipass.concurrent_chunks,
            max_workers: config.multipass.concurrent_chunks,
            additional_context: config.processing.additional_context.clone(),
            resolver_params: HashMap::new(),
            language_model_params,
            debug: config.processing.debug,
            model_url: Some(config.provider.base_url.clone()),
            extraction_passes: config.multipass.max_passes,
            enable_multipass: config.multipass.max_passes > 1,
            multipass_min_extractions: 1,
            multipass_quality_threshold: config.multipass.quality_threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LangExtractConfig::default();
        assert_eq!(config.processing.format_type, FormatType::Json);
        assert_eq!(config.processing.max_char_buffer, 2000);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LangExtractConfig::new().with_debug(true).with_max_char_buffer(5000).with_temperature(0.5);

        assert!(config.processing.debug);
        assert_eq!(config.processing.max_char_buffer, 5000);
        assert_eq!(config.chunking.max_chunk_size, 5000);
        assert_eq!(config.inference.temperature, 0.5);
    }

    #[test]
    fn test_specialized_configs() {
        use crate::providers::ProviderType;

        let openai_config = LangExtractConfig::for_openai("gpt-4o", Some("test-key".to_string()));
        assert_eq!(openai_config.provider.provider_type, ProviderType::OpenAI);
        assert_eq!(openai_config.inference.temperature, 0.2);

        let ollama_config = LangExtractConfig::for_ollama("mistral", None);
        assert_eq!(ollama_config.provider.provider_type, ProviderType::Ollama);

        let hp_config = LangExtractConfig::for_high_performance();
        assert_eq!(hp_config.multipass.max_passes, 3);
        assert_eq!(hp_config.multipass.concurrent_chunks, 8);
    }

    #[test]
    fn test_backward_compatibility() {
        let new_config = LangExtractConfig::for_ollama("mistral", None).with_debug(true).with_temperature(0.4);

        let old_config: crate::ExtractConfig = new_config.into();
        assert_eq!(old_config.model_id, "mistral");
        assert!(old_config.debug);
        assert_eq!(old_config.temperature, 0.4);
    }
}
