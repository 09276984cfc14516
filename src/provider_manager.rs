//! Provider registry, alias-based failover and response caching.
//!
//! Wraps the concrete providers in `providers/` with three concerns the
//! individual providers don't own: resolving a model id to an ordered list
//! of candidate provider types (with failover between them), reading
//! credentials with a fixed precedence, and caching identical inference
//! requests with singleflight de-duplication.

use crate::{
    exceptions::{LangExtractError, LangExtractResult},
    inference::{BaseLanguageModel, ScoredOutput},
    providers::{create_provider, ProviderConfig, ProviderType},
    ExtractConfig,
};
use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::env;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OnceCell, RwLock};

/// Resolves a model id to an ordered list of provider types to attempt.
pub struct ProviderRegistry {
    aliases: RwLock<Vec<(String, Vec<ProviderType>)>>,
}

impl ProviderRegistry {
    /// Empty registry, no default aliases.
    pub fn new() -> Self {
        Self {
            aliases: RwLock::new(Vec::new()),
        }
    }

    /// Registry seeded with the provider family's conventional aliases:
    /// `gpt*`/`openai*` -> OpenAI, `llama*`/`mistral*`/`ollama*`/`codellama*`
    /// -> Ollama, falling back to Custom for anything else.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        {
            let mut aliases = registry
                .aliases
                .try_write()
                .expect("registry is freshly constructed, no contention");
            aliases.push(("gpt".to_string(), vec![ProviderType::OpenAI]));
            aliases.push(("openai".to_string(), vec![ProviderType::OpenAI]));
            aliases.push(("mistral".to_string(), vec![ProviderType::Ollama]));
            aliases.push(("llama".to_string(), vec![ProviderType::Ollama]));
            aliases.push(("codellama".to_string(), vec![ProviderType::Ollama]));
            aliases.push(("ollama".to_string(), vec![ProviderType::Ollama]));
        }
        registry
    }

    /// Register an alias pattern (matched as a case-insensitive substring
    /// of the model id) with an ordered failover chain of provider types.
    pub async fn register_alias(&self, pattern: impl Into<String>, candidates: Vec<ProviderType>) {
        let mut aliases = self.aliases.write().await;
        aliases.push((pattern.into(), candidates));
    }

    /// Resolve the ordered candidate list for a model id. The first
    /// matching alias pattern wins; if nothing matches, falls back to
    /// `[Custom]`.
    pub async fn resolve(&self, model_id: &str) -> Vec<ProviderType> {
        let model_lower = model_id.to_lowercase();
        let aliases = self.aliases.read().await;
        for (pattern, candidates) in aliases.iter() {
            if model_lower.contains(pattern.as_str()) {
                return candidates.clone();
            }
        }
        vec![ProviderType::Custom]
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// A cached inference response plus the metrics callers care about.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub outputs: Vec<Vec<ScoredOutput>>,
    pub tokens_used: usize,
    pub latency_ms: u64,
}

struct CacheEntry {
    response: CachedResponse,
    stored_at: Instant,
    ttl: Option<Duration>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.stored_at.elapsed() > ttl,
            None => false,
        }
    }
}

/// Outcome of a cache-aware request, so callers can fold cache hits into
/// metrics without re-deriving them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    Hit,
    Miss,
}

/// A response cache keyed by `hash(model_id, prompt, options)`, with
/// at-most-once fill per key so concurrent identical requests share one
/// underlying network call.
pub struct ResponseCache {
    entries: Mutex<HashMap<u64, Arc<OnceCell<CacheEntry>>>>,
    default_ttl: Option<Duration>,
    hits: std::sync::atomic::AtomicU64,
    misses: std::sync::atomic::AtomicU64,
}

impl ResponseCache {
    pub fn new(default_ttl: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl,
            hits: std::sync::atomic::AtomicU64::new(0),
            misses: std::sync::atomic::AtomicU64::new(0),
        }
    }

    pub fn cache_key(model_id: &str, prompt: &str, options: &serde_json::Value) -> u64 {
        let mut hasher = DefaultHasher::new();
        model_id.hash(&mut hasher);
        prompt.hash(&mut hasher);
        options.to_string().hash(&mut hasher);
        hasher.finish()
    }

    /// Fetch a cached response for `key`, or compute and store it via
    /// `compute`. Concurrent callers for the same key block on the same
    /// in-flight computation rather than each dispatching their own call.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: u64,
        compute: F,
    ) -> LangExtractResult<(CachedResponse, CacheOutcome)>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = LangExtractResult<CachedResponse>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            if let Some(existing) = entries.get(&key) {
                if existing.get().map(|e| e.is_expired()).unwrap_or(false) {
                    entries.insert(key, Arc::new(OnceCell::new()));
                }
            } else {
                entries.insert(key, Arc::new(OnceCell::new()));
            }
            entries.get(&key).unwrap().clone()
        };

        let already_filled = cell.initialized();
        let ttl = self.default_ttl;
        let entry = cell
            .get_or_try_init(|| async move {
                let response = compute().await?;
                Ok::<CacheEntry, LangExtractError>(CacheEntry {
                    response,
                    stored_at: Instant::now(),
                    ttl,
                })
            })
            .await?;

        if already_filled {
            self.hits.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }

        let outcome = if already_filled { CacheOutcome::Hit } else { CacheOutcome::Miss };
        Ok((entry.response.clone(), outcome))
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(std::sync::atomic::Ordering::Relaxed)
    }

    /// Drop all cached entries. Intended for test reset hooks.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// Resolve credentials for a provider type following the fixed precedence:
/// explicit config value > provider-specific env var > shared fallback env
/// var.
fn resolve_api_key(config: &ExtractConfig, provider_env_var: &str) -> Option<String> {
    config
        .api_key
        .clone()
        .or_else(|| env::var(provider_env_var).ok())
        .or_else(|| env::var("LANGEXTRACT_API_KEY").ok())
}

fn build_provider_config(config: &ExtractConfig, provider_type: ProviderType) -> LangExtractResult<ProviderConfig> {
    match provider_type {
        ProviderType::OpenAI => {
            let api_key = resolve_api_key(config, "OPENAI_API_KEY");
            let mut provider_config = ProviderConfig::openai(&config.model_id, api_key);
            if let Some(url) = &config.model_url {
                provider_config = provider_config.with_base_url(url.clone());
            }
            Ok(provider_config)
        }
        ProviderType::Ollama => {
            let base_url = config
                .model_url
                .clone()
                .or_else(|| env::var("OLLAMA_BASE_URL").ok())
                .unwrap_or_else(|| "http://localhost:11434".to_string());
            Ok(ProviderConfig::ollama(&config.model_id, Some(base_url)))
        }
        ProviderType::Custom => {
            let base_url = config
                .model_url
                .as_ref()
                .ok_or_else(|| LangExtractError::configuration("model_url is required for custom providers"))?;
            let mut provider_config = ProviderConfig::custom(base_url, &config.model_id);
            if let Some(api_key) = resolve_api_key(config, "LANGEXTRACT_CUSTOM_API_KEY") {
                provider_config = provider_config.with_api_key(api_key);
            }
            Ok(provider_config)
        }
    }
}

/// The caller-facing façade: registry + cache behind one handle.
pub struct ProviderManager {
    registry: ProviderRegistry,
    cache: ResponseCache,
}

impl ProviderManager {
    pub fn new(default_cache_ttl: Option<Duration>) -> Self {
        Self {
            registry: ProviderRegistry::with_defaults(),
            cache: ResponseCache::new(default_cache_ttl),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Run inference for a single prompt, trying each candidate provider in
    /// order on transport/provider failure, and serving from cache when
    /// possible.
    pub async fn infer_single(
        &self,
        config: &ExtractConfig,
        prompt: &str,
        kwargs: &HashMap<String, serde_json::Value>,
    ) -> LangExtractResult<(Vec<ScoredOutput>, CacheOutcome)> {
        let options_key = serde_json::to_value(kwargs).unwrap_or(serde_json::Value::Null);
        let key = ResponseCache::cache_key(&config.model_id, prompt, &options_key);

        let candidates = self.registry.resolve(&config.model_id).await;
        let prompt_owned = prompt.to_string();
        let kwargs_owned = kwargs.clone();
        let config_owned = config.clone();

        let (cached, outcome) = self
            .cache
            .get_or_compute(key, move || async move {
                let started = Instant::now();
                let outputs = Self::infer_with_failover(&config_owned, &candidates, &prompt_owned, &kwargs_owned).await?;
                let tokens_used = outputs.iter().map(|o| o.text().len() / 4).sum();
                Ok(CachedResponse {
                    outputs: vec![outputs],
                    tokens_used,
                    latency_ms: started.elapsed().as_millis() as u64,
                })
            })
            .await?;

        let outputs = cached.outputs.into_iter().next().unwrap_or_default();
        Ok((outputs, outcome))
    }

    async fn infer_with_failover(
        config: &ExtractConfig,
        candidates: &[ProviderType],
        prompt: &str,
        kwargs: &HashMap<String, serde_json::Value>,
    ) -> LangExtractResult<Vec<ScoredOutput>> {
        let mut last_error = None;

        for &provider_type in candidates {
            let provider_config = match build_provider_config(config, provider_type) {
                Ok(cfg) => cfg,
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };

            let provider: Box<dyn BaseLanguageModel> = match create_provider(provider_config) {
                Ok(p) => Box::new(p),
                Err(e) => {
                    last_error = Some(e);
                    continue;
                }
            };

            match provider.infer_single(prompt, kwargs).await {
                Ok(outputs) => return Ok(outputs),
                Err(e) => {
                    log::warn!("provider {:?} failed, trying next candidate: {}", provider_type, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LangExtractError::inference_simple("no provider candidates registered for this model id")
        }))
    }
}

/// Adapts a `ProviderManager` + `ExtractConfig` pair into a single
/// `BaseLanguageModel`, so callers that only know how to drive one model
/// (the annotator, the multi-pass coordinator) transparently get failover
/// and response caching without knowing about the registry.
pub struct ManagedModel {
    manager: Arc<ProviderManager>,
    config: ExtractConfig,
}

impl ManagedModel {
    pub fn new(manager: Arc<ProviderManager>, config: ExtractConfig) -> Self {
        Self { manager, config }
    }
}

#[async_trait]
impl BaseLanguageModel for ManagedModel {
    fn requires_fence_output(&self) -> bool {
        // Conservative default: without committing to one candidate ahead
        // of the per-call failover, assume fencing is needed.
        true
    }

    async fn infer(
        &self,
        batch_prompts: &[String],
        kwargs: &HashMap<String, serde_json::Value>,
    ) -> LangExtractResult<Vec<Vec<ScoredOutput>>> {
        let mut results = Vec::with_capacity(batch_prompts.len());
        for prompt in batch_prompts {
            let (outputs, _outcome) = self.manager.infer_single(&self.config, prompt, kwargs).await?;
            results.push(outputs);
        }
        Ok(results)
    }

    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    fn provider_name(&self) -> &str {
        "managed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registry_resolves_known_aliases() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.resolve("gpt-4").await, vec![ProviderType::OpenAI]);
        assert_eq!(registry.resolve("llama2").await, vec![ProviderType::Ollama]);
        assert_eq!(registry.resolve("some-custom-model").await, vec![ProviderType::Custom]);
    }

    #[tokio::test]
    async fn registry_custom_alias_overrides_default_fallback() {
        let registry = ProviderRegistry::with_defaults();
        registry
            .register_alias("acme", vec![ProviderType::Custom, ProviderType::Ollama])
            .await;
        assert_eq!(
            registry.resolve("acme-7b").await,
            vec![ProviderType::Custom, ProviderType::Ollama]
        );
    }

    #[tokio::test]
    async fn cache_hits_second_identical_call() {
        let cache = ResponseCache::new(None);
        let key = ResponseCache::cache_key("model", "prompt", &serde_json::Value::Null);
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let (_, outcome) = cache
                .get_or_compute(key, move || async move {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok(CachedResponse {
                        outputs: vec![vec![ScoredOutput::from_text("x".to_string())]],
                        tokens_used: 1,
                        latency_ms: 0,
                    })
                })
                .await
                .unwrap();
            let _ = outcome;
        }

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[tokio::test]
    async fn cache_respects_ttl_expiry() {
        let cache = ResponseCache::new(Some(Duration::from_millis(10)));
        let key = ResponseCache::cache_key("model", "prompt", &serde_json::Value::Null);
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));

        let compute = || {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Ok(CachedResponse {
                    outputs: vec![],
                    tokens_used: 0,
                    latency_ms: 0,
                })
            }
        };

        cache.get_or_compute(key, compute).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        cache.get_or_compute(key, compute).await.unwrap();

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }
}
