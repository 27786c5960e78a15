use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CachedTranslation, TranslationCache};
use crate::provider::TranslateProvider;

/// Successful dispatch: the translated text plus where it came from.
#[derive(Clone, Debug)]
pub struct Dispatched {
    pub text: String,
    /// Name of the backend that produced the text (also set on cache hits,
    /// from the entry's original backend).
    pub backend: String,
    pub cache_hit: bool,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("all translation backends failed: {0}")]
    AllBackendsFailed(String),
}

/// Routes translation requests: cache first, then the primary backend, then
/// the secondary backend. Each backend is tried at most once per call — a
/// failure fast-fails to the fallback, never retries in place.
pub struct Dispatcher {
    primary: Box<dyn TranslateProvider>,
    secondary: Option<Box<dyn TranslateProvider>>,
    cache: Mutex<TranslationCache>,
}

impl Dispatcher {
    pub fn new(
        primary: Box<dyn TranslateProvider>,
        secondary: Option<Box<dyn TranslateProvider>>,
        cache_capacity: usize,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache: Mutex::new(TranslationCache::new(cache_capacity)),
        }
    }

    pub fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<Dispatched, DispatchError> {
        let key = CacheKey::new(source, target, text);
        if let Some(hit) = self.cache.lock().expect("cache mutex").get(&key) {
            debug!(backend = %hit.backend, "translation cache hit");
            return Ok(Dispatched {
                text: hit.text,
                backend: hit.backend,
                cache_hit: true,
            });
        }

        let mut last_error = String::new();
        let backends = std::iter::once(&self.primary).chain(self.secondary.as_ref());
        for backend in backends {
            match backend.translate(text, source, target) {
                Ok(translated) => {
                    self.cache.lock().expect("cache mutex").insert(
                        key,
                        CachedTranslation {
                            text: translated.clone(),
                            backend: backend.name().to_string(),
                        },
                    );
                    return Ok(Dispatched {
                        text: translated,
                        backend: backend.name().to_string(),
                        cache_hit: false,
                    });
                }
                Err(e) => {
                    warn!(backend = %backend.name(), error = %e, "translation backend failed");
                    last_error = format!("{}: {e}", backend.name());
                }
            }
        }
        Err(DispatchError::AllBackendsFailed(last_error))
    }
}
