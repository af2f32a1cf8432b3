use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::DictionaryBuilder;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("Could not read '{}': {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("Could not initialize dictionary for lang '{lang}': {reason}")]
    EngineInitFailed { lang: String, reason: String },

    #[error("Invalid language code: '{0}'")]
    InvalidLanguage(String),

    #[error("Loading dictionary for lang '{lang}' timed out after {after:?}")]
    Timeout { lang: String, after: Duration },
}

impl LoadError {
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::ResourceUnavailable { .. } => "ResourceUnavailable",
            LoadError::EngineInitFailed { .. } => "EngineInitFailed",
            LoadError::InvalidLanguage(_) => "InvalidLanguage",
            LoadError::Timeout { .. } => "Timeout",
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            LoadError::ResourceUnavailable { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// Dictionaries stay loaded until the process exits
    #[default]
    KeepForever,
    /// Keep at most `capacity` dictionaries, dropping the least recently used one
    Lru { capacity: usize },
}

#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub dictionary_root: PathBuf,
    pub load_timeout: Option<Duration>,
    pub eviction: EvictionPolicy,
}

impl CacheOptions {
    pub fn new(dictionary_root: impl Into<PathBuf>) -> Self {
        Self {
            dictionary_root: dictionary_root.into(),
            load_timeout: None,
            eviction: EvictionPolicy::KeepForever,
        }
    }

    pub fn resource_paths(&self, lang: &str) -> (PathBuf, PathBuf) {
        (
            self.dictionary_root.join(format!("{lang}.aff")),
            self.dictionary_root.join(format!("{lang}.dic")),
        )
    }
}

// None until the load is over
type Outcome<D> = Option<Result<Arc<D>, LoadError>>;

struct Entry<D> {
    dict: Arc<D>,
    last_used: AtomicU64,
}

enum Slot<D> {
    Loading(watch::Receiver<Outcome<D>>),
    Ready(Entry<D>),
}

enum Lookup<D> {
    Ready(Arc<D>),
    Wait(watch::Receiver<Outcome<D>>),
}

struct Inner<B: DictionaryBuilder> {
    builder: B,
    options: CacheOptions,
    slots: RwLock<HashMap<String, Slot<B::Dictionary>>>,
    clock: AtomicU64,
    loads_started: AtomicUsize,
}

/// Maps language codes to loaded dictionaries.
///
/// A dictionary is read from disk the first time its language is requested.
/// Concurrent requests for a language that is being loaded wait for that
/// load instead of starting their own, and all of them get the same
/// outcome. A failed load leaves nothing behind, so the next request tries
/// again.
///
/// Cloning the cache is cheap and the clones share their state.
pub struct DictionaryCache<B: DictionaryBuilder> {
    inner: Arc<Inner<B>>,
}

impl<B: DictionaryBuilder> Clone for DictionaryCache<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: DictionaryBuilder> DictionaryCache<B> {
    pub fn new(builder: B, options: CacheOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                builder,
                options,
                slots: RwLock::new(HashMap::new()),
                clock: AtomicU64::new(0),
                loads_started: AtomicUsize::new(0),
            }),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.inner.options
    }

    pub async fn load(&self, lang: &str) -> Result<Arc<B::Dictionary>, LoadError> {
        validate_lang(lang)?;

        if let Some(dict) = self.inner.get_ready(lang) {
            debug!(lang, "dictionary served from cache");
            return Ok(dict);
        }

        let mut receiver = match self.inner.join_or_start(lang) {
            Lookup::Ready(dict) => return Ok(dict),
            Lookup::Wait(receiver) => receiver,
        };

        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(outcome) => outcome.clone(),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| {
            Err(LoadError::EngineInitFailed {
                lang: lang.to_owned(),
                reason: "load task was aborted".to_owned(),
            })
        })
    }

    pub fn is_cached(&self, lang: &str) -> bool {
        matches!(self.inner.slots.read().get(lang), Some(Slot::Ready(_)))
    }

    pub fn cached_languages(&self) -> Vec<String> {
        let slots = self.inner.slots.read();
        let mut res: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(_)))
            .map(|(lang, _)| lang.clone())
            .collect();
        res.sort();
        res
    }

    /// How many loads were started since the cache was created
    pub fn loads_started(&self) -> usize {
        self.inner.loads_started.load(Ordering::SeqCst)
    }
}

impl<B: DictionaryBuilder> Inner<B> {
    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn get_ready(&self, lang: &str) -> Option<Arc<B::Dictionary>> {
        let slots = self.slots.read();
        match slots.get(lang) {
            Some(Slot::Ready(entry)) => {
                entry.last_used.store(self.tick(), Ordering::Relaxed);
                Some(Arc::clone(&entry.dict))
            }
            _ => None,
        }
    }

    fn join_or_start(self: &Arc<Self>, lang: &str) -> Lookup<B::Dictionary> {
        let mut slots = self.slots.write();
        match slots.get(lang) {
            // The entry may have been published between the read and the write lock
            Some(Slot::Ready(entry)) => {
                entry.last_used.store(self.tick(), Ordering::Relaxed);
                return Lookup::Ready(Arc::clone(&entry.dict));
            }
            // A closed channel means the loading task died without publishing
            // anything, start over in this case
            Some(Slot::Loading(receiver)) if receiver.has_changed().is_ok() => {
                debug!(lang, "waiting for in-flight load");
                return Lookup::Wait(receiver.clone());
            }
            _ => (),
        }

        let (sender, receiver) = watch::channel(None);
        slots.insert(lang.to_owned(), Slot::Loading(receiver.clone()));
        drop(slots);

        // The load runs in its own task so that it completes and
        // wakes up the other waiters even if this caller goes away
        let inner = Arc::clone(self);
        tokio::spawn(inner.run_load(lang.to_owned(), sender));
        Lookup::Wait(receiver)
    }

    async fn run_load(
        self: Arc<Self>,
        lang: String,
        sender: watch::Sender<Outcome<B::Dictionary>>,
    ) {
        self.loads_started.fetch_add(1, Ordering::SeqCst);
        let outcome = match self.options.load_timeout {
            None => self.read_and_build(&lang).await,
            Some(after) => tokio::time::timeout(after, self.read_and_build(&lang))
                .await
                .unwrap_or_else(|_| {
                    Err(LoadError::Timeout {
                        lang: lang.clone(),
                        after,
                    })
                }),
        };
        let outcome = outcome.map(Arc::new);

        match &outcome {
            Ok(_) => info!(lang = %lang, "dictionary loaded"),
            Err(e) => warn!(lang = %lang, error = %e, "could not load dictionary"),
        }

        sender.send_replace(Some(outcome.clone()));
        self.publish(&lang, outcome);
    }

    fn publish(&self, lang: &str, outcome: Result<Arc<B::Dictionary>, LoadError>) {
        let mut slots = self.slots.write();
        let dict = match outcome {
            Ok(d) => d,
            Err(_) => {
                slots.remove(lang);
                return;
            }
        };
        let entry = Entry {
            dict,
            last_used: AtomicU64::new(self.tick()),
        };
        slots.insert(lang.to_owned(), Slot::Ready(entry));

        if let EvictionPolicy::Lru { capacity } = self.options.eviction {
            evict_least_recently_used(&mut slots, capacity.max(1));
        }
    }

    async fn read_and_build(self: &Arc<Self>, lang: &str) -> Result<B::Dictionary, LoadError> {
        let (aff_path, dic_path) = self.options.resource_paths(lang);
        let aff = read_resource(&aff_path).await?;
        let dic = read_resource(&dic_path).await?;
        debug!(lang, aff = %aff_path.display(), dic = %dic_path.display(), "building dictionary");

        let inner = Arc::clone(self);
        let owned_lang = lang.to_owned();
        let built =
            tokio::task::spawn_blocking(move || inner.builder.build(&owned_lang, aff, dic)).await;
        match built {
            Ok(Ok(dict)) => Ok(dict),
            Ok(Err(e)) => Err(LoadError::EngineInitFailed {
                lang: lang.to_owned(),
                reason: e.0,
            }),
            Err(e) => Err(LoadError::EngineInitFailed {
                lang: lang.to_owned(),
                reason: format!("dictionary construction failed: {e}"),
            }),
        }
    }
}

fn evict_least_recently_used<D>(slots: &mut HashMap<String, Slot<D>>, capacity: usize) {
    loop {
        let ready: Vec<(&String, u64)> = slots
            .iter()
            .filter_map(|(lang, slot)| match slot {
                Slot::Ready(entry) => Some((lang, entry.last_used.load(Ordering::Relaxed))),
                Slot::Loading(_) => None,
            })
            .collect();
        if ready.len() <= capacity {
            return;
        }
        let oldest = match ready.into_iter().min_by_key(|(_, last_used)| *last_used) {
            Some((lang, _)) => lang.clone(),
            None => return,
        };
        info!(lang = %oldest, "evicting dictionary");
        slots.remove(&oldest);
    }
}

async fn read_resource(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| LoadError::ResourceUnavailable {
            path: path.to_path_buf(),
            source: Arc::new(e),
        })
}

// Language codes end up in file names, so only accept things
// like 'ko', 'en_US' or 'de-AT'
fn validate_lang(lang: &str) -> Result<(), LoadError> {
    let valid = !lang.is_empty()
        && lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(LoadError::InvalidLanguage(lang.to_owned()))
    }
}

#[cfg(test)]
mod tests;
