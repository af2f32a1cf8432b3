use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::Dictionary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Correctness, plus the best suggestion for misspelled words
    Check,
    /// Correctness, plus every suggestion for misspelled words
    Suggest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordResult {
    pub word: String,
    pub correct: bool,
    pub suggestions: Vec<String>,
}

impl WordResult {
    // Used when the engine could not process the word
    fn failed(word: String) -> Self {
        Self {
            word,
            correct: false,
            suggestions: vec![],
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum BatchError {
    #[error("Checking {words} words did not complete within {after:?}")]
    Timeout { words: usize, after: Duration },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub timeout: Option<Duration>,
    // Only used in Suggest mode
    pub max_suggestions: Option<usize>,
    /// How many words of one batch may be checked at the same time.
    /// Defaults to the number of CPUs.
    pub max_concurrency: Option<usize>,
}

impl BatchOptions {
    fn concurrency(&self) -> usize {
        self.max_concurrency
            .or_else(|| std::thread::available_parallelism().ok().map(usize::from))
            .unwrap_or(4)
            .max(1)
    }
}

/// Check every word concurrently and return one result per word, in the
/// same order as `words`.
///
/// An empty list of words gives an empty list of results right away.
pub async fn run_batch<D: Dictionary>(
    dict: Arc<D>,
    words: Vec<String>,
    mode: Mode,
    options: BatchOptions,
) -> Result<Vec<WordResult>, BatchError> {
    if words.is_empty() {
        return Ok(vec![]);
    }

    let count = words.len();
    let gathered = gather(dict, words, mode, options);
    let results = match options.timeout {
        None => gathered.await,
        Some(after) => tokio::time::timeout(after, gathered)
            .await
            .map_err(|_| BatchError::Timeout {
                words: count,
                after,
            })?,
    };
    debug!(words = count, ?mode, "batch complete");
    Ok(results)
}

async fn gather<D: Dictionary>(
    dict: Arc<D>,
    words: Vec<String>,
    mode: Mode,
    options: BatchOptions,
) -> Vec<WordResult> {
    // The engine is CPU bound, so words are checked on the blocking pool.
    // A word is only handed over once a permit is free: when this future is
    // dropped (on timeout) the remaining words are never submitted.
    let permits = Arc::new(Semaphore::new(options.concurrency()));
    let mut tasks = Vec::with_capacity(words.len());
    for word in words {
        // The semaphore is never closed, but a word still gets a result if it is
        let task = Arc::clone(&permits).acquire_owned().await.ok().map(|permit| {
            let dict = Arc::clone(&dict);
            let task_word = word.clone();
            let max_suggestions = options.max_suggestions;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                process_word(dict.as_ref(), task_word, mode, max_suggestions)
            })
        });
        tasks.push((word, task));
    }

    // Joining in submission order is what keeps results in source order
    let mut results = Vec::with_capacity(tasks.len());
    for (word, task) in tasks {
        let Some(task) = task else {
            results.push(WordResult::failed(word));
            continue;
        };
        let result = match task.await {
            Ok(result) => result,
            Err(e) => {
                warn!(word = %word, error = %e, "word check task failed");
                WordResult::failed(word)
            }
        };
        results.push(result);
    }
    results
}

fn process_word<D: Dictionary>(
    dict: &D,
    word: String,
    mode: Mode,
    max_suggestions: Option<usize>,
) -> WordResult {
    let correct = match dict.check(&word) {
        Ok(correct) => correct,
        Err(e) => {
            warn!(word = %word, lang = dict.lang(), error = %e, "engine error");
            return WordResult::failed(word);
        }
    };

    let mut suggestions = if correct { vec![] } else { dict.suggest(&word) };
    match mode {
        Mode::Check => suggestions.truncate(1),
        Mode::Suggest => {
            if let Some(max) = max_suggestions {
                suggestions.truncate(max);
            }
        }
    }

    debug!(word = %word, correct, ?mode, "word checked");
    WordResult {
        word,
        correct,
        suggestions,
    }
}
