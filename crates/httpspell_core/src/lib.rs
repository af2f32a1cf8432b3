#![deny(clippy::unwrap_used)]

#[macro_use]
extern crate lazy_static;

mod batch;
mod cache;
mod dictionary;
mod hunspell;

pub mod tokens;

pub use batch::{run_batch, BatchError, BatchOptions, Mode, WordResult};
pub use cache::{CacheOptions, DictionaryCache, EvictionPolicy, LoadError};
pub use dictionary::{Dictionary, DictionaryBuilder, EngineError};
pub use hunspell::{HunspellBuilder, HunspellDictionary};
pub use tokens::{split_words, tokenize};
