use thiserror::Error;

/// Failure reported by the spell-checking engine itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

pub trait Dictionary: Send + Sync + 'static {
    // Check if the word is found in the dictionary
    fn check(&self, word: &str) -> Result<bool, EngineError>;
    // Suggest replacement for error string
    fn suggest(&self, error: &str) -> Vec<String>;
    fn lang(&self) -> &str;
}

// Builds a dictionary from the contents of the affix file and
// of the word list, both already read from disk
pub trait DictionaryBuilder: Send + Sync + 'static {
    type Dictionary: Dictionary;

    fn build(&self, lang: &str, aff: Vec<u8>, dic: Vec<u8>)
        -> Result<Self::Dictionary, EngineError>;
}
