use encoding_rs::{Encoding, UTF_8};
use tracing::debug;

use crate::{Dictionary, DictionaryBuilder, EngineError};

/// A Hunspell dictionary, parsed by spellbook
pub struct HunspellDictionary {
    dict: spellbook::Dictionary,
    lang: String,
}

impl HunspellDictionary {
    pub fn new(lang: &str, aff: &str, dic: &str) -> Result<Self, EngineError> {
        let dict = spellbook::Dictionary::new(aff, dic).map_err(|e| {
            EngineError(format!("Could not parse dictionary for lang '{lang}': {e}"))
        })?;
        Ok(Self {
            dict,
            lang: lang.to_string(),
        })
    }
}

impl Dictionary for HunspellDictionary {
    fn check(&self, word: &str) -> Result<bool, EngineError> {
        Ok(self.dict.check(word))
    }

    fn suggest(&self, error: &str) -> Vec<String> {
        let mut suggestions = Vec::new();
        self.dict.suggest(error, &mut suggestions);
        suggestions
    }

    fn lang(&self) -> &str {
        &self.lang
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HunspellBuilder;

impl DictionaryBuilder for HunspellBuilder {
    type Dictionary = HunspellDictionary;

    fn build(
        &self,
        lang: &str,
        aff: Vec<u8>,
        dic: Vec<u8>,
    ) -> Result<HunspellDictionary, EngineError> {
        let encoding = match declared_encoding(&aff) {
            None => UTF_8,
            Some(label) => encoding_for_label(&label).ok_or_else(|| {
                EngineError(format!("{lang}.aff: unsupported encoding '{label}'"))
            })?,
        };
        let aff = decode(encoding, &aff, &format!("{lang}.aff"))?;
        let dic = decode(encoding, &dic, &format!("{lang}.dic"))?;
        if encoding == UTF_8 {
            return HunspellDictionary::new(lang, &aff, &dic);
        }
        debug!(lang, encoding = encoding.name(), "dictionary decoded to UTF-8");
        HunspellDictionary::new(lang, &declare_utf8(&aff), &dic)
    }
}

/// Value of the `SET` directive of an affix file, if any
fn declared_encoding(aff: &[u8]) -> Option<String> {
    let aff = aff.strip_prefix(b"\xef\xbb\xbf").unwrap_or(aff);
    aff.split(|b| *b == b'\n').find_map(|line| {
        let line = std::str::from_utf8(line).ok()?.trim();
        let (directive, value) = line.split_once(char::is_whitespace)?;
        (directive == "SET").then(|| value.trim().to_string())
    })
}

// Hunspell names some encodings differently from the WHATWG labels
fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    let label = match label.to_ascii_lowercase().as_str() {
        "microsoft-cp1251" => "windows-1251",
        "tis620-2533" => "tis-620",
        _ => label,
    };
    Encoding::for_label(label.as_bytes())
}

fn decode(encoding: &'static Encoding, bytes: &[u8], name: &str) -> Result<String, EngineError> {
    let bytes = if encoding == UTF_8 {
        bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes)
    } else {
        bytes
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| EngineError(format!("{name} is not valid {}", encoding.name())))
}

// The contents are now UTF-8, so the affix file must say so
fn declare_utf8(aff: &str) -> String {
    aff.lines()
        .map(|line| match line.trim().split_once(char::is_whitespace) {
            Some(("SET", _)) => "SET UTF-8",
            _ => line,
        })
        .collect::<Vec<_>>()
        .join("\n")
}
