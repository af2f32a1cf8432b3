use regex::Regex;

lazy_static! {
    // Anything that is neither a word character nor a Hangul syllable
    // separates two words.
    // Note: `\w` is restricted to ASCII on purpose: 'café' is split
    // into 'caf' and ''
    static ref WORD_SEPARATOR_RE: Regex =
        Regex::new(r"[^A-Za-z0-9_가-힣]+").expect("syntax error in static regex");
}

/// Split `text` on every run of separators.
///
/// Nothing is trimmed or filtered: a leading or trailing separator yields an
/// empty word, and the empty string yields a single empty word. The position
/// of each word in the returned vector is the position of its result in a
/// batch.
pub fn split_words(text: &str) -> Vec<&str> {
    WORD_SEPARATOR_RE.split(text).collect()
}

pub fn tokenize(text: &str) -> Vec<String> {
    split_words(text).into_iter().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests;
