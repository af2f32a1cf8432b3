use super::*;

#[test]
fn test_trailing_separator() {
    assert_eq!(split_words("foo, bar!"), &["foo", "bar", ""]);
}

#[test]
fn test_leading_separator() {
    assert_eq!(split_words(", foo"), &["", "foo"]);
}

#[test]
fn test_empty_text() {
    assert_eq!(tokenize(""), &[""]);
}

#[test]
fn test_only_separators() {
    assert_eq!(split_words("  \t"), &["", ""]);
}

#[test]
fn test_hangul() {
    assert_eq!(split_words("안녕 하세요"), &["안녕", "하세요"]);
}

#[test]
fn test_mixed_scripts() {
    assert_eq!(split_words("hello,안녕"), &["hello", "안녕"]);
}

#[test]
fn test_digits_and_underscore_are_word_chars() {
    assert_eq!(split_words("foo_bar 42"), &["foo_bar", "42"]);
}

#[test]
fn test_apostrophe_is_a_separator() {
    assert_eq!(split_words("doesn't"), &["doesn", "t"]);
}

#[test]
fn test_non_ascii_letters_are_separators() {
    assert_eq!(split_words("café"), &["caf", ""]);
}

#[test]
fn test_hangul_jamo_outside_syllable_block() {
    // U+3131 (HANGUL LETTER KIYEOK) is not a syllable
    assert_eq!(split_words("ㄱ안"), &["", "안"]);
}

#[test]
fn test_tokenize_returns_owned_words() {
    let words = tokenize("teh wrold");
    assert_eq!(words, vec!["teh".to_string(), "wrold".to_string()]);
}
