use std::time::Duration;

use super::*;

use crate::tests::{get_test_dir, write_dictionary, write_test_dictionary, FakeBuilder};
use crate::{Dictionary, HunspellBuilder};

fn new_cache(builder: FakeBuilder, root: &Path) -> DictionaryCache<FakeBuilder> {
    DictionaryCache::new(builder, CacheOptions::new(root))
}

#[tokio::test]
async fn test_load_hunspell_dictionary() {
    let temp_dir = get_test_dir();
    write_test_dictionary(temp_dir.path(), "ko");
    let cache = DictionaryCache::new(HunspellBuilder, CacheOptions::new(temp_dir.path()));

    let dict = cache.load("ko").await.unwrap();

    assert_eq!(dict.lang(), "ko");
    assert!(dict.check("안녕").unwrap());
    assert!(cache.is_cached("ko"));
}

#[tokio::test]
async fn test_load_latin1_hunspell_dictionary() {
    let temp_dir = get_test_dir();
    std::fs::write(temp_dir.path().join("fr.aff"), b"SET ISO8859-1\n").unwrap();
    std::fs::write(temp_dir.path().join("fr.dic"), b"1\ncaf\xe9\n").unwrap();
    let cache = DictionaryCache::new(HunspellBuilder, CacheOptions::new(temp_dir.path()));

    let dict = cache.load("fr").await.unwrap();

    assert!(dict.check("café").unwrap());
}

#[tokio::test]
async fn test_second_load_is_served_from_cache() {
    let temp_dir = get_test_dir();
    write_dictionary(temp_dir.path(), "en", "", "hello\n");
    let builder = FakeBuilder::new();
    let cache = new_cache(builder.clone(), temp_dir.path());

    let first = cache.load("en").await.unwrap();
    // Removing the files proves the second call does not touch the disk
    std::fs::remove_file(temp_dir.path().join("en.aff")).unwrap();
    std::fs::remove_file(temp_dir.path().join("en.dic")).unwrap();
    let second = cache.load("en").await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(builder.builds(), 1);
    assert_eq!(cache.loads_started(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loads_build_once() {
    let temp_dir = get_test_dir();
    write_dictionary(temp_dir.path(), "en", "", "hello\n");
    let builder = FakeBuilder::new().with_delay(Duration::from_millis(100));
    let cache = new_cache(builder.clone(), temp_dir.path());

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.load("en").await })
        })
        .collect();
    let mut dicts = vec![];
    for handle in handles {
        dicts.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(builder.builds(), 1);
    assert_eq!(cache.loads_started(), 1);
    for dict in &dicts {
        assert!(Arc::ptr_eq(dict, &dicts[0]));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_loads_share_the_same_failure() {
    let temp_dir = get_test_dir();
    write_dictionary(temp_dir.path(), "en", "", "hello\n");
    let builder = FakeBuilder::new()
        .with_delay(Duration::from_millis(100))
        .failing("bad affix file");
    let cache = new_cache(builder.clone(), temp_dir.path());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.load("en").await })
        })
        .collect();
    for handle in handles {
        let err = handle.await.unwrap().err().unwrap();
        match err {
            LoadError::EngineInitFailed { lang, reason } => {
                assert_eq!(lang, "en");
                assert_eq!(reason, "bad affix file");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(builder.builds(), 1);
    assert!(!cache.is_cached("en"));
}

#[tokio::test]
async fn test_missing_resources() {
    let temp_dir = get_test_dir();
    let builder = FakeBuilder::new();
    let cache = new_cache(builder.clone(), temp_dir.path());

    let err = cache.load("xx").await.err().unwrap();

    assert_eq!(err.kind(), "ResourceUnavailable");
    assert_eq!(err.path().unwrap(), temp_dir.path().join("xx.aff"));
    assert_eq!(builder.builds(), 0);
}

#[tokio::test]
async fn test_missing_word_list() {
    let temp_dir = get_test_dir();
    std::fs::write(temp_dir.path().join("en.aff"), "").unwrap();
    let cache = new_cache(FakeBuilder::new(), temp_dir.path());

    let err = cache.load("en").await.err().unwrap();

    assert_eq!(err.path().unwrap(), temp_dir.path().join("en.dic"));
}

#[tokio::test]
async fn test_failed_load_is_retried() {
    let temp_dir = get_test_dir();
    let builder = FakeBuilder::new();
    let cache = new_cache(builder.clone(), temp_dir.path());

    assert!(cache.load("en").await.is_err());
    assert!(cache.cached_languages().is_empty());

    write_dictionary(temp_dir.path(), "en", "", "hello\n");
    let dict = cache.load("en").await.unwrap();

    assert!(dict.check("hello").unwrap());
    assert_eq!(cache.loads_started(), 2);
}

#[tokio::test]
async fn test_failure_does_not_affect_other_languages() {
    let temp_dir = get_test_dir();
    write_dictionary(temp_dir.path(), "en", "", "hello\n");
    let cache = new_cache(FakeBuilder::new(), temp_dir.path());

    cache.load("en").await.unwrap();
    assert!(cache.load("fr").await.is_err());

    assert_eq!(cache.cached_languages(), &["en"]);
}

#[tokio::test]
async fn test_invalid_language_codes() {
    let temp_dir = get_test_dir();
    let cache = new_cache(FakeBuilder::new(), temp_dir.path());

    for lang in ["", "../secret", "en/US", "ko.aff"] {
        let err = cache.load(lang).await.err().unwrap();
        assert_eq!(err.kind(), "InvalidLanguage", "for {lang:?}");
    }
    assert_eq!(cache.loads_started(), 0);
}

#[tokio::test]
async fn test_load_timeout() {
    let temp_dir = get_test_dir();
    write_dictionary(temp_dir.path(), "en", "", "hello\n");
    let builder = FakeBuilder::new().with_delay(Duration::from_millis(500));
    let mut options = CacheOptions::new(temp_dir.path());
    options.load_timeout = Some(Duration::from_millis(20));
    let cache = DictionaryCache::new(builder, options);

    let err = cache.load("en").await.err().unwrap();

    assert_eq!(err.kind(), "Timeout");
    assert!(!cache.is_cached("en"));
}

#[tokio::test]
async fn test_keep_forever_never_evicts() {
    let temp_dir = get_test_dir();
    for lang in ["a", "b", "c"] {
        write_dictionary(temp_dir.path(), lang, "", "word\n");
    }
    let cache = new_cache(FakeBuilder::new(), temp_dir.path());

    for lang in ["a", "b", "c"] {
        cache.load(lang).await.unwrap();
    }

    assert_eq!(cache.cached_languages(), &["a", "b", "c"]);
}

#[tokio::test]
async fn test_lru_eviction() {
    let temp_dir = get_test_dir();
    for lang in ["a", "b", "c"] {
        write_dictionary(temp_dir.path(), lang, "", "word\n");
    }
    let builder = FakeBuilder::new();
    let mut options = CacheOptions::new(temp_dir.path());
    options.eviction = EvictionPolicy::Lru { capacity: 2 };
    let cache = DictionaryCache::new(builder.clone(), options);

    cache.load("a").await.unwrap();
    cache.load("b").await.unwrap();
    // 'a' is now more recent than 'b'
    cache.load("a").await.unwrap();
    cache.load("c").await.unwrap();

    assert_eq!(cache.cached_languages(), &["a", "c"]);

    // 'b' was evicted and gets loaded again
    cache.load("b").await.unwrap();
    assert_eq!(builder.builds(), 4);
    assert_eq!(cache.cached_languages(), &["b", "c"]);
}

#[test]
fn test_resource_paths() {
    let options = CacheOptions::new("/srv/dict");
    let (aff, dic) = options.resource_paths("ko");
    assert_eq!(aff, Path::new("/srv/dict/ko.aff"));
    assert_eq!(dic, Path::new("/srv/dict/ko.dic"));
}

#[test]
fn test_parse_eviction_policy() {
    let policy: EvictionPolicy =
        serde_json::from_str(r#"{"policy": "lru", "capacity": 3}"#).unwrap();
    assert_eq!(policy, EvictionPolicy::Lru { capacity: 3 });

    let policy: EvictionPolicy = serde_json::from_str(r#"{"policy": "keep-forever"}"#).unwrap();
    assert_eq!(policy, EvictionPolicy::KeepForever);
}
