use std::sync::Arc;

use reportd_bus::mock::{EntryFixture, MockBus};
use reportd_core::ProblemRef;

use super::*;

fn elements(count: usize) -> Vec<(String, Vec<u8>)> {
    (0..count).map(|i| (format!("e{i}"), format!("content-{i}").into_bytes())).collect()
}

#[tokio::test]
async fn cache_hit_makes_zero_bus_calls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    std::fs::create_dir(root.join("42")).expect("mkdir");

    let bus = Arc::new(MockBus::new());
    let cache = ProblemCache::new(root.clone(), bus.clone());

    let path = cache
        .get_working_directory(&ProblemRef::new("/org/freedesktop/Problems2/Entry/42"))
        .await
        .expect("cache hit");

    assert_eq!(path, root.join("42"));
    assert!(bus.read_elements_batches("42").is_empty());
}

#[tokio::test]
async fn pull_seventeen_elements_issues_two_batches_of_sixteen_then_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let bus = Arc::new(MockBus::new().with_entry("42", EntryFixture::with_elements(elements(17))));
    let cache = ProblemCache::new(root.clone(), bus.clone());

    let path = cache
        .get_working_directory(&ProblemRef::new("/org/freedesktop/Problems2/Entry/42"))
        .await
        .expect("pull");

    let batches = bus.read_elements_batches("42");
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 16);
    assert_eq!(batches[1].len(), 1);

    let mut files: Vec<_> = std::fs::read_dir(&path)
        .expect("read_dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();
    assert_eq!(files.len(), 17);
}

#[tokio::test]
async fn pull_sixteen_elements_is_a_single_full_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let bus = Arc::new(MockBus::new().with_entry("7", EntryFixture::with_elements(elements(16))));
    let cache = ProblemCache::new(root, bus.clone());

    cache
        .get_working_directory(&ProblemRef::new("/org/freedesktop/Problems2/Entry/7"))
        .await
        .expect("pull");

    assert_eq!(bus.read_elements_batches("7").len(), 1);
}

#[tokio::test]
async fn pull_thirty_two_elements_is_two_full_batches() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let bus = Arc::new(MockBus::new().with_entry("8", EntryFixture::with_elements(elements(32))));
    let cache = ProblemCache::new(root, bus.clone());

    cache
        .get_working_directory(&ProblemRef::new("/org/freedesktop/Problems2/Entry/8"))
        .await
        .expect("pull");

    let batches = bus.read_elements_batches("8");
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].len(), 16);
    assert_eq!(batches[1].len(), 16);
}

#[tokio::test]
async fn second_pull_without_filesystem_intervention_is_a_cache_hit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let bus = Arc::new(MockBus::new().with_entry("9", EntryFixture::with_elements(elements(3))));
    let cache = ProblemCache::new(root, bus.clone());
    let entry = ProblemRef::new("/org/freedesktop/Problems2/Entry/9");

    cache.get_working_directory(&entry).await.expect("first pull");
    cache.get_working_directory(&entry).await.expect("second pull is a hit");

    assert_eq!(bus.read_elements_batches("9").len(), 1);
}

#[tokio::test]
async fn empty_and_dot_basenames_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bus = Arc::new(MockBus::new());
    let cache = ProblemCache::new(dir.path().to_path_buf(), bus);

    assert!(cache
        .get_working_directory(&ProblemRef::new("/org/freedesktop/Problems2/Entry/"))
        .await
        .is_err());
    assert!(cache.get_working_directory(&ProblemRef::new(".")).await.is_err());
}

#[tokio::test]
async fn parent_basename_is_rejected_before_escaping_cache_root() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bus = Arc::new(MockBus::new());
    let cache = ProblemCache::new(dir.path().to_path_buf(), bus);

    let err = cache
        .get_working_directory(&ProblemRef::new("/org/freedesktop/Problems2/Entry/.."))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        reportd_core::CacheError::InvalidRef(reportd_core::ProblemRefError::ParentBasename)
    ));
}

#[tokio::test]
async fn push_skips_ignored_elements_in_a_single_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let working = root.join("42");
    std::fs::create_dir(&working).expect("mkdir");
    for (name, content) in
        [("analyzer", "a"), ("count", "1"), ("time", "t"), ("type", "ty"), ("comment", "hi"), ("backtrace", "bt")]
    {
        std::fs::write(working.join(name), content).expect("write");
    }

    let bus = Arc::new(MockBus::new());
    let cache = ProblemCache::new(root, bus.clone());
    cache.push_working_directory(&working).await.expect("push");

    let batches = bus.save_elements_batches("42");
    assert_eq!(batches.len(), 1);
    let mut names = batches[0].clone();
    names.sort();
    assert_eq!(names, vec!["backtrace".to_string(), "comment".to_string()]);

    let stored = bus.entry_elements("42").expect("entry");
    assert!(!stored.contains_key("analyzer"));
    assert!(!stored.contains_key("count"));
    assert_eq!(stored.get("comment").map(Vec::as_slice), Some(b"hi".as_slice()));
}

#[tokio::test]
async fn pull_then_push_with_no_modifications_roundtrips_non_ignored_elements() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let bus = Arc::new(
        MockBus::new().with_entry(
            "55",
            EntryFixture::with_elements([
                ("analyzer", b"x".to_vec()),
                ("comment", b"hello".to_vec()),
                ("backtrace", b"trace".to_vec()),
            ]),
        ),
    );
    let cache = ProblemCache::new(root, bus.clone());
    let entry = ProblemRef::new("/org/freedesktop/Problems2/Entry/55");

    let working = cache.get_working_directory(&entry).await.expect("pull");
    cache.push_working_directory(&working).await.expect("push");

    let pushed = bus.save_elements_batches("55");
    assert_eq!(pushed.len(), 1);
    let mut names = pushed[0].clone();
    names.sort();
    assert_eq!(names, vec!["backtrace".to_string(), "comment".to_string()]);
}

#[tokio::test]
async fn push_outside_cache_root_is_rejected() {
    let cache_dir = tempfile::tempdir().expect("tempdir");
    let elsewhere = tempfile::tempdir().expect("tempdir");
    let bus = Arc::new(MockBus::new());
    let cache = ProblemCache::new(cache_dir.path().to_path_buf(), bus);

    let err = cache.push_working_directory(elsewhere.path()).await.unwrap_err();
    assert!(matches!(err, reportd_core::CacheError::PathEscapesCacheRoot));
}

#[tokio::test]
async fn push_skips_an_unopenable_element_and_continues_with_the_rest_of_the_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let root = dir.path().to_path_buf();
    let working = root.join("60");
    std::fs::create_dir(&working).expect("mkdir");
    for i in 0..20 {
        std::fs::write(working.join(format!("e{i:02}")), "x").expect("write");
    }
    // A dangling symlink fails `File::open` unconditionally (unlike a
    // permission bit, which a root-run test process would ignore).
    std::fs::remove_file(working.join("e05")).expect("remove");
    #[cfg(unix)]
    std::os::unix::fs::symlink(working.join("does-not-exist"), working.join("e05"))
        .expect("symlink");
    #[cfg(not(unix))]
    std::fs::write(working.join("e05"), "x").expect("rewrite");

    let bus = Arc::new(MockBus::new());
    let cache = ProblemCache::new(root, bus.clone());
    cache.push_working_directory(&working).await.expect("push");

    let batches = bus.save_elements_batches("60");
    let pushed_count: usize = batches.iter().map(Vec::len).sum();
    #[cfg(unix)]
    assert_eq!(pushed_count, 19, "the dangling element is skipped, the other 19 still push");
    #[cfg(not(unix))]
    assert_eq!(pushed_count, 20);
    assert!(!batches.iter().flatten().any(|name| name == "e05"));
}
