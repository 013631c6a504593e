use std::fs;

use crawler_core::{Metadata, Post};
use crawler_engine::{JsonStorage, PostSink, StorageError};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

fn post(metadata: serde_json::Value, content: &[&str]) -> Post {
    let metadata: Metadata = metadata.as_object().cloned().unwrap();
    Post::new(metadata, content.iter().map(|s| s.to_string()).collect())
}

#[test]
fn posts_are_written_as_pretty_json_array() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(temp.path().join("scraped_posts.json"));

    storage
        .save_posts(&[
            post(json!({"id": 1}), &["Hello"]),
            post(json!({}), &[]),
        ])
        .unwrap();

    let written = fs::read_to_string(storage.path()).unwrap();
    let expected = r#"[
  {
    "metadata": {
      "id": 1
    },
    "content": [
      "Hello"
    ]
  },
  {
    "metadata": {},
    "content": []
  }
]"#;
    assert_eq!(written, expected);
}

#[test]
fn non_ascii_text_is_kept_verbatim() {
    let temp = TempDir::new().unwrap();
    let storage = JsonStorage::new(temp.path().join("posts.json"));

    storage
        .save_posts(&[post(json!({"author": "Zoë"}), &["café ☕"])])
        .unwrap();

    let written = fs::read_to_string(storage.path()).unwrap();
    assert!(written.contains("Zoë"));
    assert!(written.contains("café ☕"));
    let parsed: Vec<Post> = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed[0].content(), ["café ☕".to_string()]);
}

#[test]
fn unwritable_target_reports_path() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    let storage = JsonStorage::new(blocker.join("posts.json"));

    let err = storage.save_posts(&[]).unwrap_err();
    match err {
        StorageError::Persist { path, .. } => assert_eq!(path, blocker.join("posts.json")),
        other => panic!("unexpected error: {other:?}"),
    }
}
