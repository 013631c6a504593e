use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crawler_core::testing::{FakeSession, SessionCall};
use crawler_core::BrowserSession;
use crawler_core::{CrawlError, Metadata, Post, SessionError, SessionFailureKind};
use crawler_engine::{
    run_crawler, ConfigError, CrawlerConfig, JsonStorage, PostSink, RunError, SessionProvider,
    StorageError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;

struct FakeProvider {
    session: RefCell<Option<FakeSession>>,
    acquired: Cell<usize>,
    seen_url: RefCell<Option<String>>,
}

impl FakeProvider {
    fn new(session: FakeSession) -> Self {
        Self {
            session: RefCell::new(Some(session)),
            acquired: Cell::new(0),
            seen_url: RefCell::new(None),
        }
    }
}

impl SessionProvider for FakeProvider {
    type Session = FakeSession;

    fn acquire(&self, config: &CrawlerConfig) -> Result<FakeSession, SessionError> {
        self.acquired.set(self.acquired.get() + 1);
        *self.seen_url.borrow_mut() = Some(config.url().to_string());
        self.session
            .borrow_mut()
            .take()
            .ok_or_else(|| SessionError::new(SessionFailureKind::Launch, "session already used"))
    }
}

#[derive(Default)]
struct RecordingSink {
    saved: RefCell<Vec<Vec<Post>>>,
}

impl PostSink for RecordingSink {
    fn save_posts(&self, posts: &[Post]) -> Result<(), StorageError> {
        self.saved.borrow_mut().push(posts.to_vec());
        Ok(())
    }
}

fn init_logging() {
    crawler_logging::initialize_for_tests();
}

fn write_config(dir: &Path, value: serde_json::Value) -> PathBuf {
    let path = dir.join("mvars");
    fs::write(&path, value.to_string()).unwrap();
    path
}

fn valid_config(dir: &Path) -> PathBuf {
    write_config(
        dir,
        json!({
            "url": "https://m.example.com/groups/42",
            "chrome_profile_dir": "--user-data-dir=/tmp/profile",
        }),
    )
}

fn feed(blobs: &[&str]) -> String {
    blobs
        .iter()
        .map(|blob| format!(r#"<div class="by di ds" data-ft='{blob}'>post</div>"#))
        .collect()
}

fn meta(value: serde_json::Value) -> Metadata {
    value.as_object().cloned().unwrap()
}

#[test]
fn scrapes_feed_and_saves_posts_in_order() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let config_path = valid_config(temp.path());
    let provider = FakeProvider::new(
        FakeSession::new(feed(&[r#"{"id":1}"#, r#"{"id":2}"#]))
            .with_links(2)
            .with_detail_page(["Hello"])
            .with_detail_page(["World", "!"]),
    );
    let sink = RecordingSink::default();

    let posts = run_crawler(&config_path, &provider, &sink).unwrap();

    let expected = vec![
        Post::new(meta(json!({"id": 1})), vec!["Hello".to_string()]),
        Post::new(
            meta(json!({"id": 2})),
            vec!["World".to_string(), "!".to_string()],
        ),
    ];
    assert_eq!(posts, expected);
    assert_eq!(sink.saved.into_inner(), vec![expected]);
    assert_eq!(
        provider.seen_url.into_inner().as_deref(),
        Some("https://m.example.com/groups/42")
    );
}

#[test]
fn session_is_pointed_at_the_configured_url_first() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let config_path = valid_config(temp.path());

    struct InspectingProvider(Rc<RefCell<Vec<SessionCall>>>);
    impl SessionProvider for InspectingProvider {
        type Session = Recorder;
        fn acquire(&self, _config: &CrawlerConfig) -> Result<Recorder, SessionError> {
            Ok(Recorder {
                inner: FakeSession::new(""),
                out: Rc::clone(&self.0),
            })
        }
    }
    // Copies the call log out when the session is released.
    struct Recorder {
        inner: FakeSession,
        out: Rc<RefCell<Vec<SessionCall>>>,
    }
    impl Drop for Recorder {
        fn drop(&mut self) {
            *self.out.borrow_mut() = self.inner.calls().to_vec();
        }
    }
    impl BrowserSession for Recorder {
        type Link = <FakeSession as BrowserSession>::Link;
        type Element = <FakeSession as BrowserSession>::Element;
        type Context = <FakeSession as BrowserSession>::Context;
        fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
            self.inner.navigate(url)
        }
        fn current_markup(&mut self) -> Result<String, SessionError> {
            self.inner.current_markup()
        }
        fn query_by_link_text(&mut self, text: &str) -> Result<Vec<Self::Link>, SessionError> {
            self.inner.query_by_link_text(text)
        }
        fn query_by_class_exact(
            &mut self,
            classes: &[&str],
        ) -> Result<Vec<Self::Element>, SessionError> {
            self.inner.query_by_class_exact(classes)
        }
        fn element_text(&mut self, element: &Self::Element) -> Result<String, SessionError> {
            self.inner.element_text(element)
        }
        fn open_in_new_context(
            &mut self,
            link: &Self::Link,
            modifier: crawler_core::OpenModifier,
        ) -> Result<(), SessionError> {
            self.inner.open_in_new_context(link, modifier)
        }
        fn list_contexts(&mut self) -> Result<Vec<Self::Context>, SessionError> {
            self.inner.list_contexts()
        }
        fn set_active_context(&mut self, context: &Self::Context) -> Result<(), SessionError> {
            self.inner.set_active_context(context)
        }
        fn close_active_context(&mut self) -> Result<(), SessionError> {
            self.inner.close_active_context()
        }
    }

    let calls = Rc::new(RefCell::new(Vec::new()));
    let provider = InspectingProvider(Rc::clone(&calls));
    let sink = RecordingSink::default();
    let posts = run_crawler(&config_path, &provider, &sink).unwrap();

    assert!(posts.is_empty());
    let calls = calls.borrow();
    assert_eq!(
        calls.first(),
        Some(&SessionCall::Navigate(
            "https://m.example.com/groups/42".to_string()
        ))
    );
    assert_eq!(sink.saved.into_inner(), vec![Vec::<Post>::new()]);
}

#[test]
fn config_error_stops_before_any_session() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let config_path = write_config(
        temp.path(),
        json!({"chrome_profile_dir": "--user-data-dir=/tmp/profile"}),
    );
    let provider = FakeProvider::new(FakeSession::new(feed(&[r#"{"id":1}"#])).with_links(1));
    let sink = RecordingSink::default();

    let err = run_crawler(&config_path, &provider, &sink).unwrap_err();

    assert!(matches!(err, RunError::Config(ConfigError::MissingKey("url"))));
    assert_eq!(provider.acquired.get(), 0);
    assert!(sink.saved.borrow().is_empty());
}

#[test]
fn malformed_metadata_saves_nothing() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let config_path = valid_config(temp.path());
    let provider = FakeProvider::new(
        FakeSession::new(feed(&[r#"{"id":1}"#, "{broken"]))
            .with_links(2)
            .with_detail_page(["Hello"])
            .with_detail_page(["World"]),
    );
    let sink = RecordingSink::default();

    let err = run_crawler(&config_path, &provider, &sink).unwrap_err();

    assert!(matches!(err, RunError::Crawl(CrawlError::Metadata(_))));
    assert_eq!(provider.acquired.get(), 1);
    assert!(sink.saved.borrow().is_empty());
}

#[test]
fn launch_failure_is_a_session_error() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let config_path = valid_config(temp.path());
    let provider = FakeProvider::new(FakeSession::new(""));
    provider.session.borrow_mut().take();
    let sink = RecordingSink::default();

    let err = run_crawler(&config_path, &provider, &sink).unwrap_err();

    match err {
        RunError::Session(err) => assert_eq!(err.kind, SessionFailureKind::Launch),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sink.saved.borrow().is_empty());
}

#[test]
fn json_storage_receives_the_full_result() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let config_path = valid_config(temp.path());
    let output = temp.path().join("scraped_posts.json");
    let provider = FakeProvider::new(
        FakeSession::new(feed(&[r#"{"id":1,"page":{"name":"Rustaceans"}}"#]))
            .with_links(1)
            .with_detail_page(["Body"]),
    );

    run_crawler(&config_path, &provider, &JsonStorage::new(&output)).unwrap();

    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        saved,
        json!([{"metadata": {"id": 1, "page": {"name": "Rustaceans"}}, "content": ["Body"]}])
    );
}

#[test]
fn storage_failure_surfaces_after_extraction() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let config_path = valid_config(temp.path());
    let blocker = temp.path().join("blocker");
    fs::write(&blocker, "x").unwrap();
    let provider = FakeProvider::new(
        FakeSession::new(feed(&[r#"{"id":1}"#]))
            .with_links(1)
            .with_detail_page(["Body"]),
    );

    let err = run_crawler(
        &config_path,
        &provider,
        &JsonStorage::new(blocker.join("posts.json")),
    )
    .unwrap_err();

    assert!(matches!(err, RunError::Storage(StorageError::Persist { .. })));
    assert_eq!(provider.acquired.get(), 1);
}
