#![allow(dead_code)]
//! Scripted in-memory `ObserveResource` for driving the engines without a
//! cluster.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use kube::api::WatchEvent;
use kubewait::error::{Error, Result};
use kubewait::wait::Selector;
use kubewait::wait::access::{ObserveResource, WatchStream};
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One scripted watch connection.
pub enum WatchScript<K> {
    /// Deliver the events, then close the channel without error.
    EventsThenClose(Vec<WatchEvent<K>>),
    /// Deliver the events, then hold the channel open until dropped.
    EventsThenHold(Vec<WatchEvent<K>>),
    /// Fail watch establishment.
    Fail(Error),
}

/// Scripted resource access. List and get responses are consumed front to
/// back; the final entry is sticky when it is `Ok`, so a waiter can keep
/// polling a settled state. An unscripted watch holds its channel open.
pub struct FakeAccess<K> {
    lists: Mutex<VecDeque<Result<(Vec<K>, String)>>>,
    gets: Mutex<VecDeque<Result<K>>>,
    watches: Mutex<VecDeque<WatchScript<K>>>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub watch_calls: AtomicUsize,
}

impl<K> Default for FakeAccess<K> {
    fn default() -> Self {
        Self {
            lists: Mutex::new(VecDeque::new()),
            gets: Mutex::new(VecDeque::new()),
            watches: Mutex::new(VecDeque::new()),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            watch_calls: AtomicUsize::new(0),
        }
    }
}

impl<K> FakeAccess<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_list(&self, items: Vec<K>) {
        self.lists.lock().unwrap().push_back(Ok((items, "1".to_string())));
    }

    pub fn push_list_err(&self, error: Error) {
        self.lists.lock().unwrap().push_back(Err(error));
    }

    pub fn push_get(&self, item: K) {
        self.gets.lock().unwrap().push_back(Ok(item));
    }

    pub fn push_get_err(&self, error: Error) {
        self.gets.lock().unwrap().push_back(Err(error));
    }

    pub fn push_watch(&self, script: WatchScript<K>) {
        self.watches.lock().unwrap().push_back(script);
    }

    pub fn list_count(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_count(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn watch_count(&self) -> usize {
        self.watch_calls.load(Ordering::SeqCst)
    }
}

fn pop_sticky<T: Clone>(queue: &Mutex<VecDeque<Result<T>>>) -> Result<T> {
    let mut queue = queue.lock().unwrap();
    if queue.len() == 1 {
        if let Some(Ok(value)) = queue.front() {
            return Ok(value.clone());
        }
    }
    queue
        .pop_front()
        .unwrap_or_else(|| Err(Error::custom("fake script exhausted")))
}

#[async_trait]
impl<K> ObserveResource for FakeAccess<K>
where
    K: Clone + Debug + Send + Sync + 'static,
{
    type Obj = K;

    async fn list(&self, _selector: &Selector) -> Result<(Vec<K>, String)> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        pop_sticky(&self.lists)
    }

    async fn watch(&self, _selector: &Selector, _cursor: &str) -> Result<WatchStream<K>> {
        self.watch_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.watches.lock().unwrap().pop_front();
        Ok(match script {
            Some(WatchScript::EventsThenClose(events)) => {
                stream::iter(events.into_iter().map(Ok)).boxed()
            }
            Some(WatchScript::EventsThenHold(events)) => stream::iter(events.into_iter().map(Ok))
                .chain(stream::pending())
                .boxed(),
            Some(WatchScript::Fail(error)) => return Err(error),
            None => stream::pending().boxed(),
        })
    }

    async fn get(&self, _name: &str) -> Result<K> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        pop_sticky(&self.gets)
    }
}

/// Route engine logs through a subscriber honoring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Kube API error with the given HTTP code.
pub fn api_error(code: u16) -> Error {
    Error::Kube(kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("scripted {code}"),
        reason: String::new(),
        code,
    }))
}
