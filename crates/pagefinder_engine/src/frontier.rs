use std::collections::{HashSet, VecDeque};

use crate::PageTask;

/// URLs already dispatched to the fetcher during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitedSet {
    urls: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the URL was already present.
    pub fn insert(&mut self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Breadth-first queue of crawl tasks that owns the run's visited set.
///
/// A URL lives in at most one of the two sets: popping moves it from the
/// queue into the visited set, and a URL in either set is never re-queued.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<PageTask>,
    queued: HashSet<String>,
    visited: VisitedSet,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` unless its URL was already seen. Returns whether it was added.
    pub fn push(&mut self, task: PageTask) -> bool {
        if self.visited.contains(&task.url) || self.queued.contains(&task.url) {
            return false;
        }
        self.queued.insert(task.url.clone());
        self.queue.push_back(task);
        true
    }

    /// Next unvisited task in FIFO order, marked visited before it is returned.
    pub fn pop_next(&mut self) -> Option<PageTask> {
        while let Some(task) = self.queue.pop_front() {
            self.queued.remove(&task.url);
            if self.visited.insert(&task.url) {
                return Some(task);
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queued_urls(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(|task| task.url.as_str())
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn is_disjoint(&self) -> bool {
        self.queued.iter().all(|url| !self.visited.contains(url))
    }
}
