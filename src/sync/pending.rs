//! Debounced set of paths waiting for a sync pass.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Insertion-ordered set of dirty paths with a restartable deadline.
///
/// Every push moves the deadline to `now + debounce`, so a burst of
/// notifications is handled once, after it has gone quiet.
#[derive(Debug)]
pub struct PendingQueue {
    debounce: Duration,
    order: Vec<PathBuf>,
    members: HashSet<PathBuf>,
    deadline: Option<Instant>,
}

impl PendingQueue {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            order: Vec::new(),
            members: HashSet::new(),
            deadline: None,
        }
    }

    /// Queues a path (once) and restarts the deadline.
    pub fn push(&mut self, path: PathBuf, now: Instant) {
        if self.members.insert(path.clone()) {
            self.order.push(path);
        }
        self.deadline = Some(now + self.debounce);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the deadline has passed.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Empties the queue, returning paths in first-queued order.
    pub fn take(&mut self) -> Vec<PathBuf> {
        self.members.clear();
        self.deadline = None;
        std::mem::take(&mut self.order)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEBOUNCE: Duration = Duration::from_millis(500);

    #[test]
    fn burst_collapses_into_one_entry_per_path() {
        let mut queue = PendingQueue::new(DEBOUNCE);
        let t0 = Instant::now();

        queue.push(PathBuf::from("B.md"), t0);
        queue.push(PathBuf::from("A.md"), t0);
        queue.push(PathBuf::from("B.md"), t0);

        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.take(),
            vec![PathBuf::from("B.md"), PathBuf::from("A.md")]
        );
        assert!(queue.is_empty());
        assert_eq!(queue.deadline(), None);
    }

    #[test]
    fn each_push_restarts_the_deadline() {
        let mut queue = PendingQueue::new(DEBOUNCE);
        let t0 = Instant::now();

        queue.push(PathBuf::from("A.md"), t0);
        queue.push(PathBuf::from("A.md"), t0 + Duration::from_millis(400));

        assert!(!queue.is_due(t0 + Duration::from_millis(600)));
        assert!(queue.is_due(t0 + Duration::from_millis(900)));
    }

    #[test]
    fn empty_queue_is_never_due() {
        let queue = PendingQueue::new(DEBOUNCE);
        assert!(!queue.is_due(Instant::now() + Duration::from_secs(60)));
    }
}
