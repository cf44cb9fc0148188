//! The update lease: at most one recomputation in flight.

use std::cell::Cell;
use std::fmt;

/// Hands out [`UpdateLease`]s, one at a time.
#[derive(Debug, Default)]
pub struct UpdateGate {
    busy: Cell<bool>,
}

impl UpdateGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the lease, or returns `None` while another one is outstanding.
    pub fn try_acquire(&self) -> Option<UpdateLease<'_>> {
        if self.busy.replace(true) {
            return None;
        }
        Some(UpdateLease { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }
}

/// Proof that the holder may rewrite notes.
///
/// Operations that need to recompute a topic while already holding the lease
/// take it by reference instead of acquiring a new one. Dropping the lease
/// releases the gate, on error paths too.
pub struct UpdateLease<'a> {
    busy: &'a Cell<bool>,
}

impl Drop for UpdateLease<'_> {
    fn drop(&mut self) {
        self.busy.set(false);
    }
}

impl fmt::Debug for UpdateLease<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UpdateLease")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_lease_at_a_time() {
        let gate = UpdateGate::new();
        let lease = gate.try_acquire();
        assert!(lease.is_some());
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
    }

    #[test]
    fn dropping_the_lease_releases_the_gate() {
        let gate = UpdateGate::new();
        drop(gate.try_acquire());
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn released_on_early_return() {
        fn fails(gate: &UpdateGate) -> Result<(), &'static str> {
            let _lease = gate.try_acquire().ok_or("busy")?;
            Err("write failed")
        }

        let gate = UpdateGate::new();
        assert_eq!(fails(&gate), Err("write failed"));
        assert!(!gate.is_busy());
    }
}
