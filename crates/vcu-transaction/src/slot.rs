//! The single-in-flight pending-transaction slot (spec.md §3, §4.2, §9).
//!
//! The original source enforces "one outstanding transaction" with a
//! busy-wait (`while len(self.send_history) > 0: pass`). We replace it with
//! a `tokio::sync::Notify` any waiter can subscribe to before re-checking
//! the slot, which is the condition-variable-on-slot-empty spec.md §9 asks
//! for.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::Instant;

use vcu_sip::MessageParams;

/// A request awaiting its matching 200, plus retransmission bookkeeping
/// (spec.md §3 "Pending transaction").
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub params: MessageParams,
    pub wire_bytes: String,
    pub first_sent_at: Instant,
    pub retries_used: u8,
}

/// History capacity retained purely for tracing (spec.md §3: "capacity 100
/// retained for tracing only" — it never gates behavior).
const TRACE_CAPACITY: usize = 100;

#[derive(Default)]
struct State {
    slot: Option<PendingTransaction>,
    trace: VecDeque<PendingTransaction>,
}

/// The shared slot. Cloning is cheap ([`Arc`]-backed); every clone refers
/// to the same slot.
#[derive(Clone)]
pub struct TransactionSlot {
    state: Arc<Mutex<State>>,
    notify: Arc<Notify>,
}

impl Default for TransactionSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionSlot {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Block until the slot is empty. Callers re-check `is_empty` after
    /// waking, since `Notify` does not guarantee the slot is still empty
    /// by the time this returns under contention.
    pub async fn wait_until_empty(&self) {
        loop {
            if self.is_empty() {
                return;
            }
            self.notify.notified().await;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().slot.is_none()
    }

    /// Occupy the slot with a newly sent request. Overwrites nothing —
    /// callers must have observed `is_empty()` first (spec.md §5 ordering:
    /// only the action context calls this, and it always calls
    /// `wait_until_empty` beforehand).
    pub fn occupy(&self, pending: PendingTransaction) {
        let mut state = self.state.lock();
        state.trace.push_back(pending.clone());
        if state.trace.len() > TRACE_CAPACITY {
            state.trace.pop_front();
        }
        state.slot = Some(pending);
    }

    /// Clear the slot (matching 200 processed, or retries exhausted) and
    /// wake any action-context waiter.
    pub fn clear(&self) {
        self.state.lock().slot = None;
        self.notify.notify_waiters();
    }

    /// Whether the slot currently holds a transaction with this CSeq
    /// (spec.md §4.2 "Correlation").
    pub fn matches_cseq(&self, cseq: u32) -> bool {
        self.state
            .lock()
            .slot
            .as_ref()
            .and_then(|p| p.params.cseq)
            == Some(cseq)
    }

    /// A snapshot of the current pending transaction, if any — used by the
    /// retransmission check without holding the lock across an `.await`.
    pub fn snapshot(&self) -> Option<PendingTransaction> {
        self.state.lock().slot.clone()
    }

    /// Record that the stored transaction was just retransmitted: bump
    /// `retries_used` and reset `first_sent_at` to `now`.
    pub fn mark_retransmitted(&self, now: Instant) {
        if let Some(pending) = self.state.lock().slot.as_mut() {
            pending.retries_used += 1;
            pending.first_sent_at = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcu_sip::{method::Method, params::MessageParams};

    fn sample_pending(cseq: u32) -> PendingTransaction {
        let mut params = MessageParams::request(Method::Info, "bxp", "127.0.0.1", 5060, "bxp", "127.0.0.1", 5061);
        params.cseq = Some(cseq);
        PendingTransaction {
            params,
            wire_bytes: String::new(),
            first_sent_at: Instant::now(),
            retries_used: 0,
        }
    }

    #[tokio::test]
    async fn empty_slot_does_not_block() {
        let slot = TransactionSlot::new();
        slot.wait_until_empty().await;
    }

    #[tokio::test]
    async fn occupy_then_clear_unblocks_a_waiter() {
        let slot = TransactionSlot::new();
        slot.occupy(sample_pending(1));
        assert!(!slot.is_empty());

        let waiter_slot = slot.clone();
        let waiter = tokio::spawn(async move {
            waiter_slot.wait_until_empty().await;
        });

        tokio::task::yield_now().await;
        slot.clear();
        waiter.await.unwrap();
        assert!(slot.is_empty());
    }

    #[tokio::test]
    async fn matches_cseq_checks_the_occupied_transaction() {
        let slot = TransactionSlot::new();
        slot.occupy(sample_pending(7));
        assert!(slot.matches_cseq(7));
        assert!(!slot.matches_cseq(8));
    }

    #[tokio::test]
    async fn mark_retransmitted_bumps_retry_count() {
        let slot = TransactionSlot::new();
        slot.occupy(sample_pending(1));
        slot.mark_retransmitted(Instant::now());
        assert_eq!(slot.snapshot().unwrap().retries_used, 1);
    }
}
