//! Retransmission policy (spec.md §4.2, §8): 5 s timeout, 3 retries.

use std::time::Duration;

use tokio::time::Instant;

use crate::slot::PendingTransaction;

/// Default retry timeout (spec.md §4.2: "5 s").
pub const DEFAULT_RETRY_TIMEOUT: Duration = Duration::from_secs(5);
/// Default retry budget (spec.md §4.2: "3").
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// What a receive-loop tick should do about the currently pending
/// transaction, evaluated once per inbound datagram or timer tick
/// (spec.md §5 "Receive context").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetransmitAction {
    /// Not yet due for a retry.
    Wait,
    /// Resend the stored bytes and call [`crate::slot::TransactionSlot::mark_retransmitted`].
    Resend(String),
    /// Retries are exhausted; the caller should clear the slot and emit an
    /// "abandoned" event (spec.md §7).
    Abandon,
}

/// Decide what to do with `pending` at `now`, per spec.md §4.2's rule:
/// resend once `now - first_sent_at > retry_timeout` provided
/// `retries_used < max_retries`; abandon once the budget is exhausted.
pub fn evaluate(
    pending: &PendingTransaction,
    now: Instant,
    retry_timeout: Duration,
    max_retries: u8,
) -> RetransmitAction {
    if now.duration_since(pending.first_sent_at) <= retry_timeout {
        return RetransmitAction::Wait;
    }
    if pending.retries_used >= max_retries {
        return RetransmitAction::Abandon;
    }
    RetransmitAction::Resend(pending.wire_bytes.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vcu_sip::{method::Method, params::MessageParams};

    fn pending_at(first_sent_at: Instant, retries_used: u8) -> PendingTransaction {
        PendingTransaction {
            params: MessageParams::request(Method::Info, "bxp", "127.0.0.1", 5060, "bxp", "127.0.0.1", 5061),
            wire_bytes: "WIRE".to_string(),
            first_sent_at,
            retries_used,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn waits_before_the_timeout() {
        let start = Instant::now();
        let pending = pending_at(start, 0);
        tokio::time::advance(Duration::from_secs(2)).await;
        let action = evaluate(&pending, Instant::now(), DEFAULT_RETRY_TIMEOUT, DEFAULT_MAX_RETRIES);
        assert_eq!(action, RetransmitAction::Wait);
    }

    #[tokio::test(start_paused = true)]
    async fn resends_past_the_timeout() {
        let start = Instant::now();
        let pending = pending_at(start, 0);
        tokio::time::advance(Duration::from_secs(6)).await;
        let action = evaluate(&pending, Instant::now(), DEFAULT_RETRY_TIMEOUT, DEFAULT_MAX_RETRIES);
        assert_eq!(action, RetransmitAction::Resend("WIRE".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn abandons_after_max_retries() {
        let start = Instant::now();
        let pending = pending_at(start, DEFAULT_MAX_RETRIES);
        tokio::time::advance(Duration::from_secs(6)).await;
        let action = evaluate(&pending, Instant::now(), DEFAULT_RETRY_TIMEOUT, DEFAULT_MAX_RETRIES);
        assert_eq!(action, RetransmitAction::Abandon);
    }
}
