//! # vcu-transaction
//!
//! The client's single-in-flight request sequencing, CSeq allocation,
//! retransmission, and multi-fragment catalog aggregation (spec.md §4.2,
//! §4.3).
//!
//! - [`slot`] — the [`slot::TransactionSlot`] every action blocks on
//! - [`cseq`] — [`cseq::CseqAllocator`], fragment CSeq bases
//! - [`retransmit`] — the 5s/3-retry policy
//! - [`correlate`] — subject/content-type response validation
//! - [`aggregator`] — [`aggregator::CatalogAggregator`], the
//!   `X-Fragment-Total`-driven terminal predicate

pub mod aggregator;
pub mod correlate;
pub mod cseq;
pub mod error;
pub mod retransmit;
pub mod slot;

pub use aggregator::CatalogAggregator;
pub use cseq::CseqAllocator;
pub use error::{Error, Result};
pub use slot::{PendingTransaction, TransactionSlot};

pub mod prelude {
    pub use crate::aggregator::CatalogAggregator;
    pub use crate::correlate::check_subject_match;
    pub use crate::cseq::CseqAllocator;
    pub use crate::error::{Error, Result};
    pub use crate::retransmit::{evaluate as evaluate_retransmit, RetransmitAction, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_TIMEOUT};
    pub use crate::slot::{PendingTransaction, TransactionSlot};
}
