//! Property-based test generators using proptest.

use proptest::prelude::*;
use walsift_codec::{LogRecord, Timestamp, TxnId};

/// Strategy for key bytes.
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..64)
}

/// Strategy for value bytes, empty values included.
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for engine message text.
pub fn message_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9 :_-]{0,48}").expect("Invalid regex")
}

/// Strategy for a single record of any type, weighted toward data records.
pub fn record_strategy() -> impl Strategy<Value = LogRecord> {
    let ids = (any::<u64>(), any::<u64>(), any::<u64>());
    prop_oneof![
        3 => (ids, key_strategy(), value_strategy()).prop_map(
            |((txn, commit, durable), key, value)| LogRecord::Insert {
                txn_id: TxnId::new(txn),
                commit_ts: Timestamp::new(commit),
                durable_ts: Timestamp::new(durable),
                key,
                value,
            }
        ),
        2 => (ids, key_strategy()).prop_map(|((txn, commit, durable), key)| {
            LogRecord::Remove {
                txn_id: TxnId::new(txn),
                commit_ts: Timestamp::new(commit),
                durable_ts: Timestamp::new(durable),
                key,
            }
        }),
        1 => (any::<u64>(), any::<u64>()).prop_map(|(txn, ts)| LogRecord::Prepare {
            txn_id: TxnId::new(txn),
            prepare_ts: Timestamp::new(ts),
        }),
        2 => ids.prop_map(|(txn, commit, durable)| LogRecord::Commit {
            txn_id: TxnId::new(txn),
            commit_ts: Timestamp::new(commit),
            durable_ts: Timestamp::new(durable),
        }),
        1 => any::<u64>().prop_map(|ts| LogRecord::Checkpoint {
            checkpoint_ts: Timestamp::new(ts),
        }),
        1 => message_strategy().prop_map(|text| LogRecord::Message { text }),
    ]
}

/// Strategy for a sequence of records.
pub fn record_sequence_strategy(
    min_records: usize,
    max_records: usize,
) -> impl Strategy<Value = Vec<LogRecord>> {
    prop::collection::vec(record_strategy(), min_records..max_records)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
