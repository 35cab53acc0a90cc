//! # Binding Log
//!
//! Each signed invoke carries a transaction binding. Once the workflow has
//! accepted a binding it is written to `bindingTable`, keyed by its SHA-256
//! digest, and a second invoke presenting the same binding is refused.
//! Reads are never logged.

use tradeflow_core::{Timestamp, TradeError};
use tradeflow_crypto::{fingerprint, sha256_hex};
use tradeflow_ledger::{Column, Row, RowKey, BINDING_TABLE, BINDING_TAG};

use crate::SharedStore;

/// Record of consumed call bindings.
#[derive(Clone)]
pub struct BindingLog {
    store: SharedStore,
}

impl std::fmt::Debug for BindingLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BindingLog")
    }
}

impl BindingLog {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn key(binding: &[u8]) -> RowKey {
        RowKey::new(BINDING_TAG, &sha256_hex(binding))
    }

    /// Mark `binding` as used by `function`.
    ///
    /// An empty binding, or one already recorded, is `AccessDenied`.
    pub fn consume(&self, binding: &[u8], function: &str) -> Result<(), TradeError> {
        if binding.is_empty() {
            return Err(TradeError::AccessDenied(
                "signed call carries no binding".to_string(),
            ));
        }
        let row = Row {
            key: Self::key(binding),
            columns: vec![
                Column::Str(function.to_string()),
                Column::Str(Timestamp::now().to_iso8601()),
            ],
        };
        if !self.store.insert_row(BINDING_TABLE, row)? {
            tracing::warn!(
                function,
                binding = %fingerprint(binding),
                "binding already used"
            );
            return Err(TradeError::AccessDenied(format!(
                "binding already used, refusing {function}"
            )));
        }
        tracing::debug!(function, binding = %fingerprint(binding), "binding recorded");
        Ok(())
    }

    /// Whether `binding` has been consumed.
    pub fn is_used(&self, binding: &[u8]) -> Result<bool, TradeError> {
        Ok(self.store.get_row(BINDING_TABLE, &Self::key(binding))?.is_some())
    }
}
