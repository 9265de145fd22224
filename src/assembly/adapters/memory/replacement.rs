//! In-memory replacement order sink.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::assembly::{
    domain::ReplacementOrderId,
    ports::{
        ReplacementOrderError, ReplacementOrderRequest, ReplacementOrderResult,
        ReplacementOrderSink,
    },
};

/// Records replacement requests and hands out `PROD-` order identifiers.
///
/// The sink can be switched offline to exercise the queued-replacement path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReplacementOrderSink {
    orders: Arc<RwLock<Vec<(ReplacementOrderId, ReplacementOrderRequest)>>>,
    offline: Arc<AtomicBool>,
}

impl InMemoryReplacementOrderSink {
    /// Creates an empty, reachable sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent requests fail with
    /// [`ReplacementOrderError::Unavailable`] until set back to `false`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Returns the accepted orders in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`ReplacementOrderError::Unavailable`] if the lock is poisoned.
    pub fn orders(
        &self,
    ) -> ReplacementOrderResult<Vec<(ReplacementOrderId, ReplacementOrderRequest)>> {
        let orders = self.orders.read().map_err(|err| {
            ReplacementOrderError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(orders.clone())
    }
}

fn next_order_id() -> ReplacementOrderResult<ReplacementOrderId> {
    let simple = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    let suffix: String = simple.chars().take(8).collect();
    ReplacementOrderId::new(format!("PROD-{suffix}"))
        .map_err(|err| ReplacementOrderError::Rejected(err.to_string()))
}

#[async_trait]
impl ReplacementOrderSink for InMemoryReplacementOrderSink {
    async fn create_replacement_order(
        &self,
        request: &ReplacementOrderRequest,
    ) -> ReplacementOrderResult<ReplacementOrderId> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ReplacementOrderError::unavailable(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "production order subsystem offline",
            )));
        }
        let mut orders = self.orders.write().map_err(|err| {
            ReplacementOrderError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        let order_id = next_order_id()?;
        orders.push((order_id.clone(), request.clone()));
        Ok(order_id)
    }
}
