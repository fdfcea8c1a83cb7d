//! In-memory repository for testing without API access.
//!
//! Serves stops and arrival estimates registered up front, and counts the
//! calls it receives so tests can check what a caller asked for.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{EmtError, EmtRepository, Stop, StopId};

use super::convert::{ArrivalTable, apply_arrivals};

#[derive(Debug, Default)]
struct Calls {
    stop_info: AtomicUsize,
    nearby: AtomicUsize,
    arrivals: AtomicUsize,
}

/// Mock repository backed by in-memory maps.
#[derive(Debug, Clone, Default)]
pub struct MockEmtRepository {
    /// Stops with full detail.
    stops: Arc<RwLock<HashMap<StopId, Stop>>>,
    /// Stops only reachable through the nearby-stops lookup.
    nearby: Arc<RwLock<HashMap<StopId, Stop>>>,
    arrivals: Arc<RwLock<HashMap<StopId, ArrivalTable>>>,
    calls: Arc<Calls>,
}

impl MockEmtRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stop with full detail.
    pub async fn insert_stop(&self, stop: Stop) {
        self.stops.write().await.insert(stop.id, stop);
    }

    /// Register a stop whose detail is unavailable, so lookups fall back to
    /// the nearby-stops path.
    pub async fn insert_nearby_only(&self, stop: Stop) {
        self.nearby.write().await.insert(stop.id, stop);
    }

    /// Register arrival estimates in minutes, as `(line, minutes)` pairs.
    pub async fn insert_arrivals(&self, stop_id: StopId, estimates: &[(&str, u32)]) {
        let mut table = ArrivalTable::new();
        for (line, minutes) in estimates {
            table
                .entry((*line).to_string())
                .or_insert_with(BTreeSet::new)
                .insert(*minutes);
        }
        self.arrivals.write().await.insert(stop_id, table);
    }

    pub fn stop_info_calls(&self) -> usize {
        self.calls.stop_info.load(Ordering::SeqCst)
    }

    pub fn nearby_calls(&self) -> usize {
        self.calls.nearby.load(Ordering::SeqCst)
    }

    pub fn arrivals_calls(&self) -> usize {
        self.calls.arrivals.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmtRepository for MockEmtRepository {
    async fn get_stop_info(&self, stop_id: StopId) -> Result<Stop, EmtError> {
        self.calls.stop_info.fetch_add(1, Ordering::SeqCst);

        if let Some(stop) = self.stops.read().await.get(&stop_id) {
            return Ok(stop.clone());
        }
        self.get_nearby_stops(stop_id).await
    }

    async fn get_nearby_stops(&self, stop_id: StopId) -> Result<Stop, EmtError> {
        self.calls.nearby.fetch_add(1, Ordering::SeqCst);

        self.nearby
            .read()
            .await
            .get(&stop_id)
            .cloned()
            .ok_or_else(|| EmtError::stop_not_found(stop_id, "no mock data for this stop"))
    }

    async fn get_arrivals(&self, stop: &mut Stop) -> Result<(), EmtError> {
        self.calls.arrivals.fetch_add(1, Ordering::SeqCst);

        let arrivals = self.arrivals.read().await;
        let table = arrivals
            .get(&stop.id)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| EmtError::arrivals_not_found(stop.id, "no mock arrivals for this stop"))?;
        apply_arrivals(stop, table);
        Ok(())
    }
}
