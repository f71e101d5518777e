//! Last authoritative kinematic state of every tracked vehicle.
//!
//! The cache is rebuilt wholesale on each scoring update. A slot is either
//! entirely from the latest snapshot or zeroed; nothing survives from an older
//! snapshot.

use std::time::Duration;
use tracing::trace;

use crate::layout::MAX_VEHICLES;
use crate::types::{VehicleKinematicState, WorldSnapshot};

/// Fixed-capacity store of per-vehicle kinematic state.
#[derive(Debug, Clone)]
pub struct KinematicStateCache {
    states: [VehicleKinematicState; MAX_VEHICLES],
    vehicle_count: usize,
    session_id: i32,
    elapsed_session_time: f64,
    updated_at: Option<Duration>,
}

impl Default for KinematicStateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl KinematicStateCache {
    pub const CAPACITY: usize = MAX_VEHICLES;

    pub fn new() -> Self {
        Self {
            states: [VehicleKinematicState::ZERO; MAX_VEHICLES],
            vehicle_count: 0,
            session_id: 0,
            elapsed_session_time: 0.0,
            updated_at: None,
        }
    }

    /// Replace every tracked state with `snapshot`, stamped with clock time `now`.
    pub fn ingest(&mut self, snapshot: &WorldSnapshot, now: Duration) {
        let vehicles = snapshot.vehicles();
        let count = vehicles.len();
        self.states[..count].copy_from_slice(vehicles);
        self.states[count..].fill(VehicleKinematicState::ZERO);
        self.vehicle_count = count;
        self.session_id = snapshot.session_id;
        self.elapsed_session_time = snapshot.elapsed_session_time;
        self.updated_at = Some(now);

        trace!(vehicles = count, session = snapshot.session_id, "Ingested scoring snapshot");
    }

    /// State of vehicle `index`, or a zeroed state when it is not tracked.
    pub fn get(&self, index: usize) -> VehicleKinematicState {
        if index < self.vehicle_count { self.states[index] } else { VehicleKinematicState::ZERO }
    }

    /// Tracked states in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleKinematicState> {
        self.states[..self.vehicle_count].iter()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle_count == 0
    }

    pub fn session_id(&self) -> i32 {
        self.session_id
    }

    /// Session clock of the last ingested snapshot.
    pub fn elapsed_session_time(&self) -> f64 {
        self.elapsed_session_time
    }

    /// Clock time of the last ingest, `None` until the first one.
    pub fn updated_at(&self) -> Option<Duration> {
        self.updated_at
    }

    /// Forget every tracked vehicle.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;
    use proptest::prelude::*;

    fn snapshot(lap_distances: &[f64]) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::new(1, 12.0);
        for &lap_distance in lap_distances {
            let state = VehicleKinematicState {
                lap_distance,
                local_velocity: Vec3::new(0.0, 0.0, -lap_distance),
                ..VehicleKinematicState::ZERO
            };
            if !snapshot.push(state) {
                break;
            }
        }
        snapshot
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = KinematicStateCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.updated_at(), None);
        assert!(cache.get(0).is_zero());
    }

    #[test]
    fn ingest_records_time_and_session() {
        let mut cache = KinematicStateCache::new();
        cache.ingest(&snapshot(&[10.0, 20.0]), Duration::from_millis(500));

        assert_eq!(cache.vehicle_count(), 2);
        assert_eq!(cache.updated_at(), Some(Duration::from_millis(500)));
        assert_eq!(cache.session_id(), 1);
        assert_eq!(cache.elapsed_session_time(), 12.0);
        assert_eq!(cache.get(1).lap_distance, 20.0);
        assert_eq!(cache.iter().count(), 2);
    }

    #[test]
    fn shrinking_snapshot_never_exposes_stale_vehicles() {
        let mut cache = KinematicStateCache::new();
        cache.ingest(&snapshot(&[1.0, 2.0, 3.0, 4.0]), Duration::ZERO);
        cache.ingest(&snapshot(&[9.0]), Duration::from_millis(500));

        assert_eq!(cache.get(0).lap_distance, 9.0);
        for index in 1..KinematicStateCache::CAPACITY {
            assert!(cache.get(index).is_zero(), "slot {index} kept stale state");
        }
    }

    #[test]
    fn out_of_range_indices_are_zero() {
        let mut cache = KinematicStateCache::new();
        cache.ingest(&snapshot(&[5.0]), Duration::ZERO);
        assert!(cache.get(KinematicStateCache::CAPACITY).is_zero());
        assert!(cache.get(usize::MAX).is_zero());
    }

    #[test]
    fn oversized_snapshots_are_truncated() {
        let distances: Vec<f64> = (0..200).map(f64::from).collect();
        let mut cache = KinematicStateCache::new();
        cache.ingest(&snapshot(&distances), Duration::ZERO);

        assert_eq!(cache.vehicle_count(), KinematicStateCache::CAPACITY);
        assert_eq!(cache.get(127).lap_distance, 127.0);
    }

    #[test]
    fn clear_resets_to_new() {
        let mut cache = KinematicStateCache::new();
        cache.ingest(&snapshot(&[5.0, 6.0]), Duration::from_secs(3));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.updated_at(), None);
        assert!(cache.get(0).is_zero());
    }

    proptest! {
        #[test]
        fn replace_wholesale_for_any_pair_of_snapshots(
            first in 0usize..130,
            second in 0usize..130
        ) {
            let a: Vec<f64> = (0..first).map(|i| 1.0 + i as f64).collect();
            let b: Vec<f64> = (0..second).map(|i| 1000.0 + i as f64).collect();

            let mut cache = KinematicStateCache::new();
            cache.ingest(&snapshot(&a), Duration::ZERO);
            cache.ingest(&snapshot(&b), Duration::from_millis(500));

            let tracked = second.min(KinematicStateCache::CAPACITY);
            prop_assert_eq!(cache.vehicle_count(), tracked);
            for index in 0..KinematicStateCache::CAPACITY {
                let state = cache.get(index);
                if index < tracked {
                    prop_assert_eq!(state.lap_distance, 1000.0 + index as f64);
                } else {
                    prop_assert!(state.is_zero());
                }
            }
        }
    }
}
