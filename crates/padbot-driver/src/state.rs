//! [`Snapshot`] – the cached mirror of the robot.
//!
//! The status record is immutable once published and swapped in whole with
//! [`ArcSwap`], so a reader either sees the previous record or the next one,
//! never a mix of both. Reads are lock-free and never wait on the pollers.
//! The health flag is independent of the status record.

use arc_swap::ArcSwap;
use padbot_types::RobotStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Last-known robot state, written by the pollers and read by everyone else.
pub struct Snapshot {
    status: ArcSwap<RobotStatus>,
    healthy: AtomicBool,
}

impl Snapshot {
    /// Every status field starts at its sentinel and the robot is unhealthy.
    pub fn new() -> Self {
        Self {
            status: ArcSwap::from_pointee(RobotStatus::unknown()),
            healthy: AtomicBool::new(false),
        }
    }

    /// The most recently published status record.
    pub fn status(&self) -> Arc<RobotStatus> {
        self.status.load_full()
    }

    /// Outcome of the most recent completed health probe.
    pub fn healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// Replace the whole status record.
    pub(crate) fn publish_status(&self, status: RobotStatus) {
        self.status.store(Arc::new(status));
    }

    pub(crate) fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Release);
    }

    /// Back to the construction state; used when a new session starts.
    pub(crate) fn reset(&self) {
        self.publish_status(RobotStatus::unknown());
        self.set_healthy(false);
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    fn sample() -> RobotStatus {
        RobotStatus {
            battery_percentage: 73,
            battery_status: "DISCHARGING".into(),
            action_status: "MOVING".into(),
            navigation_status: "NAVIGATING".into(),
            robot_location: "Lobby".into(),
        }
    }

    #[test]
    fn new_snapshot_is_unknown_and_unhealthy() {
        let snap = Snapshot::new();
        assert!(snap.status().is_unknown());
        assert!(!snap.healthy());
    }

    #[test]
    fn publish_replaces_whole_record() {
        let snap = Snapshot::new();
        snap.publish_status(sample());
        assert_eq!(*snap.status(), sample());
        snap.publish_status(RobotStatus::unknown());
        assert!(snap.status().is_unknown());
    }

    #[test]
    fn health_is_independent_of_status() {
        let snap = Snapshot::new();
        snap.set_healthy(true);
        snap.publish_status(RobotStatus::unknown());
        assert!(snap.healthy());
        snap.set_healthy(false);
        snap.publish_status(sample());
        assert!(!snap.healthy());
    }

    #[test]
    fn reset_restores_construction_state() {
        let snap = Snapshot::new();
        snap.publish_status(sample());
        snap.set_healthy(true);
        snap.reset();
        assert!(snap.status().is_unknown());
        assert!(!snap.healthy());
    }

    #[test]
    fn held_record_survives_later_publish() {
        let snap = Snapshot::new();
        snap.publish_status(sample());
        let held = snap.status();
        snap.publish_status(RobotStatus::unknown());
        assert_eq!(*held, sample());
    }

    fn arb_status() -> impl Strategy<Value = RobotStatus> {
        (
            -1i64..=100,
            "[A-Z]{1,10}",
            "[A-Z]{1,10}",
            "[A-Z]{1,10}",
            "[A-Za-z0-9]{1,12}",
        )
            .prop_map(|(pct, battery, action, nav, location)| RobotStatus {
                battery_percentage: pct,
                battery_status: battery,
                action_status: action,
                navigation_status: nav,
                robot_location: location,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn concurrent_readers_never_observe_torn_records(
            records in prop::collection::vec(arb_status(), 2..6)
        ) {
            let snap = Arc::new(Snapshot::new());
            snap.publish_status(records[0].clone());
            let done = Arc::new(AtomicBool::new(false));

            let readers: Vec<_> = (0..4)
                .map(|_| {
                    let snap = Arc::clone(&snap);
                    let done = Arc::clone(&done);
                    let allowed = records.clone();
                    thread::spawn(move || {
                        let mut reads = 0usize;
                        while !done.load(Ordering::Acquire) || reads == 0 {
                            let seen = snap.status();
                            assert!(
                                allowed.contains(&*seen),
                                "observed a record that was never published: {seen:?}"
                            );
                            reads += 1;
                        }
                        reads
                    })
                })
                .collect();

            for _ in 0..200 {
                for record in &records {
                    snap.publish_status(record.clone());
                }
            }
            done.store(true, Ordering::Release);

            for reader in readers {
                prop_assert!(reader.join().is_ok());
            }
        }
    }
}
