use super::*;
use crate::foundation::core::Vec3;
use proptest::prelude::*;

fn pose(i: u64) -> Mat4 {
    Mat4::from_translation(Vec3::new(i as f32, 1.6, 0.0))
}

#[test]
fn capacity_follows_reference_rate() {
    assert_eq!(queue_capacity(150.0), 9);
    assert_eq!(queue_capacity(100.0), 6);
    assert_eq!(queue_capacity(20.0), 2);
    assert_eq!(queue_capacity(0.0), 0);
    assert_eq!(queue_capacity(-1.0), 0);
    assert_eq!(queue_capacity(f64::NAN), 0);
}

#[test]
fn first_capture_is_released_on_tenth_tick_at_150ms() {
    let mut buf = PoseLatencyBuffer::new(150.0);
    for i in 0..9 {
        assert_eq!(buf.tick(pose(i)), None, "tick {}", i + 1);
    }
    assert_eq!(buf.len(), 9);

    let first = buf.tick(pose(9)).unwrap();
    assert_eq!(first.seq, 0);
    assert_eq!(first.world, pose(0));

    let second = buf.tick(pose(10)).unwrap();
    assert_eq!(second.seq, 1);
    assert_eq!(buf.len(), 9);
}

#[test]
fn non_positive_latency_releases_immediately() {
    let mut buf = PoseLatencyBuffer::new(-1.0);
    for i in 0..5 {
        let rec = buf.tick(pose(i)).unwrap();
        assert_eq!(rec.seq, i);
        assert!(buf.is_empty());
    }
}

#[test]
fn lowering_latency_releases_one_pose_per_tick() {
    let mut buf = PoseLatencyBuffer::new(150.0);
    for i in 0..9 {
        buf.tick(pose(i));
    }
    buf.set_latency_ms(0.0);
    assert_eq!(buf.capacity(), 0);
    assert_eq!(buf.len(), 9);

    let rec = buf.tick(pose(9)).unwrap();
    assert_eq!(rec.seq, 0);
    assert_eq!(buf.len(), 9);
    assert_eq!(buf.peek().map(|r| r.seq), Some(1));
}

#[test]
fn raising_latency_pauses_release_until_queue_refills() {
    let mut buf = PoseLatencyBuffer::new(50.0);
    for i in 0..4 {
        buf.tick(pose(i));
    }
    assert_eq!(buf.len(), 3);
    buf.set_latency_ms(100.0);
    assert_eq!(buf.tick(pose(4)), None);
    assert_eq!(buf.tick(pose(5)), None);
    assert_eq!(buf.tick(pose(6)), None);
    assert_eq!(buf.tick(pose(7)).map(|r| r.seq), Some(1));
}

proptest! {
    #[test]
    fn releases_are_an_ordered_prefix(latency in -50.0f64..1000.0, n in 0u64..200) {
        let mut buf = PoseLatencyBuffer::new(latency);
        let cap = buf.capacity() as u64;
        let mut released = Vec::new();
        for t in 0..n {
            if let Some(rec) = buf.tick(pose(t)) {
                // Capture `seq` happened on tick `seq`; it leaves exactly `cap` ticks later.
                prop_assert_eq!(t, rec.seq + cap);
                prop_assert_eq!(rec.world, pose(rec.seq));
                released.push(rec.seq);
            }
        }
        let expected: Vec<u64> = (0..n.saturating_sub(cap)).collect();
        prop_assert_eq!(released, expected);
    }

    #[test]
    fn latency_changes_never_reorder(
        plan in proptest::collection::vec((any::<bool>(), -50.0f64..500.0), 1..300)
    ) {
        let mut buf = PoseLatencyBuffer::new(150.0);
        let mut next = 0u64;
        for (t, (change, latency)) in plan.into_iter().enumerate() {
            if change {
                buf.set_latency_ms(latency);
            }
            let before = buf.len();
            match buf.tick(pose(t as u64)) {
                Some(rec) => {
                    prop_assert_eq!(rec.seq, next);
                    next += 1;
                    prop_assert_eq!(buf.len(), before);
                }
                None => prop_assert_eq!(buf.len(), before + 1),
            }
        }
    }
}
