//! Frame gate: "keep only the latest frame" backpressure.
//!
//! The camera produces frames far faster than a frame can be extracted and
//! classified. The gate is a single atomic slot: a frame is admitted only when
//! the slot is free, every other frame is dropped on the spot, and downstream
//! frees the slot when it is done with the admitted frame. Nothing is queued,
//! so memory and latency stay bounded whatever the camera rate.
//!
//! If downstream never answers (an extractor that silently swallows a frame),
//! the slot would stay taken forever. A slot held longer than the configured
//! timeout is therefore reclaimed by the next admission; the abandoned ticket
//! stops being current and its late release is ignored.

use crate::clock::{Clock, SystemClock};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const FREE: u64 = 0;

/// Proof of admission for one frame. Hand it back with [`FrameGate::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct Ticket {
    id: u64,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Admission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub admitted: u64,
    pub dropped: u64,
    pub reclaimed: u64,
}

/// Single-slot admission gate.
///
/// Admission is expected from one producer context (the camera callback);
/// releases may come from any thread. The at-most-one-in-flight guarantee
/// holds regardless, since the slot is taken with a compare-and-swap.
pub struct FrameGate {
    in_flight: AtomicU64,
    admitted_at_nanos: AtomicU64,
    next_id: AtomicU64,
    timeout: Duration,
    clock: Arc<dyn Clock>,
    epoch: Instant,
    admitted: AtomicU64,
    dropped: AtomicU64,
    reclaimed: AtomicU64,
}

impl FrameGate {
    /// Creates a gate with the given timeout. A zero timeout never reclaims.
    pub fn new(timeout: Duration) -> Self {
        Self::with_clock(timeout, Arc::new(SystemClock))
    }

    /// Creates a gate with a custom clock (for deterministic testing).
    pub fn with_clock(timeout: Duration, clock: Arc<dyn Clock>) -> Self {
        let epoch = clock.now();
        Self {
            in_flight: AtomicU64::new(FREE),
            admitted_at_nanos: AtomicU64::new(0),
            next_id: AtomicU64::new(1),
            timeout,
            clock,
            epoch,
            admitted: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            reclaimed: AtomicU64::new(0),
        }
    }

    fn now_nanos(&self) -> u64 {
        let elapsed = self.clock.now().saturating_duration_since(self.epoch);
        u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)
    }

    fn timeout_nanos(&self) -> u64 {
        u64::try_from(self.timeout.as_nanos()).unwrap_or(u64::MAX)
    }

    /// Tries to admit a frame. Never blocks.
    ///
    /// Returns a ticket when the slot was free (or held past the timeout),
    /// `None` when the frame must be dropped.
    pub fn try_admit(&self) -> Option<Ticket> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = self.now_nanos();

        match self
            .in_flight
            .compare_exchange(FREE, id, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.admitted_at_nanos.store(now, Ordering::Release);
                self.admitted.fetch_add(1, Ordering::Relaxed);
                Some(Ticket { id })
            }
            Err(holder) => {
                let held_for = now.saturating_sub(self.admitted_at_nanos.load(Ordering::Acquire));
                let expired = !self.timeout.is_zero() && held_for >= self.timeout_nanos();
                if expired
                    && self
                        .in_flight
                        .compare_exchange(holder, id, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                {
                    self.admitted_at_nanos.store(now, Ordering::Release);
                    self.admitted.fetch_add(1, Ordering::Relaxed);
                    self.reclaimed.fetch_add(1, Ordering::Relaxed);
                    return Some(Ticket { id });
                }
                self.dropped.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Frees the slot if `ticket` still holds it.
    ///
    /// Returns `false` when the ticket had already been superseded by a
    /// timeout reclaim; the slot is left untouched in that case.
    pub fn release(&self, ticket: Ticket) -> bool {
        self.in_flight
            .compare_exchange(ticket.id, FREE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether `ticket` still owns the slot.
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.in_flight.load(Ordering::Acquire) == ticket.id
    }

    /// Whether a frame is in flight.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) != FREE
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> GateStats {
        GateStats {
            admitted: self.admitted.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            reclaimed: self.reclaimed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use std::thread;

    fn gate_with_clock(timeout_ms: u64) -> (FrameGate, MockClock) {
        let clock = MockClock::new();
        let gate =
            FrameGate::with_clock(Duration::from_millis(timeout_ms), Arc::new(clock.clone()));
        (gate, clock)
    }

    #[test]
    fn test_admits_when_free() {
        let gate = FrameGate::new(Duration::from_secs(2));
        assert!(!gate.is_busy());
        let ticket = gate.try_admit().unwrap();
        assert!(gate.is_busy());
        assert!(gate.is_current(&ticket));
    }

    #[test]
    fn test_drops_while_in_flight() {
        let gate = FrameGate::new(Duration::from_secs(2));
        let _ticket = gate.try_admit().unwrap();
        for _ in 0..5 {
            assert!(gate.try_admit().is_none());
        }
        assert_eq!(
            gate.stats(),
            GateStats {
                admitted: 1,
                dropped: 5,
                reclaimed: 0
            }
        );
    }

    #[test]
    fn test_release_reopens_slot() {
        let gate = FrameGate::new(Duration::from_secs(2));
        let first = gate.try_admit().unwrap();
        assert!(gate.release(first));
        assert!(!gate.is_busy());
        let second = gate.try_admit().unwrap();
        assert_ne!(second.id(), 0);
    }

    #[test]
    fn test_tickets_are_unique() {
        let gate = FrameGate::new(Duration::from_secs(2));
        let a = gate.try_admit().unwrap();
        let a_id = a.id();
        gate.release(a);
        let b = gate.try_admit().unwrap();
        assert_ne!(a_id, b.id());
    }

    #[test]
    fn test_expired_slot_is_reclaimed() {
        let (gate, clock) = gate_with_clock(100);
        let stuck = gate.try_admit().unwrap();

        clock.advance(Duration::from_millis(99));
        assert!(gate.try_admit().is_none());

        clock.advance(Duration::from_millis(1));
        let fresh = gate.try_admit().unwrap();
        assert!(gate.is_current(&fresh));
        assert!(!gate.is_current(&stuck));
        assert_eq!(gate.stats().reclaimed, 1);
    }

    #[test]
    fn test_late_release_of_reclaimed_ticket_is_ignored() {
        let (gate, clock) = gate_with_clock(50);
        let stuck = gate.try_admit().unwrap();
        clock.advance(Duration::from_millis(60));
        let fresh = gate.try_admit().unwrap();

        assert!(!gate.release(stuck));
        assert!(gate.is_busy(), "fresh frame must keep the slot");
        assert!(gate.release(fresh));
        assert!(!gate.is_busy());
    }

    #[test]
    fn test_reclaim_restarts_timeout() {
        let (gate, clock) = gate_with_clock(50);
        let _stuck = gate.try_admit().unwrap();
        clock.advance(Duration::from_millis(50));
        let _fresh = gate.try_admit().unwrap();
        clock.advance(Duration::from_millis(10));
        assert!(gate.try_admit().is_none());
    }

    #[test]
    fn test_zero_timeout_never_reclaims() {
        let (gate, clock) = gate_with_clock(0);
        let _ticket = gate.try_admit().unwrap();
        clock.advance(Duration::from_secs(3600));
        assert!(gate.try_admit().is_none());
        assert_eq!(gate.stats().reclaimed, 0);
    }

    #[test]
    fn test_release_from_other_thread() {
        let gate = Arc::new(FrameGate::new(Duration::from_secs(2)));
        let ticket = gate.try_admit().unwrap();
        let worker_gate = gate.clone();
        let released = thread::spawn(move || worker_gate.release(ticket))
            .join()
            .unwrap();
        assert!(released);
        assert!(gate.try_admit().is_some());
    }

    #[test]
    fn test_at_most_one_admitted_under_contention() {
        let gate = Arc::new(FrameGate::new(Duration::ZERO));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = gate.clone();
                thread::spawn(move || (0..100).filter(|_| gate.try_admit().is_some()).count())
            })
            .collect();
        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 1);
        assert_eq!(gate.stats().dropped, 799);
    }
}
