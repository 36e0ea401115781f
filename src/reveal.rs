//! Scroll-reveal scheduler
//!
//! A single scheduler instance watches registered elements and fires each
//! one's reveal transition exactly once, capping how many transitions run at
//! the same time. The core is a plain state machine over opaque handles with
//! injected timestamps; the DOM layer in the shell owns the element mapping,
//! the IntersectionObserver, and the timers.

use std::collections::BTreeSet;

/// Upper bound on transitions in flight at once
pub const MAX_CONCURRENT_ANIMATIONS: usize = 4;
/// Registration debounce window (ms), collapsing bursts from multiple
/// mounting consumers into one batch
pub const SETUP_DEBOUNCE_MS: f64 = 100.0;
/// How long a reveal occupies a concurrency slot (ms); longer than the
/// transition itself so the tail never overlaps a fresh batch
pub const ANIMATION_HOLD_MS: f64 = 500.0;

/// Reveal scheduler core. Handles are opaque and never reconsidered once
/// revealed.
#[derive(Debug, Default)]
pub struct RevealScheduler {
    /// Registered but waiting for the debounce window to close
    pending: Vec<u64>,
    pending_deadline: Option<f64>,
    watched: BTreeSet<u64>,
    revealed: BTreeSet<u64>,
    /// Release deadlines of transitions currently in flight
    releases: Vec<f64>,
}

impl RevealScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue handles for watching. Repeated calls inside the debounce window
    /// merge into one batch and push the deadline out; handles already
    /// watched or revealed are ignored.
    pub fn register<I: IntoIterator<Item = u64>>(&mut self, handles: I, now: f64) {
        for h in handles {
            if !self.watched.contains(&h)
                && !self.revealed.contains(&h)
                && !self.pending.contains(&h)
            {
                self.pending.push(h);
            }
        }
        if !self.pending.is_empty() {
            self.pending_deadline = Some(now + SETUP_DEBOUNCE_MS);
        }
    }

    /// Commit the pending batch once the debounce window has elapsed.
    /// Returns the handles that became watched (for the DOM layer to start
    /// observing); empty while the window is still open.
    pub fn flush(&mut self, now: f64) -> Vec<u64> {
        match self.pending_deadline {
            Some(deadline) if now >= deadline => {
                self.pending_deadline = None;
                let batch: Vec<u64> = self.pending.drain(..).collect();
                self.watched.extend(batch.iter().copied());
                batch
            }
            _ => Vec::new(),
        }
    }

    /// A visibility callback reported these handles intersecting. Takes only
    /// as many as fit under the concurrency cap; the rest stay watched and
    /// retry on a later callback. Returns the handles to reveal now,
    /// at most once each for the lifetime of the scheduler.
    pub fn on_intersection(&mut self, visible: &[u64], now: f64) -> Vec<u64> {
        self.expire(now);
        let budget = MAX_CONCURRENT_ANIMATIONS.saturating_sub(self.releases.len());

        let mut taken = Vec::new();
        for &h in visible {
            if taken.len() >= budget {
                break;
            }
            if self.watched.remove(&h) {
                self.revealed.insert(h);
                self.releases.push(now + ANIMATION_HOLD_MS);
                taken.push(h);
            }
        }
        taken
    }

    /// Transitions still occupying a concurrency slot at `now`
    pub fn in_flight(&mut self, now: f64) -> usize {
        self.expire(now);
        self.releases.len()
    }

    /// Earliest timestamp at which a pending batch commits or a slot frees,
    /// if any; lets the DOM layer schedule a single wakeup timer.
    pub fn next_wakeup(&self) -> Option<f64> {
        self.pending_deadline
            .into_iter()
            .chain(self.releases.iter().copied())
            .min_by(f64::total_cmp)
    }

    pub fn is_watched(&self, handle: u64) -> bool {
        self.watched.contains(&handle)
    }

    pub fn is_revealed(&self, handle: u64) -> bool {
        self.revealed.contains(&handle)
    }

    pub fn watched_len(&self) -> usize {
        self.watched.len()
    }

    /// Nothing watched, pending, or in flight; the owner may tear down the
    /// underlying observer.
    pub fn is_idle(&self) -> bool {
        self.watched.is_empty() && self.pending.is_empty() && self.releases.is_empty()
    }

    fn expire(&mut self, now: f64) {
        self.releases.retain(|&deadline| deadline > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(handles: std::ops::Range<u64>, now: f64) -> RevealScheduler {
        let mut s = RevealScheduler::new();
        s.register(handles, now);
        s.flush(now + SETUP_DEBOUNCE_MS);
        s
    }

    #[test]
    fn registration_waits_for_the_debounce_window() {
        let mut s = RevealScheduler::new();
        s.register(0..3, 1_000.0);

        assert!(s.flush(1_050.0).is_empty());
        assert_eq!(s.watched_len(), 0);

        let batch = s.flush(1_100.0);
        assert_eq!(batch.len(), 3);
        assert_eq!(s.watched_len(), 3);
    }

    #[test]
    fn rapid_registrations_collapse_into_one_batch() {
        let mut s = RevealScheduler::new();
        s.register(0..2, 1_000.0);
        s.register(1..4, 1_050.0);

        // Second call pushed the deadline out
        assert!(s.flush(1_100.0).is_empty());

        let batch = s.flush(1_150.0);
        assert_eq!(batch.len(), 4);
    }

    #[test]
    fn batch_is_clipped_to_the_concurrency_cap() {
        let mut s = registered(0..10, 0.0);

        let taken = s.on_intersection(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9], 1_000.0);
        assert_eq!(taken.len(), MAX_CONCURRENT_ANIMATIONS);
        // The rest stay watched for a later callback
        assert_eq!(s.watched_len(), 10 - MAX_CONCURRENT_ANIMATIONS);
    }

    #[test]
    fn saturated_cap_reveals_nothing_until_a_slot_frees() {
        let mut s = registered(0..14, 0.0);

        // Fill every slot
        let first = s.on_intersection(&[0, 1, 2, 3], 1_000.0);
        assert_eq!(first.len(), 4);

        // Ten more intersect while all four are mid-transition
        let blocked = s.on_intersection(&[4, 5, 6, 7, 8, 9, 10, 11, 12, 13], 1_100.0);
        assert!(blocked.is_empty());
        assert_eq!(s.watched_len(), 10);

        // After the hold expires the same batch goes through, cap at a time
        let after = s.on_intersection(
            &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13],
            1_000.0 + ANIMATION_HOLD_MS + 1.0,
        );
        assert_eq!(after.len(), 4);
    }

    #[test]
    fn partial_budget_is_honored() {
        let mut s = registered(0..8, 0.0);

        assert_eq!(s.on_intersection(&[0, 1], 1_000.0).len(), 2);
        // Two slots busy: a batch of five takes only two more
        assert_eq!(s.on_intersection(&[2, 3, 4, 5, 6], 1_100.0).len(), 2);
        assert_eq!(s.in_flight(1_100.0), 4);
    }

    #[test]
    fn reveals_are_at_most_once() {
        let mut s = registered(0..2, 0.0);

        assert_eq!(s.on_intersection(&[0], 1_000.0), vec![0]);
        assert!(s.is_revealed(0));
        assert!(!s.is_watched(0));

        // Later callbacks and re-registration never bring it back
        assert!(s.on_intersection(&[0], 10_000.0).is_empty());
        s.register([0], 10_000.0);
        assert!(s.flush(20_000.0).is_empty());
        assert!(!s.is_watched(0));
    }

    #[test]
    fn idle_once_everything_revealed_and_released() {
        let mut s = registered(0..2, 0.0);
        assert!(!s.is_idle());

        s.on_intersection(&[0, 1], 1_000.0);
        // Transitions still hold slots
        assert!(!s.is_idle());

        assert_eq!(s.in_flight(1_000.0 + ANIMATION_HOLD_MS + 1.0), 0);
        assert!(s.is_idle());
    }

    #[test]
    fn next_wakeup_tracks_the_earliest_deadline() {
        let mut s = RevealScheduler::new();
        assert_eq!(s.next_wakeup(), None);

        s.register(0..1, 1_000.0);
        assert_eq!(s.next_wakeup(), Some(1_000.0 + SETUP_DEBOUNCE_MS));

        s.flush(1_100.0);
        s.on_intersection(&[0], 1_200.0);
        assert_eq!(s.next_wakeup(), Some(1_200.0 + ANIMATION_HOLD_MS));
    }
}
