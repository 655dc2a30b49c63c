//! Discarding out-of-order list responses
//!
//! Every fetch takes a ticket from a [`RequestSequencer`]. When the answer
//! arrives it is applied only if its ticket is still the latest one issued,
//! so a slow response to an old filter never overwrites a newer list.

/// Monotonic counter of dispatched fetches
#[derive(Debug, Default, Clone)]
pub struct RequestSequencer {
    latest: u64,
}

/// A dispatched fetch: its sequence number and the query it was sent with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<Q> {
    /// Position in dispatch order, starting at 1
    pub seq: u64,
    /// Query the request was built from
    pub query: Q,
}

impl RequestSequencer {
    /// Create a sequencer with no fetches dispatched
    #[must_use]
    pub const fn new() -> Self {
        Self { latest: 0 }
    }

    /// Issue the next ticket for `query`
    pub fn issue<Q>(&mut self, query: Q) -> Ticket<Q> {
        self.latest += 1;
        Ticket {
            seq: self.latest,
            query,
        }
    }

    /// Whether `seq` belongs to the most recently dispatched fetch
    #[must_use]
    pub const fn is_latest(&self, seq: u64) -> bool {
        seq == self.latest
    }

    /// Sequence number of the most recently dispatched fetch (0 if none)
    #[must_use]
    pub const fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_the_newest_ticket_is_latest() {
        let mut sequencer = RequestSequencer::new();
        let first = sequencer.issue("status=POSTED");
        let second = sequencer.issue("status=BOOKED");

        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
        assert!(!sequencer.is_latest(first.seq));
        assert!(sequencer.is_latest(second.seq));
        assert_eq!(sequencer.latest(), 2);
    }
}
