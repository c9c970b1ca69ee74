//! Memo store entry types.

use tokio::sync::watch;

/// A value held by the memo store.
#[derive(Debug)]
pub enum Entry<V> {
    /// A computation is in flight. Callers that find this entry wait on the
    /// same flight instead of starting their own computation.
    Pending(Flight<V>),
    /// The computed value.
    Resolved(V),
}

impl<V> Entry<V> {
    /// Creates a fresh pending entry and the publisher that completes it.
    pub(crate) fn pending() -> (Self, Publisher<V>) {
        let (sender, receiver) = watch::channel(Outcome::Running);
        (
            Self::Pending(Flight { outcome: receiver }),
            Publisher { sender },
        )
    }

    pub fn state(&self) -> EntryState {
        match self {
            Self::Pending(_) => EntryState::Pending,
            Self::Resolved(_) => EntryState::Resolved,
        }
    }

    /// Returns the value if the entry is resolved.
    pub fn value(&self) -> Option<&V> {
        match self {
            Self::Pending(_) => None,
            Self::Resolved(value) => Some(value),
        }
    }

    /// Returns true if this is the pending entry of `flight`.
    pub(crate) fn is_pending_on(&self, flight: &Flight<V>) -> bool {
        matches!(self, Self::Pending(own) if own.outcome.same_channel(&flight.outcome))
    }
}

impl<V: Clone> Clone for Entry<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending(flight) => Self::Pending(flight.clone()),
            Self::Resolved(value) => Self::Resolved(value.clone()),
        }
    }
}

#[derive(Debug)]
pub(crate) enum Outcome<V> {
    Running,
    Done(V),
    Failed,
}

/// Handle on an in-flight computation.
///
/// The computation runs in its own task, so it completes even when every
/// caller waiting on it has gone away.
#[derive(Debug)]
pub struct Flight<V> {
    outcome: watch::Receiver<Outcome<V>>,
}

impl<V> Clone for Flight<V> {
    fn clone(&self) -> Self {
        Self {
            outcome: self.outcome.clone(),
        }
    }
}

impl<V: Clone> Flight<V> {
    /// Waits for the computation to finish.
    ///
    /// Returns `None` if it failed or its task ended without publishing.
    pub async fn wait(&self) -> Option<V> {
        let mut receiver = self.outcome.clone();
        let outcome = receiver
            .wait_for(|outcome| !matches!(outcome, Outcome::Running))
            .await
            .ok()?;
        match &*outcome {
            Outcome::Done(value) => Some(value.clone()),
            Outcome::Running | Outcome::Failed => None,
        }
    }
}

/// Completes a [`Flight`]. Dropping it unpublished reads as a failure.
pub(crate) struct Publisher<V> {
    sender: watch::Sender<Outcome<V>>,
}

impl<V> Publisher<V> {
    pub(crate) fn flight(&self) -> Flight<V> {
        Flight {
            outcome: self.sender.subscribe(),
        }
    }

    pub(crate) fn publish(self, outcome: Outcome<V>) {
        self.sender.send_replace(outcome);
    }
}

/// Lifecycle of a fingerprint in the store.
///
/// `Absent -> Pending -> Resolved`; a failed computation goes back to
/// `Absent`, and so does an evicted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryState {
    Absent,
    Pending,
    Resolved,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_entry_reports_state() {
        let (entry, publisher) = Entry::<u32>::pending();
        assert_eq!(entry.state(), EntryState::Pending);
        assert_eq!(entry.value(), None);
        assert!(entry.is_pending_on(&publisher.flight()));
        assert_eq!(Entry::Resolved(7).value(), Some(&7));
    }

    #[test]
    fn test_is_pending_on_compares_identity() {
        let (entry, _publisher) = Entry::<u32>::pending();
        let (_, other) = Entry::<u32>::pending();
        assert!(!entry.is_pending_on(&other.flight()));
        assert!(!Entry::Resolved(1).is_pending_on(&other.flight()));
    }

    #[tokio::test]
    async fn test_waiters_receive_published_value() {
        let (entry, publisher) = Entry::<u32>::pending();
        let Entry::Pending(flight) = entry else {
            panic!("expected pending entry");
        };

        let waiter = tokio::spawn(async move { flight.wait().await });
        publisher.publish(Outcome::Done(9));
        assert_eq!(waiter.await.unwrap(), Some(9));
    }

    #[tokio::test]
    async fn test_dropped_publisher_reads_as_failure() {
        let (entry, publisher) = Entry::<u32>::pending();
        let Entry::Pending(flight) = entry else {
            panic!("expected pending entry");
        };

        drop(publisher);
        assert_eq!(flight.wait().await, None);
    }
}
