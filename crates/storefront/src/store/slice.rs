//! Per-entity query cache slice.
//!
//! A slice moves `Idle -> Loading -> Succeeded | Failed` and back to
//! `Loading` on the next fetch. Each fetch is stamped with a generation;
//! only the most recently started fetch may settle the slice, so a slow
//! response can never overwrite a newer one.

use serde::Serialize;

/// Lifecycle of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// What a failed fetch does to previously fetched data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Keep showing the last good data alongside the error.
    #[default]
    RetainData,
    /// Drop the data when the fetch fails.
    ClearData,
}

/// Proof that a fetch was started; consumed when the fetch settles.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a ticket must be settled with succeed, fail or abandon"]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Outcome of settling a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Settle {
    /// The ticket was current and the slice was updated.
    Applied,
    /// A newer fetch had started; the result was discarded.
    Superseded,
}

impl Settle {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Cached result of one kind of fetch.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySlice<T> {
    status: FetchStatus,
    data: Option<T>,
    error: Option<String>,
    #[serde(skip)]
    policy: ErrorPolicy,
    #[serde(skip)]
    generation: u64,
    /// Status to return to when an in-flight fetch is abandoned.
    #[serde(skip)]
    settled: FetchStatus,
}

impl<T> Default for QuerySlice<T> {
    fn default() -> Self {
        Self::with_policy(ErrorPolicy::RetainData)
    }
}

impl<T> QuerySlice<T> {
    /// Idle slice that keeps stale data on failure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_policy(policy: ErrorPolicy) -> Self {
        Self {
            status: FetchStatus::Idle,
            data: None,
            error: None,
            policy,
            generation: 0,
            settled: FetchStatus::Idle,
        }
    }

    #[must_use]
    pub const fn status(&self) -> FetchStatus {
        self.status
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// Start a fetch. Any fetch already in flight is superseded.
    pub fn begin(&mut self) -> FetchTicket {
        if self.status != FetchStatus::Loading {
            self.settled = self.status;
        }
        self.generation += 1;
        self.status = FetchStatus::Loading;
        self.error = None;
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Store fetched data, replacing what was there.
    pub fn succeed(&mut self, ticket: FetchTicket, data: T) -> Settle {
        if !self.is_current(&ticket) {
            return Settle::Superseded;
        }
        self.status = FetchStatus::Succeeded;
        self.data = Some(data);
        self.error = None;
        Settle::Applied
    }

    /// Record a failure, keeping or dropping data per the slice's policy.
    pub fn fail(&mut self, ticket: FetchTicket, message: impl Into<String>) -> Settle {
        if !self.is_current(&ticket) {
            return Settle::Superseded;
        }
        self.status = FetchStatus::Failed;
        self.error = Some(message.into());
        if self.policy == ErrorPolicy::ClearData {
            self.data = None;
        }
        Settle::Applied
    }

    /// Drop an in-flight fetch without recording an error.
    pub fn abandon(&mut self, ticket: FetchTicket) -> Settle {
        if !self.is_current(&ticket) {
            return Settle::Superseded;
        }
        self.status = self.settled;
        Settle::Applied
    }

    fn is_current(&self, ticket: &FetchTicket) -> bool {
        let current = ticket.generation == self.generation;
        if !current {
            tracing::debug!(
                ticket = ticket.generation,
                latest = self.generation,
                "Discarding superseded fetch result"
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut slice: QuerySlice<Vec<u32>> = QuerySlice::new();
        assert_eq!(slice.status(), FetchStatus::Idle);

        let ticket = slice.begin();
        assert!(slice.is_loading());

        assert_eq!(slice.succeed(ticket, vec![1, 2]), Settle::Applied);
        assert_eq!(slice.status(), FetchStatus::Succeeded);
        assert_eq!(slice.data(), Some(&vec![1, 2]));
        assert!(slice.error().is_none());
    }

    #[test]
    fn test_failure_retains_data() {
        let mut slice = QuerySlice::new();
        let ticket = slice.begin();
        let _ = slice.succeed(ticket, vec!["a"]);

        let ticket = slice.begin();
        let _ = slice.fail(ticket, "HTTP 500");

        assert_eq!(slice.status(), FetchStatus::Failed);
        assert_eq!(slice.error(), Some("HTTP 500"));
        assert_eq!(slice.data(), Some(&vec!["a"]));
    }

    #[test]
    fn test_failure_clears_data_when_configured() {
        let mut slice = QuerySlice::with_policy(ErrorPolicy::ClearData);
        let ticket = slice.begin();
        let _ = slice.succeed(ticket, vec!["root"]);

        let ticket = slice.begin();
        let _ = slice.fail(ticket, "offline");

        assert!(slice.data().is_none());
        assert_eq!(slice.error(), Some("offline"));
    }

    #[test]
    fn test_new_fetch_clears_previous_error() {
        let mut slice: QuerySlice<u8> = QuerySlice::new();
        let ticket = slice.begin();
        let _ = slice.fail(ticket, "boom");

        let _ticket = slice.begin();
        assert!(slice.error().is_none());
    }

    #[test]
    fn test_stale_success_is_discarded() {
        let mut slice = QuerySlice::new();
        let first = slice.begin();
        let second = slice.begin();

        assert_eq!(slice.succeed(second, "newer"), Settle::Applied);
        assert_eq!(slice.succeed(first, "older"), Settle::Superseded);
        assert_eq!(slice.data(), Some(&"newer"));
        assert_eq!(slice.status(), FetchStatus::Succeeded);
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let mut slice = QuerySlice::new();
        let first = slice.begin();
        let second = slice.begin();

        let _ = slice.succeed(second, 7);
        assert_eq!(slice.fail(first, "late error"), Settle::Superseded);
        assert!(slice.error().is_none());
        assert_eq!(slice.status(), FetchStatus::Succeeded);
    }

    #[test]
    fn test_older_ticket_cannot_settle_while_newer_in_flight() {
        let mut slice = QuerySlice::new();
        let first = slice.begin();
        let second = slice.begin();

        assert_eq!(slice.succeed(first, 1), Settle::Superseded);
        assert!(slice.is_loading());
        assert!(slice.data().is_none());

        let _ = slice.succeed(second, 2);
        assert_eq!(slice.data(), Some(&2));
    }

    #[test]
    fn test_abandon_restores_settled_status() {
        let mut slice = QuerySlice::new();
        let ticket = slice.begin();
        let _ = slice.succeed(ticket, 1);

        let ticket = slice.begin();
        let _ = slice.begin();
        // The newest ticket is the one in flight, so the older one is stale
        assert_eq!(slice.abandon(ticket), Settle::Superseded);

        let ticket = slice.begin();
        assert_eq!(slice.abandon(ticket), Settle::Applied);
        assert_eq!(slice.status(), FetchStatus::Succeeded);
        assert!(slice.error().is_none());
        assert_eq!(slice.data(), Some(&1));
    }

    #[test]
    fn test_abandon_from_idle() {
        let mut slice: QuerySlice<u8> = QuerySlice::new();
        let ticket = slice.begin();
        let _ = slice.abandon(ticket);
        assert_eq!(slice.status(), FetchStatus::Idle);
    }
}
