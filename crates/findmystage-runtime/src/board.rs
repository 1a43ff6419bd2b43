//! Displayed-profile board with request fencing.
//!
//! Each analysis gets a monotonically increasing request id. Only the most
//! recently started request may settle the displayed profile; responses from
//! superseded requests are discarded no matter when they arrive.

use std::sync::atomic::{AtomicU64, Ordering};

use findmystage_core::{Error, Result};
use findmystage_profile::{ParsedProfile, SpeakerProfile};
use parking_lot::RwLock;
use tracing::warn;

/// Outcome of settling a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The result is now displayed.
    Applied,
    /// A newer request started first; the result was dropped.
    Stale { latest: u64 },
}

/// Terminal result of one request.
#[derive(Debug, Clone)]
pub enum Outcome {
    Ready(ParsedProfile),
    Failed(String),
}

/// Holds the single displayed profile for one page instance.
#[derive(Debug, Default)]
pub struct ProfileBoard {
    last_issued: AtomicU64,
    current: RwLock<Option<SpeakerProfile>>,
}

impl ProfileBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request: issue its id and display a fresh `Loading` profile.
    pub fn begin(&self) -> u64 {
        let mut current = self.current.write();
        let id = self.last_issued.fetch_add(1, Ordering::SeqCst) + 1;
        *current = Some(SpeakerProfile::loading(id));
        id
    }

    /// Most recently issued request id (0 before the first request).
    pub fn latest(&self) -> u64 {
        self.last_issued.load(Ordering::SeqCst)
    }

    /// Snapshot of the displayed profile.
    pub fn current(&self) -> Option<SpeakerProfile> {
        self.current.read().clone()
    }

    /// Apply `outcome` to request `id` if it is still the latest.
    ///
    /// Returns the settled profile alongside the settlement; for a stale
    /// request that is the request's own profile, never displayed.
    pub fn settle(&self, id: u64, outcome: Outcome) -> Result<(Settlement, SpeakerProfile)> {
        let mut current = self.current.write();
        let profile = current
            .as_mut()
            .ok_or_else(|| Error::InvalidTransition(format!("request {} was never started", id)))?;

        if profile.request_id != id {
            let latest = profile.request_id;
            warn!("Discarding stale result for request {} (latest is {})", id, latest);
            let mut own = SpeakerProfile::loading(id);
            apply(&mut own, outcome)?;
            return Ok((Settlement::Stale { latest }, own));
        }

        apply(profile, outcome)?;
        Ok((Settlement::Applied, profile.clone()))
    }

    pub fn settle_ready(&self, id: u64, parsed: ParsedProfile) -> Result<Settlement> {
        self.settle(id, Outcome::Ready(parsed)).map(|(s, _)| s)
    }

    pub fn settle_failed(&self, id: u64, reason: &str) -> Result<Settlement> {
        self.settle(id, Outcome::Failed(reason.to_string())).map(|(s, _)| s)
    }
}

fn apply(profile: &mut SpeakerProfile, outcome: Outcome) -> Result<()> {
    match outcome {
        Outcome::Ready(parsed) => profile.complete(parsed),
        Outcome::Failed(reason) => profile.fail(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use findmystage_profile::ProfileState;

    fn parsed(topic: &str) -> ParsedProfile {
        ParsedProfile::unattributed(vec![topic.into()], vec!["Calm".into()], "s".into())
    }

    #[test]
    fn test_ids_increase_and_begin_shows_loading() {
        let board = ProfileBoard::new();
        assert!(board.current().is_none());
        assert_eq!(board.latest(), 0);

        let first = board.begin();
        let second = board.begin();
        assert!(second > first);
        let shown = board.current().unwrap();
        assert_eq!(shown.request_id, second);
        assert!(shown.is_loading());
    }

    #[test]
    fn test_second_resolving_first_wins() {
        let board = ProfileBoard::new();
        let first = board.begin();
        let second = board.begin();

        assert_eq!(board.settle_ready(second, parsed("second")).unwrap(), Settlement::Applied);
        assert_eq!(
            board.settle_ready(first, parsed("first")).unwrap(),
            Settlement::Stale { latest: second }
        );

        let shown = board.current().unwrap();
        assert_eq!(shown.request_id, second);
        assert_eq!(shown.topics, vec!["second"]);
    }

    #[test]
    fn test_first_resolving_first_is_still_discarded() {
        let board = ProfileBoard::new();
        let first = board.begin();
        let second = board.begin();

        assert_eq!(
            board.settle_failed(first, "boom").unwrap(),
            Settlement::Stale { latest: second }
        );
        assert!(board.current().unwrap().is_loading());
        board.settle_ready(second, parsed("second")).unwrap();
        assert_eq!(board.current().unwrap().state, ProfileState::Ready);
    }

    #[test]
    fn test_double_settle_is_rejected() {
        let board = ProfileBoard::new();
        let id = board.begin();
        board.settle_ready(id, parsed("a")).unwrap();
        assert!(board.settle_failed(id, "again").is_err());
        assert_eq!(board.current().unwrap().topics, vec!["a"]);
    }

    #[test]
    fn test_stale_settle_returns_own_profile() {
        let board = ProfileBoard::new();
        let first = board.begin();
        let _second = board.begin();
        let (settlement, own) = board.settle(first, Outcome::Failed("late".into())).unwrap();
        assert!(matches!(settlement, Settlement::Stale { .. }));
        assert_eq!(own.request_id, first);
        assert_eq!(own.state, ProfileState::Failed { reason: "late".into() });
        assert!(board.current().unwrap().is_loading());
    }

    #[test]
    fn test_settle_before_begin_is_error() {
        let board = ProfileBoard::new();
        assert!(board.settle_ready(1, parsed("a")).is_err());
    }

    #[test]
    fn test_concurrent_begins_issue_unique_ids() {
        let board = std::sync::Arc::new(ProfileBoard::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let board = board.clone();
                std::thread::spawn(move || (0..50).map(|_| board.begin()).collect::<Vec<_>>())
            })
            .collect();
        let mut ids: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert_eq!(board.current().unwrap().request_id, 400);
    }
}
