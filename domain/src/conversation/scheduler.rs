//! Turn scheduling
//!
//! Picks the next speaker uniformly at random under a no-immediate-repeat
//! policy: the previous speaker is excluded from the candidate set unless
//! they are the only participant available.

use crate::core::participant::ParticipantId;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Chooses the next speaker for each turn.
///
/// Remembers the previously chosen speaker internally; callers only supply
/// the currently available participant set.
pub struct TurnScheduler {
    previous: Option<ParticipantId>,
    rng: StdRng,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self {
            previous: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic scheduler for tests
    pub fn with_seed(seed: u64) -> Self {
        Self {
            previous: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The most recently selected speaker, if any
    pub fn previous(&self) -> Option<&ParticipantId> {
        self.previous.as_ref()
    }

    /// Select the next speaker from `available`.
    ///
    /// Candidates are `available` minus the previous speaker; when that
    /// leaves nothing (single-participant set), the full set is used.
    /// Selection within candidates is uniform-random, and the chosen
    /// identity becomes the new `previous`.
    ///
    /// # Panics
    ///
    /// Panics if `available` is empty. That is a caller bug, not a runtime
    /// condition: the orchestrator never runs with an empty roster.
    pub fn select_next(&mut self, available: &[ParticipantId]) -> ParticipantId {
        assert!(
            !available.is_empty(),
            "TurnScheduler::select_next called with no participants"
        );

        let candidates: Vec<&ParticipantId> = available
            .iter()
            .filter(|p| Some(*p) != self.previous.as_ref())
            .collect();

        let chosen: &ParticipantId = if candidates.is_empty() {
            available
                .choose(&mut self.rng)
                .expect("available is non-empty")
        } else {
            candidates
                .choose(&mut self.rng)
                .copied()
                .expect("candidates is non-empty")
        };

        let chosen = chosen.clone();
        self.previous = Some(chosen.clone());
        chosen
    }
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new()
    }
}
