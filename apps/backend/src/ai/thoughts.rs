//! Cosmetic table talk for AI seats.
//!
//! Lines are drawn from a fixed vocabulary with an RNG of their own, so they
//! say nothing about the numbers behind the move.

use std::sync::Mutex;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::domain::state::Phase;

const DRAWING: &[&str] = &[
    "Hmm, what's on top?",
    "Let me think about this one.",
    "Decisions, decisions.",
    "Feeling lucky.",
];

const DISCARDING: &[&str] = &[
    "This one has to go.",
    "Not sure I need this.",
    "Let's see how you like that.",
    "Tidying up.",
];

const LAYING_OFF: &[&str] = &["Every point counts.", "Let me check your melds.", "Hmm."];

const BETWEEN_ROUNDS: &[&str] = &["Good round.", "Again!", "Shuffle up."];

/// Salt applied to the player seed so thoughts never share a stream with
/// decisions.
const THOUGHT_SALT: u64 = 0x7468_6f75_6768_7473;

pub struct ThoughtSampler {
    rng: Mutex<ChaCha8Rng>,
}

impl ThoughtSampler {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s ^ THOUGHT_SALT),
            None => ChaCha8Rng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// One line for `phase`, or nothing if the lock is poisoned or the
    /// phase has no vocabulary.
    pub fn sample(&self, phase: Phase) -> Option<String> {
        let pool = match phase {
            Phase::UpcardDecision | Phase::Draw => DRAWING,
            Phase::Discard => DISCARDING,
            Phase::Layoff => LAYING_OFF,
            Phase::RoundOver => BETWEEN_ROUNDS,
            Phase::Waiting | Phase::GameOver => return None,
        };
        let mut rng = self.rng.lock().ok()?;
        pool.choose(&mut *rng).map(|s| (*s).to_string())
    }
}
