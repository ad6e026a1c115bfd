//! # Reveal Animator
//!
//! Simulates incremental generation by revealing a finished reply a few
//! characters at a time. Purely presentational: the session manager commits
//! the full reply text regardless, so skipping the animation entirely is
//! always correct.
//!
//! A `RevealPlan` is computed once per reply: strictly increasing
//! char-prefix boundaries (a small randomized step per tick) plus a jittered
//! per-tick delay. The per-tick delay is capped so that even the slowest
//! possible draw finishes within `MAX_TOTAL_MS`: the plan is a finite list,
//! so termination never depends on scheduling.

use std::time::Duration;

use rand::Rng;

/// Characters revealed per tick (inclusive band).
const MIN_STEP_CHARS: usize = 2;
const MAX_STEP_CHARS: usize = 6;

/// Nominal per-tick delay band, before the total-duration cap is applied.
const MIN_TICK_MS: u64 = 18;
const MAX_TICK_MS: u64 = 40;

/// Hard ceiling on one whole reveal, however long the reply is.
pub const MAX_TOTAL_MS: u64 = 2_500;

/// Upper bound on tick count. Long replies take bigger steps instead of more
/// ticks, which keeps every per-tick delay above timer resolution.
const MAX_STEPS: usize = 120;

/// Precomputed reveal schedule for one reply.
pub struct RevealPlan {
    steps: Vec<usize>,
    /// Per-tick delay cap; jittered delays never exceed this.
    max_tick: Duration,
}

impl RevealPlan {
    pub fn new(text: &str, rng: &mut impl Rng) -> Self {
        let total = text.chars().count();
        let min_step = MIN_STEP_CHARS.max(total.div_ceil(MAX_STEPS));
        let max_step = MAX_STEP_CHARS.max(min_step * 3);
        let mut steps = Vec::new();
        let mut at = 0usize;
        while at < total {
            at = (at + rng.gen_range(min_step..=max_step)).min(total);
            steps.push(at);
        }

        let cap_ms = if steps.is_empty() {
            MAX_TICK_MS
        } else {
            (MAX_TOTAL_MS / steps.len() as u64).max(1)
        };
        Self {
            steps,
            max_tick: Duration::from_millis(MAX_TICK_MS.min(cap_ms)),
        }
    }

    /// Strictly increasing char-prefix boundaries; the last equals the
    /// reply's char count. Empty for an empty reply.
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Jittered delay before the next tick, bounded by the per-tick cap.
    pub fn tick_delay(&self, rng: &mut impl Rng) -> Duration {
        let cap = (self.max_tick.as_millis() as u64).max(1);
        let low = MIN_TICK_MS.min(cap);
        Duration::from_millis(rng.gen_range(low..=cap))
    }

    /// Worst-case total duration of this plan.
    pub fn max_duration(&self) -> Duration {
        self.max_tick * self.steps.len() as u32
    }
}

/// First `chars` characters of `text`, cut at a char boundary.
pub fn prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
