//! Deployment cadence
//!
//! Decides when the simulated team should ship next, given when it last
//! shipped and the interval its tier allows:
//!
//! - too soon since the last deployment: skip, ask again later
//! - overdue: fire in one minute
//! - inside the window: fire after a random number of minutes
//!
//! The random draw comes from a [`RandomSource`] so callers can seed it.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use std::num::NonZeroU64;
use std::time::Duration;

use crate::domain::tier::PerformanceTier;

/// Source of uniformly distributed integers
///
/// Implemented for every [`rand::RngCore`], so a seeded
/// `rand_chacha::ChaCha8Rng` gives reproducible schedules.
pub trait RandomSource {
    /// Returns an integer drawn uniformly from `low..=high`
    fn int_in_range(&mut self, low: u64, high: u64) -> u64;
}

impl<R: rand::RngCore> RandomSource for R {
    fn int_in_range(&mut self, low: u64, high: u64) -> u64 {
        self.gen_range(low..=high)
    }
}

/// What the scheduler wants the caller to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayDecision {
    /// Not due yet; re-evaluate later
    Skip,

    /// Trigger a deployment after this many minutes
    FireAfter(NonZeroU64),
}

impl DelayDecision {
    /// Shortest possible delay
    pub const IMMEDIATE: DelayDecision = DelayDecision::FireAfter(NonZeroU64::MIN);

    /// Delay in minutes, `None` for [`DelayDecision::Skip`]
    pub fn minutes(&self) -> Option<u64> {
        match self {
            DelayDecision::Skip => None,
            DelayDecision::FireAfter(minutes) => Some(minutes.get()),
        }
    }

    /// Delay as a wall-clock duration, `None` for [`DelayDecision::Skip`]
    pub fn delay(&self) -> Option<Duration> {
        self.minutes().map(|m| Duration::from_secs(m.saturating_mul(60)))
    }
}

/// Computes the delay before the next deployment attempt
///
/// A repository without deployments is treated as last deployed at the Unix
/// epoch, which makes every tier overdue. Bounds are compared strictly, so
/// an elapsed time exactly on either bound falls into the random branch.
///
/// The random delay is measured from `now` and spans the full width of the
/// tier's interval; it is not shortened by time already spent in the window.
pub fn minutes_until_next_deployment<R: RandomSource + ?Sized>(
    tier: &PerformanceTier,
    last_deploy: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    rng: &mut R,
) -> DelayDecision {
    let last_deploy = last_deploy.unwrap_or(DateTime::UNIX_EPOCH);
    let elapsed = now.signed_duration_since(last_deploy);

    let lower = minutes(tier.interval.lower_bound);
    let upper = minutes(tier.interval.upper_bound);

    if elapsed < lower {
        return DelayDecision::Skip;
    }

    if elapsed > upper {
        return DelayDecision::IMMEDIATE;
    }

    let span = tier.interval.span();
    let drawn = if span == 0 {
        1
    } else {
        rng.int_in_range(1, span)
    };

    NonZeroU64::new(drawn)
        .map(DelayDecision::FireAfter)
        .unwrap_or(DelayDecision::IMMEDIATE)
}

/// Saturates at [`TimeDelta::MAX`] for bounds chrono cannot represent
fn minutes(value: u64) -> TimeDelta {
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_minutes)
        .unwrap_or(TimeDelta::MAX)
}
