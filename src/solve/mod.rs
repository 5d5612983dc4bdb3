//! Per-axis profile searches.
//!
//! The fastest search enumerates the closed shape catalogue and digests the
//! surviving candidates into a [`FeasibleSet`]: the minimum duration plus up
//! to two open intervals of durations no valid shape can realize. The timed
//! searches re-solve the catalogue against a prescribed duration.

mod position_fastest;
mod position_timed;
mod velocity;

pub(crate) use position_fastest::PositionFastest;
pub(crate) use position_timed::PositionTimed;
pub(crate) use velocity::{VelocityFastest, VelocityTimed};

use crate::math::{fabs, EPS};
use crate::profile::Profile;

/// Upper bound on surviving candidates of one fastest search. More than five
/// indicates numerical pathology and fails the search.
pub(crate) const MAX_CANDIDATES: usize = 6;

/// Candidate buffer of the fastest searches; lives on the stack.
pub(crate) type Candidates = heapless::Vec<Profile, MAX_CANDIDATES>;

/// Open interval of total durations no valid profile can realize.
#[derive(Debug, Clone)]
pub(crate) struct DurationGap {
    /// Shorter boundary duration (brake included).
    pub left: f64,
    /// Longer boundary duration (brake included).
    pub right: f64,
    /// The profile realizing `right`, cached for bit-exact reuse.
    pub profile: Profile,
}

impl DurationGap {
    fn between(first: &Profile, second: &Profile) -> Self {
        let d_first = first.t_sum[6] + first.brake.duration;
        let d_second = second.t_sum[6] + second.brake.duration;
        if d_first < d_second {
            Self {
                left: d_first,
                right: d_second,
                profile: second.clone(),
            }
        } else {
            Self {
                left: d_second,
                right: d_first,
                profile: first.clone(),
            }
        }
    }
}

/// Result of one axis' fastest search: the minimum duration and the blocked
/// duration gaps.
#[derive(Debug, Clone, Default)]
pub(crate) struct FeasibleSet {
    /// The fastest valid profile.
    pub fastest: Profile,
    /// Minimum total duration, brake included.
    pub t_min: f64,
    /// First blocked gap, if any.
    pub gap_a: Option<DurationGap>,
    /// Second blocked gap, if any.
    pub gap_b: Option<DurationGap>,
}

impl FeasibleSet {
    fn from_profile(profile: Profile) -> Self {
        let t_min = profile.t_sum[6] + profile.brake.duration;
        Self {
            fastest: profile,
            t_min,
            gap_a: None,
            gap_b: None,
        }
    }

    /// Whether no valid profile of this axis can realize the total duration
    /// `t`.
    pub fn excludes(&self, t: f64) -> bool {
        if t < self.t_min {
            return true;
        }
        if let Some(gap) = &self.gap_a {
            if gap.left < t && t < gap.right {
                return true;
            }
        }
        if let Some(gap) = &self.gap_b {
            if gap.left < t && t < gap.right {
                return true;
            }
        }
        false
    }

    /// Digest the surviving candidates of a fastest search.
    ///
    /// Valid candidate counts are 1, 2, 3 and 5; a count of 4 is pruned down
    /// to 3 by dropping one of a pair of near-identical opposite-direction
    /// profiles. Anything else is numerical pathology and fails.
    pub(crate) fn digest(mut candidates: Candidates) -> Option<Self> {
        let duration = |p: &Profile| p.t_sum[6];

        match candidates.len() {
            0 => return None,
            1 => return Some(Self::from_profile(candidates[0].clone())),
            2 => {
                if fabs(duration(&candidates[0]) - duration(&candidates[1])) < 8.0 * EPS {
                    return Some(Self::from_profile(candidates[0].clone()));
                }
                let idx_min = if duration(&candidates[0]) < duration(&candidates[1]) {
                    0
                } else {
                    1
                };
                let mut set = Self::from_profile(candidates[idx_min].clone());
                set.gap_a = Some(DurationGap::between(
                    &candidates[idx_min],
                    &candidates[1 - idx_min],
                ));
                return Some(set);
            }
            _ => {}
        }

        if candidates.len() == 4 {
            let diff =
                |i: usize, k: usize| fabs(duration(&candidates[i]) - duration(&candidates[k]));
            let opposed = |i: usize, k: usize| candidates[i].direction != candidates[k].direction;

            if diff(0, 1) < 32.0 * EPS && opposed(0, 1) {
                candidates.remove(1);
            } else if diff(2, 3) < 256.0 * EPS && opposed(2, 3) {
                candidates.remove(3);
            } else if diff(0, 3) < 256.0 * EPS && opposed(0, 3) {
                candidates.remove(3);
            } else {
                return None;
            }
        } else if candidates.len() % 2 == 0 {
            return None;
        }

        let count = candidates.len();
        let mut idx_min = 0;
        for i in 1..count {
            if duration(&candidates[i]) < duration(&candidates[idx_min]) {
                idx_min = i;
            }
        }

        let mut set = Self::from_profile(candidates[idx_min].clone());
        match count {
            3 => {
                let i1 = (idx_min + 1) % 3;
                let i2 = (idx_min + 2) % 3;
                set.gap_a = Some(DurationGap::between(&candidates[i1], &candidates[i2]));
            }
            5 => {
                let i1 = (idx_min + 1) % 5;
                let i2 = (idx_min + 2) % 5;
                let i3 = (idx_min + 3) % 5;
                let i4 = (idx_min + 4) % 5;
                if candidates[i1].direction == candidates[i2].direction {
                    set.gap_a = Some(DurationGap::between(&candidates[i1], &candidates[i2]));
                    set.gap_b = Some(DurationGap::between(&candidates[i3], &candidates[i4]));
                } else {
                    set.gap_a = Some(DurationGap::between(&candidates[i1], &candidates[i4]));
                    set.gap_b = Some(DurationGap::between(&candidates[i2], &candidates[i3]));
                }
            }
            _ => return None,
        }
        Some(set)
    }
}
