//! Synchronized-duration selection.
//!
//! Candidate durations are every axis' minimum, the right edge of every
//! blocked gap, and the optional user floor. The smallest candidate that no
//! axis excludes wins; the first `dofs - 1` sorted candidates can never win
//! since the synchronized duration is at least the largest per-axis minimum.

use crate::math::ceil;
use crate::solve::FeasibleSet;

/// Which cached profile slot produced the winning candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyncSource {
    /// The axis' fastest profile.
    Fastest,
    /// The right-edge profile of the first gap.
    GapA,
    /// The right-edge profile of the second gap.
    GapB,
    /// The user-requested duration floor; no axis owns the candidate.
    Floor,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SyncOutcome {
    pub t_sync: f64,
    pub limiting_dof: Option<usize>,
    pub source: SyncSource,
}

/// Select the smallest synchronized duration reachable by all axes.
///
/// `possible_t_syncs` and `idx` are scratch buffers of length `3·dofs + 1`.
pub(crate) fn select_duration(
    blocks: &[FeasibleSet],
    t_min_floor: Option<f64>,
    discrete: bool,
    delta_time: f64,
    possible_t_syncs: &mut [f64],
    idx: &mut [usize],
) -> Option<SyncOutcome> {
    let dofs = blocks.len();

    if dofs == 0 {
        return Some(SyncOutcome {
            t_sync: t_min_floor.unwrap_or(0.0),
            limiting_dof: None,
            source: SyncSource::Floor,
        });
    }

    if dofs == 1 && t_min_floor.is_none() && !discrete {
        return Some(SyncOutcome {
            t_sync: blocks[0].t_min,
            limiting_dof: Some(0),
            source: SyncSource::Fastest,
        });
    }

    let mut any_interval = t_min_floor.is_some();
    for (dof, block) in blocks.iter().enumerate() {
        possible_t_syncs[dof] = block.t_min;
        possible_t_syncs[dofs + dof] =
            block.gap_a.as_ref().map_or(f64::INFINITY, |gap| gap.right);
        possible_t_syncs[2 * dofs + dof] =
            block.gap_b.as_ref().map_or(f64::INFINITY, |gap| gap.right);
        any_interval |= block.gap_a.is_some() || block.gap_b.is_some();
    }
    possible_t_syncs[3 * dofs] = t_min_floor.unwrap_or(f64::INFINITY);

    if discrete {
        for t in possible_t_syncs.iter_mut() {
            if t.is_finite() {
                *t = ceil(*t / delta_time) * delta_time;
            }
        }
    }

    // Test the candidates in sorted order, starting at the last per-axis
    // minimum.
    let considered = if any_interval { idx.len() } else { dofs };
    for (i, slot) in idx[..considered].iter_mut().enumerate() {
        *slot = i;
    }
    idx[..considered].sort_unstable_by(|&a, &b| possible_t_syncs[a].total_cmp(&possible_t_syncs[b]));

    for &i in &idx[dofs - 1..considered] {
        let t_sync = possible_t_syncs[i];
        if blocks.iter().any(|block| block.excludes(t_sync))
            || t_sync < t_min_floor.unwrap_or(0.0)
        {
            continue;
        }

        if i == 3 * dofs {
            return Some(SyncOutcome {
                t_sync,
                limiting_dof: None,
                source: SyncSource::Floor,
            });
        }

        let limiting_dof = i % dofs;
        let source = match i / dofs {
            0 => SyncSource::Fastest,
            1 => SyncSource::GapA,
            _ => SyncSource::GapB,
        };
        return Some(SyncOutcome {
            t_sync,
            limiting_dof: Some(limiting_dof),
            source,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profile;
    use crate::solve::DurationGap;

    fn block(t_min: f64) -> FeasibleSet {
        let mut profile = Profile::default();
        profile.t_sum[6] = t_min;
        FeasibleSet {
            fastest: profile,
            t_min,
            gap_a: None,
            gap_b: None,
        }
    }

    fn run(
        blocks: &[FeasibleSet],
        floor: Option<f64>,
        discrete: bool,
        delta_time: f64,
    ) -> Option<SyncOutcome> {
        let n = 3 * blocks.len() + 1;
        let mut t_syncs = alloc::vec![0.0; n];
        let mut idx = alloc::vec![0usize; n];
        select_duration(blocks, floor, discrete, delta_time, &mut t_syncs, &mut idx)
    }

    #[test]
    fn slowest_axis_wins() {
        let blocks = [block(1.0), block(3.0), block(2.0)];
        let outcome = run(&blocks, None, false, 0.0).unwrap();
        assert_eq!(outcome.t_sync, 3.0);
        assert_eq!(outcome.limiting_dof, Some(1));
        assert_eq!(outcome.source, SyncSource::Fastest);
    }

    #[test]
    fn blocked_gap_pushes_to_right_edge() {
        let mut slow = block(1.0);
        slow.gap_a = Some(DurationGap {
            left: 1.0,
            right: 4.0,
            profile: Profile::default(),
        });
        let blocks = [slow, block(2.0)];
        // 2.0 lies inside axis 0's gap, so the gap's right edge wins.
        let outcome = run(&blocks, None, false, 0.0).unwrap();
        assert_eq!(outcome.t_sync, 4.0);
        assert_eq!(outcome.limiting_dof, Some(0));
        assert_eq!(outcome.source, SyncSource::GapA);
    }

    #[test]
    fn floor_overrides_minima() {
        let blocks = [block(1.0), block(2.0)];
        let outcome = run(&blocks, Some(5.0), false, 0.0).unwrap();
        assert_eq!(outcome.t_sync, 5.0);
        assert_eq!(outcome.limiting_dof, None);
        assert_eq!(outcome.source, SyncSource::Floor);
    }

    #[test]
    fn discrete_snaps_up() {
        let blocks = [block(1.03)];
        let outcome = run(&blocks, None, true, 0.1).unwrap();
        assert!((outcome.t_sync - 1.1).abs() < 1e-12);
    }

    #[test]
    fn single_axis_fast_path() {
        let blocks = [block(2.5)];
        let outcome = run(&blocks, None, false, 0.0).unwrap();
        assert_eq!(outcome.t_sync, 2.5);
        assert_eq!(outcome.limiting_dof, Some(0));
    }
}
