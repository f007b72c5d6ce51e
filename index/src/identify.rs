//! Identification by neighbor voting.
//!
//! For each probe minutia, every neighbor descriptor opens a tolerance
//! window in `(x, y, angle)` space. Each enrolled minutia found in the
//! window's buckets gets one vote. Enrolled minutiae with at least
//! `minutia_threshold` votes add one point to their template's score.
//! Votes restart with every probe minutia; scores accumulate.

use fingerhash_minutiae::Minutia;
use serde::{Deserialize, Serialize};

use crate::config::{MatchConfig, ANGLE_RANGE, MAX_MATCHES, MAX_MINUTIAE_PER_TEMPLATE};
use crate::error::{IndexError, Result};
use crate::hash::GroupSpace;
use crate::store::BucketStore;

/// A candidate template and the number of probe minutiae it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub template_id: u32,
    pub score: u32,
}

/// Inclusive range of a coordinate clamped to `[-max, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LinearRange {
    begin: i64,
    end: i64,
}

impl LinearRange {
    fn new(value: i64, tolerance: i64, max: i64) -> Self {
        Self {
            begin: (value - tolerance).max(-max),
            end: (value + tolerance).min(max),
        }
    }

    fn steps(self, step: i64) -> impl Iterator<Item = i64> {
        (self.begin..=self.end).step_by(step as usize)
    }
}

/// Inclusive angular range. `begin` is in `0..360`; `end` may exceed 359
/// and is reduced at lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AngularRange {
    begin: i64,
    end: i64,
}

impl AngularRange {
    fn new(value: i64, tolerance: i64) -> Self {
        let range = ANGLE_RANGE as i64;
        if 2 * tolerance + 1 >= range {
            return Self { begin: 0, end: range - 1 };
        }
        let begin = (value - tolerance).rem_euclid(range);
        Self {
            begin,
            end: begin + 2 * tolerance,
        }
    }

    fn steps(self, step: i64) -> impl Iterator<Item = i64> {
        (self.begin..=self.end)
            .step_by(step as usize)
            .map(|t| t.rem_euclid(ANGLE_RANGE as i64))
    }
}

/// Scores every template id below `next_template_id` against `probe`.
///
/// The returned vector is indexed by template id.
pub(crate) fn score_templates(
    store: &BucketStore,
    space: &GroupSpace,
    cfg: &MatchConfig,
    next_template_id: u32,
    probe: &[Minutia],
) -> Result<Vec<u32>> {
    let templates = next_template_id as usize;
    let slots = templates
        .checked_mul(MAX_MINUTIAE_PER_TEMPLATE as usize)
        .ok_or(IndexError::OutOfMemory)?;

    let mut votes: Vec<u32> = Vec::new();
    votes.try_reserve_exact(slots)?;
    votes.resize(slots, 0);
    let mut scores: Vec<u32> = Vec::new();
    scores.try_reserve_exact(templates)?;
    scores.resize(templates, 0);
    // Slots voted for by the current probe minutia.
    let mut touched: Vec<usize> = Vec::new();

    let (x_tol, y_tol, t_tol) = (
        i64::from(cfg.x_tolerance),
        i64::from(cfg.y_tolerance),
        i64::from(cfg.t_tolerance),
    );
    let ppg = space.pixels_per_group();
    let dpg = space.degrees_per_group();

    for minutia in probe {
        for n in &minutia.neighbors {
            let xs = LinearRange::new(n.relative_x.into(), x_tol, space.max_x());
            let ys = LinearRange::new(n.relative_y.into(), y_tol, space.max_y());
            let ts = AngularRange::new(i64::from(n.relative_angle % ANGLE_RANGE), t_tol);

            for x in xs.steps(ppg) {
                for y in ys.steps(ppg) {
                    for t in ts.steps(dpg) {
                        let bucket = match space.bucket_index(x, y, t) {
                            Ok(bucket) => bucket,
                            Err(err) => {
                                tracing::trace!(%err, "window cell skipped");
                                continue;
                            }
                        };
                        for r in store.entries(bucket) {
                            let slot = r.raw() as usize;
                            if let Some(v) = votes.get_mut(slot) {
                                if *v == 0 {
                                    touched.try_reserve(1)?;
                                    touched.push(slot);
                                }
                                *v += 1;
                            }
                        }
                    }
                }
            }
        }

        if cfg.minutia_threshold == 0 {
            // Every slot passes, voted or not.
            for score in scores.iter_mut() {
                *score = score.saturating_add(MAX_MINUTIAE_PER_TEMPLATE);
            }
        }
        for &slot in &touched {
            if cfg.minutia_threshold > 0 && votes[slot] >= cfg.minutia_threshold {
                scores[slot / MAX_MINUTIAE_PER_TEMPLATE as usize] += 1;
            }
            votes[slot] = 0;
        }
        touched.clear();
    }

    Ok(scores)
}

/// Templates scoring at least `template_threshold`, best first. Equal
/// scores keep template id order.
pub(crate) fn rank(scores: &[u32], template_threshold: u32) -> Vec<Match> {
    let mut matches: Vec<Match> = scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score >= template_threshold)
        .map(|(id, &score)| Match {
            template_id: id as u32,
            score,
        })
        .collect();
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches.truncate(MAX_MATCHES);
    matches
}

/// The highest ranked template, if any passes the threshold.
pub(crate) fn best(scores: &[u32], template_threshold: u32) -> Option<Match> {
    scores
        .iter()
        .enumerate()
        .filter(|&(_, &score)| score >= template_threshold)
        .fold(None, |best: Option<Match>, (id, &score)| match best {
            Some(b) if b.score >= score => Some(b),
            _ => Some(Match {
                template_id: id as u32,
                score,
            }),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_range_clamps() {
        assert_eq!(LinearRange::new(0, 5, 353), LinearRange { begin: -5, end: 5 });
        assert_eq!(LinearRange::new(350, 5, 353), LinearRange { begin: 345, end: 353 });
        assert_eq!(LinearRange::new(-352, 5, 353), LinearRange { begin: -353, end: -347 });
        assert_eq!(LinearRange::new(7, 0, 353).steps(1).collect::<Vec<_>>(), vec![7]);
    }

    #[test]
    fn linear_range_beyond_bounds_is_empty() {
        assert_eq!(LinearRange::new(20, 2, 10).steps(1).count(), 0);
    }

    #[test]
    fn angular_range_wraps() {
        assert_eq!(AngularRange::new(100, 7), AngularRange { begin: 93, end: 107 });
        assert_eq!(AngularRange::new(3, 7), AngularRange { begin: 356, end: 370 });
        assert_eq!(AngularRange::new(355, 7), AngularRange { begin: 348, end: 362 });

        let ts: Vec<i64> = AngularRange::new(1, 2).steps(1).collect();
        assert_eq!(ts, vec![359, 0, 1, 2, 3]);
    }

    #[test]
    fn angular_range_full_circle() {
        let r = AngularRange::new(42, 180);
        assert_eq!(r, AngularRange { begin: 0, end: 359 });
        assert_eq!(r.steps(90).collect::<Vec<_>>(), vec![0, 90, 180, 270]);
    }

    #[test]
    fn rank_orders_and_filters() {
        let scores = [3, 0, 5, 3, 1];
        let ranked = rank(&scores, 2);
        let got: Vec<(u32, u32)> = ranked.iter().map(|m| (m.template_id, m.score)).collect();
        assert_eq!(got, vec![(2, 5), (0, 3), (3, 3)]);

        assert_eq!(rank(&scores, 1).len(), 4);
        // A zero threshold keeps zero scores too.
        let all = rank(&scores, 0);
        assert_eq!(all.len(), 5);
        assert_eq!(all[4], Match { template_id: 1, score: 0 });
        assert!(rank(&scores, 6).is_empty());
    }

    #[test]
    fn rank_truncates() {
        let scores = vec![1; MAX_MATCHES + 20];
        let ranked = rank(&scores, 1);
        assert_eq!(ranked.len(), MAX_MATCHES);
        assert_eq!(ranked[0].template_id, 0);
        assert_eq!(ranked[MAX_MATCHES - 1].template_id, MAX_MATCHES as u32 - 1);
    }

    #[test]
    fn best_prefers_lowest_id_on_tie() {
        assert_eq!(best(&[2, 4, 4], 1), Some(Match { template_id: 1, score: 4 }));
        assert_eq!(best(&[2, 4, 4], 5), None);
        assert_eq!(best(&[], 1), None);
        assert_eq!(best(&[0, 0], 1), None);
        assert_eq!(best(&[0, 0], 0), Some(Match { template_id: 0, score: 0 }));
    }
}
