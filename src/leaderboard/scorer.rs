use super::types::Post;

const FOLLOWER_WEIGHT: f64 = 0.001;
const RETWEET_WEIGHT: f64 = 2.0;
const CONSISTENCY_BONUS: f64 = 1.25;

/// Round to two decimals, ties away from zero (`f64::round`).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn freshness_multiplier(batch_index: usize) -> f64 {
    match batch_index {
        0 => 3.0,
        1 => 2.0,
        _ => 1.0,
    }
}

pub fn decay_factor(batch_index: usize) -> f64 {
    match batch_index {
        0 => 1.0,
        1 => 0.5,
        _ => 0.25,
    }
}

pub fn consistency_multiplier(active_last_week: bool) -> f64 {
    if active_last_week {
        CONSISTENCY_BONUS
    } else {
        1.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreBreakdown {
    impact_score: f64,
    base_score: f64,
    freshness_multiplier: f64,
    decay_factor: f64,
    consistency_multiplier: f64,
    final_score: f64,
}

impl ScoreBreakdown {
    pub fn impact_score(&self) -> f64 {
        self.impact_score
    }

    pub fn base_score(&self) -> f64 {
        self.base_score
    }

    pub fn freshness_multiplier(&self) -> f64 {
        self.freshness_multiplier
    }

    pub fn decay_factor(&self) -> f64 {
        self.decay_factor
    }

    pub fn consistency_multiplier(&self) -> f64 {
        self.consistency_multiplier
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }
}

/// Total over any post: zero engagement is floored to a base score of 1,
/// so every post contributes something.
pub fn score(post: &Post, active_last_week: bool) -> ScoreBreakdown {
    let metrics = post.metrics();
    let impact_score = post.author_follower_count() as f64 * FOLLOWER_WEIGHT
        + metrics.like_count as f64
        + metrics.retweet_count as f64 * RETWEET_WEIGHT;
    let base_score = if impact_score == 0.0 {
        1.0
    } else {
        impact_score
    };

    let freshness_multiplier = freshness_multiplier(post.batch_index());
    let decay_factor = decay_factor(post.batch_index());
    let consistency_multiplier = consistency_multiplier(active_last_week);

    ScoreBreakdown {
        impact_score,
        base_score,
        freshness_multiplier,
        decay_factor,
        consistency_multiplier,
        final_score: round2(
            base_score * freshness_multiplier * consistency_multiplier * decay_factor,
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::leaderboard::types::{AuthorProfile, Metrics, SourcePost};

    fn post(likes: u64, retweets: u64, followers: u64, batch_index: usize) -> Post {
        Post::new(
            SourcePost::new("1", "42", Metrics::new(likes, retweets, 0)),
            AuthorProfile::new("alice", followers),
            batch_index,
        )
    }

    #[test]
    fn test_positional_scores() {
        let expected = [63.0, 21.0, 5.25];
        for (index, want) in expected.into_iter().enumerate() {
            let breakdown = score(&post(10, 5, 1000, index), false);
            assert!((breakdown.impact_score() - 21.0).abs() < 1e-9);
            assert_eq!(breakdown.final_score(), want);
        }
    }

    #[test]
    fn test_zero_engagement_floor() {
        let breakdown = score(&post(0, 0, 0, 5), true);
        assert_eq!(breakdown.impact_score(), 0.0);
        assert_eq!(breakdown.base_score(), 1.0);
        assert_eq!(breakdown.consistency_multiplier(), 1.25);
        assert_eq!(breakdown.final_score(), 0.31);

        for index in 0..20 {
            assert!(score(&post(0, 0, 0, index), false).final_score() > 0.0);
        }
    }

    #[test]
    fn test_tail_positions() {
        for index in 2..50 {
            let breakdown = score(&post(index as u64 * 7, 3, 12_345, index), false);
            assert_eq!(breakdown.decay_factor(), 0.25);
            assert_eq!(breakdown.freshness_multiplier(), 1.0);
        }
    }

    #[test]
    fn test_monotonic() {
        for index in 0..4 {
            let mut last = 0.0;
            for likes in 0..200 {
                let current = score(&post(likes, 2, 500, index), false).final_score();
                assert!(current >= last);
                last = current;
            }
            let mut last = 0.0;
            for retweets in 0..200 {
                let current = score(&post(1, retweets, 500, index), true).final_score();
                assert!(current >= last);
                last = current;
            }
            // One like keeps impact above zero, away from the floor.
            let mut last = 0.0;
            for followers in (0..100_000).step_by(373) {
                let current = score(&post(1, 0, followers, index), false).final_score();
                assert!(current >= last);
                last = current;
            }
        }
    }

    #[test]
    fn test_floor_beats_small_impact() {
        let empty = score(&post(0, 0, 0, 0), false);
        let followed = score(&post(0, 0, 373, 0), false);
        assert_eq!(empty.final_score(), 3.0);
        assert!((followed.impact_score() - 0.373).abs() < 1e-9);
        assert_eq!(followed.final_score(), 1.12);
        assert!(empty.final_score() > followed.final_score());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(0.3125), 0.31);
        assert_eq!(round2(1.125), 1.13);
        assert_eq!(round2(-1.125), -1.13);
        assert_eq!(round2(5.0), 5.0);
    }
}
