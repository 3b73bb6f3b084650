use std::{borrow::Cow, fmt::Display};

use itertools::Itertools as _;

use super::{aggregator::Aggregates, types::AuthorAggregate};

pub const LEADERBOARD_SIZE: usize = 10;

pub type Escape = fn(&str) -> Cow<'_, str>;

pub fn rank_glyph(rank: usize) -> Cow<'static, str> {
    match rank {
        1 => "🥇".into(),
        2 => "🥈".into(),
        3 => "🥉".into(),
        10 => "🔟".into(),
        n => format!("{n}\u{fe0f}\u{20e3}").into(),
    }
}

/// Two decimals, padded so totals under 100 line up in monospace.
pub fn format_score(score: f64) -> String {
    format!("{score:>6.2}")
}

#[derive(Clone, Debug)]
pub struct RankedEntry {
    rank: usize,
    aggregate: AuthorAggregate,
}

impl RankedEntry {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn aggregate(&self) -> &AuthorAggregate {
        &self.aggregate
    }

    /// Telegram MarkdownV2 line; `escape` is applied to user supplied text.
    pub fn markdown_line(&self, escape: Escape) -> String {
        format!(
            "{glyph} `{score}` [@{username}]({link})",
            glyph = rank_glyph(self.rank),
            score = format_score(self.aggregate.total_score()),
            username = escape(self.aggregate.username()),
            link = self.aggregate.profile_link(),
        )
    }
}

impl Display for RankedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} @{} ({})",
            rank_glyph(self.rank),
            format_score(self.aggregate.total_score()),
            self.aggregate.username(),
            self.aggregate.profile_link()
        )
    }
}

/// Drop the excluded account, sort descending by total (stable, so ties keep
/// first-seen order) and keep the top entries.
pub fn rank(aggregates: Aggregates, exclude_username: &str) -> Vec<RankedEntry> {
    aggregates
        .into_entries()
        .into_iter()
        .filter(|aggregate| aggregate.username() != exclude_username)
        .sorted_by(|a, b| b.total_score().total_cmp(&a.total_score()))
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(index, aggregate)| RankedEntry {
            rank: index + 1,
            aggregate,
        })
        .collect()
}

/// Result of one leaderboard request.
#[derive(Clone, Debug, Default)]
pub struct Standing {
    entries: Vec<RankedEntry>,
    scored: usize,
    skipped: usize,
}

impl Standing {
    pub fn new(entries: Vec<RankedEntry>, scored: usize, skipped: usize) -> Self {
        Self {
            entries,
            scored,
            skipped,
        }
    }

    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn scored(&self) -> usize {
        self.scored
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn markdown(&self, escape: Escape, updated_at: &str) -> String {
        let body = if self.entries.is_empty() {
            "_No eligible posts found_".to_string()
        } else {
            self.entries
                .iter()
                .map(|entry| entry.markdown_line(escape))
                .join("\n")
        };
        format!(
            "🏆 *Leaderboard*\n\n{body}\n\n{footer}",
            footer = escape(&format!(
                "{} posts scored, last update: {updated_at}",
                self.scored
            )),
        )
    }
}

impl Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "🏆 Leaderboard")?;
        if self.entries.is_empty() {
            writeln!(f, "No eligible posts found")?;
        }
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        write!(f, "{} scored, {} skipped", self.scored, self.skipped)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::leaderboard::{
        aggregator::aggregate,
        source::AssumeActive,
        types::{AuthorProfile, Metrics, Post, SourcePost},
    };

    fn post(author: &str, username: &str, likes: u64, batch_index: usize) -> Post {
        Post::new(
            SourcePost::new(batch_index.to_string(), author, Metrics::new(likes, 0, 0)),
            AuthorProfile::new(username, 0),
            batch_index,
        )
    }

    fn identity(s: &str) -> Cow<'_, str> {
        Cow::Borrowed(s)
    }

    #[test]
    fn test_three_authors() {
        let posts = (0..3)
            .map(|index| {
                Post::new(
                    SourcePost::new(index.to_string(), format!("{index}"), Metrics::new(10, 5, 0)),
                    AuthorProfile::new(format!("author{index}"), 1000),
                    index,
                )
            })
            .collect::<Vec<_>>();
        let entries = rank(aggregate(posts.clone(), &AssumeActive(false)).1, "openservai");

        let totals = entries
            .iter()
            .map(|e| (e.aggregate().username().to_string(), e.aggregate().total_score()))
            .collect::<Vec<_>>();
        assert_eq!(
            totals,
            vec![
                ("author0".to_string(), 63.0),
                ("author1".to_string(), 21.0),
                ("author2".to_string(), 5.25)
            ]
        );
    }

    #[test]
    fn test_exclusion_and_limit() {
        let mut posts = vec![post("sys", "openservai", 10_000, 0)];
        for i in 1..=14 {
            posts.push(post(&format!("u{i}"), &format!("user{i}"), 100 - i as u64, i));
        }
        let entries = rank(aggregate(posts.clone(), &AssumeActive(false)).1, "openservai");

        assert_eq!(entries.len(), LEADERBOARD_SIZE);
        assert!(entries.iter().all(|e| e.aggregate().username() != "openservai"));
        assert!(
            entries
                .windows(2)
                .all(|w| w[0].aggregate().total_score() >= w[1].aggregate().total_score())
        );
        assert_eq!(entries.iter().map(RankedEntry::rank).collect::<Vec<_>>(), (1..=10).collect::<Vec<_>>());
        assert_eq!(entries[9].aggregate().username(), "user10");

        let rendered = Standing::new(entries, posts.len(), 0).markdown(identity, "now");
        assert!(!rendered.contains("openservai"));
    }

    #[test]
    fn test_exclusion_case_sensitive() {
        let posts = vec![post("a", "OpenServAI", 1, 2), post("b", "openservai", 1, 3)];
        let entries = rank(aggregate(posts.clone(), &AssumeActive(false)).1, "openservai");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].aggregate().username(), "OpenServAI");
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let posts = vec![
            post("c", "carol", 4, 5),
            post("a", "alice", 4, 6),
            post("b", "bob", 4, 7),
        ];
        let entries = rank(aggregate(posts.clone(), &AssumeActive(false)).1, "openservai");
        let names = entries
            .iter()
            .map(|e| e.aggregate().username())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn test_deterministic() {
        let posts = (0..40)
            .map(|i| post(&format!("{}", i % 7), &format!("n{}", i % 7), (i * 13 % 17) as u64, i))
            .collect::<Vec<_>>();
        let first = Standing::new(rank(aggregate(posts.clone(), &AssumeActive(true)).1, "n3"), 40, 0);
        let second = Standing::new(rank(aggregate(posts.clone(), &AssumeActive(true)).1, "n3"), 40, 0);
        assert_eq!(first.to_string(), second.to_string());
        assert_eq!(
            first.markdown(identity, "t"),
            second.markdown(identity, "t")
        );
    }

    #[test]
    fn test_render() {
        assert_eq!(rank_glyph(1), "🥇");
        assert_eq!(rank_glyph(3), "🥉");
        assert_eq!(rank_glyph(4), "4\u{fe0f}\u{20e3}");
        assert_eq!(rank_glyph(10), "🔟");
        assert_eq!(format_score(5.25), "  5.25");
        assert_eq!(format_score(63.0), " 63.00");
        assert_eq!(format_score(123.456), "123.46");

        let posts = vec![post("a", "alice", 20, 0)];
        let entries = rank(aggregate(posts.clone(), &AssumeActive(false)).1, "openservai");
        assert_eq!(
            entries[0].markdown_line(identity),
            "🥇 ` 60.00` [@alice](https://x.com/alice)"
        );
        assert_eq!(
            entries[0].to_string(),
            "🥇  60.00 @alice (https://x.com/alice)"
        );
    }
}
