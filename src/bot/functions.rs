use std::mem::take;

use teloxide::{
    Bot,
    payloads::SendMessageSetters as _,
    prelude::{Requester as _, RequesterExt as _},
    types::{ChatId, LinkPreviewOptions, ParseMode},
};

use super::{BotType, TELEGRAM_ESCAPE_RE};
use crate::config::Config;

pub const MESSAGE_LIMIT: usize = 4096;

pub fn replace_all(s: &str) -> std::borrow::Cow<'_, str> {
    TELEGRAM_ESCAPE_RE.replace_all(s, "\\$1")
}

pub(super) fn link_preview_options(enable: bool) -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: !enable,
        prefer_large_media: false,
        prefer_small_media: false,
        url: None,
        show_above_text: false,
    }
}

pub fn bot(config: &Config) -> anyhow::Result<BotType> {
    let bot = Bot::new(config.telegram().api_key());
    Ok(match config.telegram().api_server() {
        Some(url) => bot.set_api_url(url.parse()?),
        None => bot,
    }
    .parse_mode(ParseMode::MarkdownV2))
}

/// Cut on character boundaries. A piece never ends on a backslash that
/// escapes the next character; the pair moves to the next piece together.
fn split_long_line(line: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut count = 0;
    let mut escaping = false;

    for c in line.chars() {
        if count == limit {
            if escaping && limit > 1 {
                piece.pop();
                pieces.push(take(&mut piece));
                piece.push('\\');
                count = 1;
            } else {
                pieces.push(take(&mut piece));
                count = 0;
            }
        }
        piece.push(c);
        count += 1;
        escaping = c == '\\' && !escaping;
    }

    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Split on line boundaries so every chunk fits in `limit` characters.
/// A single line longer than `limit` is cut on character boundaries.
pub(super) fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        if line_len > limit {
            if !current.is_empty() {
                chunks.push(take(&mut current));
                current_len = 0;
            }
            chunks.extend(split_long_line(line, limit));
            continue;
        }

        let extra = if current.is_empty() {
            line_len
        } else {
            line_len + 1
        };
        if current_len + extra > limit {
            chunks.push(take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub async fn send_text(bot: &BotType, chat: ChatId, text: &str) -> anyhow::Result<()> {
    for chunk in split_message(text, MESSAGE_LIMIT) {
        bot.send_message(chat, chunk)
            .link_preview_options(link_preview_options(false))
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use itertools::Itertools as _;

    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(replace_all("user_name"), "user\\_name");
        assert_eq!(replace_all("2025-01-01 10:00:00"), "2025\\-01\\-01 10:00:00");
        assert_eq!(replace_all("1.5!"), "1\\.5\\!");
    }

    #[test]
    fn test_short_message() {
        assert_eq!(split_message("a\nb", MESSAGE_LIMIT), vec!["a\nb"]);
        assert!(split_message("", MESSAGE_LIMIT).is_empty());
    }

    #[test]
    fn test_split_on_lines() {
        let text = (0..50).map(|i| format!("line {i:02}")).join("\n");
        let chunks = split_message(&text, 40);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 40));
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_split_long_line() {
        let text = "🥇".repeat(10);
        let chunks = split_message(&text, 4);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], "🥇".repeat(4));
        assert_eq!(chunks[2], "🥇".repeat(2));
    }

    #[test]
    fn test_split_keeps_escape_pairs() {
        assert_eq!(split_message("ab\\.cd", 3), vec!["ab", "\\.c", "d"]);
        assert_eq!(split_message("a\\\\b", 3), vec!["a\\\\", "b"]);

        let escaped = replace_all(&"a.b_c".repeat(500)).into_owned();
        let chunks = split_message(&escaped, 64);
        assert_eq!(chunks.concat(), escaped);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 64);
            let trailing = chunk.chars().rev().take_while(|c| *c == '\\').count();
            assert_eq!(trailing % 2, 0, "{chunk:?}");
        }
    }
}
