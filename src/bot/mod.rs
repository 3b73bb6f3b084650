mod functions;
mod publisher;

use std::sync::LazyLock;

use teloxide::{Bot, adaptors::DefaultParseMode};

pub type BotType = DefaultParseMode<Bot>;

static TELEGRAM_ESCAPE_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"([_*\[\]\(\)~>#\+\-=|\{}\.!`\\])").unwrap());

pub use functions::{bot, replace_all, send_text};
pub use publisher::{PublishTarget, Publisher};
