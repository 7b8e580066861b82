//! Word counting for notes
//!
//! Body text goes through pulldown-cmark so that markup, link destinations and
//! raw HTML do not count as words. Frontmatter YAML is counted as plain text
//! when the include flag is set.

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, TagEnd};
use regex::Regex;

use crate::frontmatter::Frontmatter;
use crate::settings::Settings;

/// One word per CJK ideograph/kana, otherwise runs of letters, digits and marks
/// optionally joined by internal apostrophes or hyphens.
static WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"[\p{Han}\p{Hiragana}\p{Katakana}]|[[\p{L}\p{N}\p{M}]--[\p{Han}\p{Hiragana}\p{Katakana}]]+(?:['’\-][[\p{L}\p{N}\p{M}]--[\p{Han}\p{Hiragana}\p{Katakana}]]+)*",
    )
    .expect("word pattern is valid")
});

/// Counts words in note content according to the counting settings
#[derive(Debug, Clone)]
pub struct WordCounter {
    include_frontmatter: bool,
    opt_out_key: String,
}

impl WordCounter {
    /// Create a counter
    pub fn new(include_frontmatter: bool, opt_out_key: impl Into<String>) -> Self {
        Self {
            include_frontmatter,
            opt_out_key: opt_out_key.into(),
        }
    }

    /// Create a counter from persisted settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.include_frontmatter_in_count,
            settings.keys().word_count.clone(),
        )
    }

    /// Count the words of `text`, whose frontmatter (if any) is `frontmatter`
    pub fn count(&self, text: &str, frontmatter: Option<&Frontmatter>) -> u64 {
        let Some(fm) = frontmatter else {
            return count_markdown(text);
        };

        if fm.is_disabled(&self.opt_out_key) {
            return 0;
        }

        let body = text.get(fm.body_start..).unwrap_or("");
        let mut total = count_markdown(body);
        if self.include_frontmatter {
            total += count_words(&fm.raw);
        }
        total
    }
}

/// Count word tokens in plain text
pub fn count_words(text: &str) -> u64 {
    WORD_RE.find_iter(text).count() as u64
}

/// Count words in the rendered text of a markdown document
pub fn count_markdown(markdown: &str) -> u64 {
    if markdown.trim().is_empty() {
        return 0;
    }
    count_words(&plain_text(markdown))
}

/// Flatten markdown to the text a reader sees
fn plain_text(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut text = String::with_capacity(markdown.len());
    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push('\n'),
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {}
            Event::End(_) => text.push('\n'),
            _ => {}
        }
    }
    text
}
