//! `@handle` mentions rewritten into profile links.

use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::error::{Error, Result};
use crate::inline::{Inline, InlineParser, InlineParserContext, Link};

/// Placeholder in link templates that receives the handle.
pub const HANDLE_SLOT: &str = "%s";

/// Handle pattern used when none is supplied: a run of ASCII word characters.
pub const DEFAULT_HANDLE_PATTERN: &str = r"[A-Za-z0-9_]+(?![A-Za-z0-9_])";

/// Twitter handles: 1 to 15 word characters.
pub const TWITTER_HANDLE_PATTERN: &str = r"[A-Za-z0-9_]{1,15}(?![A-Za-z0-9_])";

/// GitHub usernames: alphanumeric segments joined by single hyphens, up to 39 characters.
pub const GITHUB_HANDLE_PATTERN: &str =
    r"(?i)[a-z0-9](?:[a-z0-9]|-(?=[a-z0-9])){0,38}(?![A-Za-z0-9_])";

pub const TWITTER_LINK_TEMPLATE: &str = "https://twitter.com/%s";
pub const GITHUB_LINK_TEMPLATE: &str = "https://www.github.com/%s";

static TWITTER_HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    anchored(TWITTER_HANDLE_PATTERN).expect("TWITTER_HANDLE_PATTERN: hardcoded regex is valid")
});

static GITHUB_HANDLE: LazyLock<Regex> = LazyLock::new(|| {
    anchored(GITHUB_HANDLE_PATTERN).expect("GITHUB_HANDLE_PATTERN: hardcoded regex is valid")
});

/// Recognizes `@handle` and replaces it with a link built from a template.
///
/// The `@` must start the text run or follow a space, so `me@example.com`
/// is left alone. The handle pattern is matched right after the `@`; when it
/// does not match, the `@` stays literal text.
#[derive(Debug, Clone)]
pub struct MentionParser {
    link_template: String,
    handle_regex: Regex,
}

impl MentionParser {
    /// Builds a parser from a link template with a single `%s` slot and a
    /// handle pattern. The pattern is anchored at the character after `@`.
    pub fn new(link_template: impl Into<String>, handle_pattern: &str) -> Result<Self> {
        let link_template = validate_template(link_template.into())?;
        let handle_regex = anchored(handle_pattern).map_err(|source| Error::InvalidHandlePattern {
            pattern: handle_pattern.to_owned(),
            source: Box::new(source),
        })?;

        Ok(Self {
            link_template,
            handle_regex,
        })
    }

    /// Like [`MentionParser::new`] with [`DEFAULT_HANDLE_PATTERN`].
    pub fn with_default_pattern(link_template: impl Into<String>) -> Result<Self> {
        Self::new(link_template, DEFAULT_HANDLE_PATTERN)
    }

    /// Links `@handle` to `https://twitter.com/handle`.
    pub fn twitter() -> Self {
        Self {
            link_template: TWITTER_LINK_TEMPLATE.to_owned(),
            handle_regex: TWITTER_HANDLE.clone(),
        }
    }

    /// Links `@handle` to `https://www.github.com/handle`.
    pub fn github() -> Self {
        Self {
            link_template: GITHUB_LINK_TEMPLATE.to_owned(),
            handle_regex: GITHUB_HANDLE.clone(),
        }
    }

    pub fn link_template(&self) -> &str {
        &self.link_template
    }

    pub fn link_for(&self, handle: &str) -> String {
        self.link_template.replacen(HANDLE_SLOT, handle, 1)
    }
}

impl InlineParser for MentionParser {
    fn name(&self) -> &str {
        "mention"
    }

    fn characters(&self) -> &[char] {
        &['@']
    }

    fn parse(&self, ctx: &mut InlineParserContext<'_, '_>) -> bool {
        let cursor = ctx.cursor_mut();

        // peek() leaves the cursor alone, nothing to restore here
        if let Some(previous) = cursor.peek(-1) {
            if previous != ' ' {
                log::trace!("`@` at offset {} follows {previous:?}", cursor.position());
                return false;
            }
        }

        let state = cursor.save_state();
        cursor.advance();

        let Some(handle) = cursor.match_pattern(&self.handle_regex) else {
            cursor.restore_state(state);
            return false;
        };

        let url = self.link_for(handle);
        log::debug!("mention @{handle} -> {url}");
        ctx.container().append_child(Inline::Link(Link {
            url,
            text: format!("@{handle}"),
        }));

        true
    }
}

fn anchored(pattern: &str) -> std::result::Result<Regex, fancy_regex::Error> {
    Regex::new(&format!("^(?:{pattern})"))
}

fn validate_template(template: String) -> Result<String> {
    if template.matches(HANDLE_SLOT).count() == 1 {
        Ok(template)
    } else {
        Err(Error::InvalidLinkTemplate(template))
    }
}
