use crate::error::Result;
use crate::inline::InlineDispatcher;
use crate::mention::MentionParser;

/// A caller-defined mention style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMention {
    /// URL with a single `%s` slot for the handle.
    pub link_template: String,
    /// Handle pattern; `None` falls back to [`crate::DEFAULT_HANDLE_PATTERN`].
    pub handle_pattern: Option<String>,
}

/// Configuration flags that control which mention styles are recognized.
///
/// Parsers are tried in order: custom entries first, then GitHub, then
/// Twitter. The first one that accepts an `@` wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionOptions {
    /// Link `@handle` to Twitter profiles.
    pub twitter: bool,
    /// Link `@handle` to GitHub profiles.
    pub github: bool,
    pub custom: Vec<CustomMention>,
}

impl Default for MentionOptions {
    fn default() -> Self {
        MentionOptions {
            twitter: true,
            github: false,
            custom: Vec::new(),
        }
    }
}

impl MentionOptions {
    /// Options with every mention style turned off.
    pub fn none() -> Self {
        MentionOptions {
            twitter: false,
            github: false,
            custom: Vec::new(),
        }
    }

    pub fn with_custom(
        mut self,
        link_template: impl Into<String>,
        handle_pattern: Option<&str>,
    ) -> Self {
        self.custom.push(CustomMention {
            link_template: link_template.into(),
            handle_pattern: handle_pattern.map(str::to_owned),
        });
        self
    }

    /// Builds the dispatcher these options describe.
    pub fn dispatcher(&self) -> Result<InlineDispatcher> {
        let mut dispatcher = InlineDispatcher::new();

        for custom in &self.custom {
            let parser = match &custom.handle_pattern {
                Some(pattern) => MentionParser::new(custom.link_template.as_str(), pattern)?,
                None => MentionParser::with_default_pattern(custom.link_template.as_str())?,
            };
            dispatcher.push(Box::new(parser));
        }

        if self.github {
            dispatcher.push(Box::new(MentionParser::github()));
        }

        if self.twitter {
            dispatcher.push(Box::new(MentionParser::twitter()));
        }

        Ok(dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::inline::{Inline, Link};

    fn first_link(dispatcher: &InlineDispatcher, text: &str) -> Option<Link> {
        dispatcher.scan(text, None).into_iter().find_map(|node| match node {
            Inline::Link(link) => Some(link),
            Inline::Text(_) => None,
        })
    }

    #[test]
    fn defaults_to_twitter_only() {
        let dispatcher = MentionOptions::default().dispatcher().unwrap();
        let link = first_link(&dispatcher, "hi @octo-cat").unwrap();
        assert_eq!(link.url, "https://twitter.com/octo");
        assert_eq!(link.text, "@octo");
    }

    #[test]
    fn github_is_tried_before_twitter() {
        let options = MentionOptions {
            github: true,
            ..MentionOptions::default()
        };
        let dispatcher = options.dispatcher().unwrap();

        let link = first_link(&dispatcher, "@octo-cat").unwrap();
        assert_eq!(link.url, "https://www.github.com/octo-cat");

        // Underscores are not valid on GitHub, so Twitter picks it up.
        let link = first_link(&dispatcher, "@jack_b").unwrap();
        assert_eq!(link.url, "https://twitter.com/jack_b");
    }

    #[test]
    fn custom_entries_come_first() {
        let dispatcher = MentionOptions::default()
            .with_custom("https://example.social/@%s", None)
            .dispatcher()
            .unwrap();
        let link = first_link(&dispatcher, "@jack").unwrap();
        assert_eq!(link.url, "https://example.social/@jack");
    }

    #[test]
    fn none_disables_everything() {
        let dispatcher = MentionOptions::none().dispatcher().unwrap();
        assert!(dispatcher.is_empty());
        assert!(first_link(&dispatcher, "@jack").is_none());
    }

    #[test]
    fn invalid_custom_entry_is_an_error() {
        let result = MentionOptions::none()
            .with_custom("https://example.com/", None)
            .dispatcher();
        assert!(matches!(result, Err(Error::InvalidLinkTemplate(_))));
    }
}
