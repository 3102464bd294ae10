//! Inline nodes, the recognizer trait and the dispatcher that drives it.

use crate::cursor::Cursor;

/// A link produced by an inline recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// Inline content emitted by [`InlineDispatcher::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Link(Link),
}

/// Output container that recognizers append their nodes to.
#[derive(Debug, Default)]
pub struct InlineContainer {
    children: Vec<Inline>,
}

impl InlineContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_child(&mut self, node: Inline) {
        match node {
            Inline::Text(text) => self.push_text(&text),
            other => self.children.push(other),
        }
    }

    /// Appends literal text, merging it into a trailing text node.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Inline::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(Inline::Text(text.to_owned()));
        }
    }

    pub fn children(&self) -> &[Inline] {
        &self.children
    }

    pub fn into_children(self) -> Vec<Inline> {
        self.children
    }
}

/// What a recognizer sees while parsing: the cursor and the output container.
pub struct InlineParserContext<'a, 'c> {
    cursor: Cursor<'a>,
    container: &'c mut InlineContainer,
}

impl<'a, 'c> InlineParserContext<'a, 'c> {
    pub fn new(cursor: Cursor<'a>, container: &'c mut InlineContainer) -> Self {
        Self { cursor, container }
    }

    pub fn cursor(&self) -> &Cursor<'a> {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor<'a> {
        &mut self.cursor
    }

    pub fn container(&mut self) -> &mut InlineContainer {
        self.container
    }

    /// Returns the cursor, e.g. to read where a successful parse stopped.
    pub fn into_cursor(self) -> Cursor<'a> {
        self.cursor
    }
}

/// An inline recognizer the dispatcher invokes at its trigger characters.
///
/// `parse` is called with the cursor on one of [`InlineParser::characters`].
/// It returns `true` after consuming input and appending output, or `false`
/// with the cursor exactly where it started.
pub trait InlineParser: Send + Sync {
    fn name(&self) -> &str;

    fn characters(&self) -> &[char];

    fn parse(&self, ctx: &mut InlineParserContext<'_, '_>) -> bool;
}

/// Runs registered [`InlineParser`]s over runs of inline text.
#[derive(Default)]
pub struct InlineDispatcher {
    parsers: Vec<Box<dyn InlineParser>>,
    triggers: Vec<char>,
}

impl InlineDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parser(mut self, parser: impl InlineParser + 'static) -> Self {
        self.push(Box::new(parser));
        self
    }

    pub fn push(&mut self, parser: Box<dyn InlineParser>) {
        self.triggers.extend_from_slice(parser.characters());
        self.triggers.sort_unstable();
        self.triggers.dedup();
        self.parsers.push(parser);
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Every trigger character of every registered parser, sorted and deduplicated.
    pub fn triggers(&self) -> &[char] {
        &self.triggers
    }

    /// Splits `text` into literal text and recognized nodes.
    ///
    /// `lead` is the character logically preceding `text`, or `None` when the
    /// run starts a block.
    pub fn scan(&self, text: &str, lead: Option<char>) -> Vec<Inline> {
        self.scan_with_escapes(text, lead, &[])
    }

    /// Like [`InlineDispatcher::scan`], but trigger characters at the byte
    /// offsets in `escaped` (sorted) are kept as literal text without
    /// invoking any parser.
    pub fn scan_with_escapes(
        &self,
        text: &str,
        lead: Option<char>,
        escaped: &[usize],
    ) -> Vec<Inline> {
        if !text.contains(self.triggers.as_slice()) {
            return if text.is_empty() {
                Vec::new()
            } else {
                vec![Inline::Text(text.to_owned())]
            };
        }

        let mut container = InlineContainer::new();
        let mut cursor = Cursor::with_lead(text, lead);

        while let Some(ch) = cursor.current() {
            let start = cursor.position();
            if self.triggers.contains(&ch) && escaped.binary_search(&start).is_err() {
                let (matched, resumed) = self.dispatch(ch, cursor.clone(), &mut container);
                if matched {
                    cursor = resumed;
                    continue;
                }
            }

            cursor.advance();
            container.push_text(&text[start..cursor.position()]);
        }

        container.into_children()
    }

    fn dispatch<'a>(
        &self,
        ch: char,
        cursor: Cursor<'a>,
        container: &mut InlineContainer,
    ) -> (bool, Cursor<'a>) {
        let mut ctx = InlineParserContext::new(cursor, container);
        for parser in self.parsers.iter().filter(|p| p.characters().contains(&ch)) {
            if parser.parse(&mut ctx) {
                log::trace!(
                    "{} matched at offset {}",
                    parser.name(),
                    ctx.cursor().position()
                );
                return (true, ctx.into_cursor());
            }
        }
        (false, ctx.into_cursor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Turns `#word` into a link to `/tags/word`.
    struct HashTag;

    impl InlineParser for HashTag {
        fn name(&self) -> &str {
            "hashtag"
        }

        fn characters(&self) -> &[char] {
            &['#']
        }

        fn parse(&self, ctx: &mut InlineParserContext<'_, '_>) -> bool {
            let cursor = ctx.cursor_mut();
            let state = cursor.save_state();
            cursor.advance();
            let rest = cursor.remainder();
            let len = rest
                .find(|c: char| !c.is_ascii_alphanumeric())
                .unwrap_or(rest.len());
            if len == 0 {
                cursor.restore_state(state);
                return false;
            }
            let tag = &rest[..len];
            for _ in 0..len {
                cursor.advance();
            }
            ctx.container().append_child(Inline::Link(Link {
                url: format!("/tags/{tag}"),
                text: format!("#{tag}"),
            }));
            true
        }
    }

    fn text(s: &str) -> Inline {
        Inline::Text(s.to_owned())
    }

    #[test]
    fn container_merges_adjacent_text() {
        let mut container = InlineContainer::new();
        container.push_text("a");
        container.append_child(text("b"));
        container.push_text("");
        container.append_child(Inline::Link(Link {
            url: "u".into(),
            text: "t".into(),
        }));
        container.push_text("c");

        assert_eq!(container.children().len(), 3);
        assert_eq!(container.children()[0], text("ab"));
    }

    #[test]
    fn scan_without_parsers_returns_text() {
        let dispatcher = InlineDispatcher::new();
        assert!(dispatcher.is_empty());
        assert_eq!(dispatcher.scan("plain #text", None), vec![text("plain #text")]);
        assert!(dispatcher.scan("", None).is_empty());
    }

    #[test]
    fn scan_invokes_parser_at_trigger() {
        let dispatcher = InlineDispatcher::new().with_parser(HashTag);
        let out = dispatcher.scan("see #rust, # and #", None);

        assert_eq!(
            out,
            vec![
                text("see "),
                Inline::Link(Link {
                    url: "/tags/rust".into(),
                    text: "#rust".into(),
                }),
                text(", # and #"),
            ]
        );
    }

    #[test]
    fn triggers_are_deduplicated() {
        let dispatcher = InlineDispatcher::new().with_parser(HashTag).with_parser(HashTag);
        assert_eq!(dispatcher.triggers(), &['#']);
    }

    #[test]
    fn escaped_triggers_stay_literal() {
        let dispatcher = InlineDispatcher::new().with_parser(HashTag);
        let out = dispatcher.scan_with_escapes("#one #two", None, &[0]);

        assert_eq!(
            out,
            vec![
                text("#one "),
                Inline::Link(Link {
                    url: "/tags/two".into(),
                    text: "#two".into(),
                }),
            ]
        );
    }
}
