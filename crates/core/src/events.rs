//! Rewrites mention text inside a `pulldown_cmark` event stream.

use std::collections::VecDeque;
use std::iter::Peekable;
use std::ops::Range;

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};

use crate::inline::{Inline, InlineDispatcher, Link};

/// Lead reported after inline markup such as `*`, `` ` `` or inline HTML.
/// Anything other than a space keeps a directly following `@` literal.
const INLINE_BOUNDARY: char = '\u{fffc}';

/// Iterator adapter that runs an [`InlineDispatcher`] over every text event.
///
/// Takes `(Event, Range)` pairs as produced by
/// [`pulldown_cmark::Parser::into_offset_iter`] together with the source they
/// index. Adjacent text events are merged so a handle is never split across
/// events. A trigger character only reaches the dispatcher when it is written
/// literally in the source: `\@jack` and `&#64;jack` stay text. Text inside
/// code blocks, links, images and metadata blocks passes through untouched.
pub struct MentionEvents<'d, 'a, I>
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    source: &'a str,
    inner: Peekable<I>,
    dispatcher: &'d InlineDispatcher,
    pending: VecDeque<Event<'a>>,
    opaque_depth: usize,
    lead: Option<char>,
}

impl<'d, 'a, I> MentionEvents<'d, 'a, I>
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    pub fn new(source: &'a str, events: I, dispatcher: &'d InlineDispatcher) -> Self {
        Self {
            source,
            inner: events.peekable(),
            dispatcher,
            pending: VecDeque::new(),
            opaque_depth: 0,
            lead: None,
        }
    }

    fn rewrite_text(&mut self, first: CowStr<'a>, range: Range<usize>) -> Event<'a> {
        let dispatcher = self.dispatcher;
        let triggers = dispatcher.triggers();
        let mut escaped = Vec::new();
        escaped_triggers(self.source, &first, range, 0, triggers, &mut escaped);

        let mut merged: Option<String> = None;
        while let Some((Event::Text(_), _)) = self.inner.peek() {
            let Some((Event::Text(next), range)) = self.inner.next() else {
                break;
            };
            let merged = merged.get_or_insert_with(|| first.to_string());
            escaped_triggers(self.source, &next, range, merged.len(), triggers, &mut escaped);
            merged.push_str(&next);
        }
        let text = merged.map_or(first, CowStr::from);

        let nodes = dispatcher.scan_with_escapes(&text, self.lead, &escaped);
        self.lead = text.chars().last().or(self.lead);

        if nodes.iter().all(|node| matches!(node, Inline::Text(_))) {
            return Event::Text(text);
        }

        for node in nodes {
            match node {
                Inline::Text(text) => self.pending.push_back(Event::Text(text.into())),
                Inline::Link(link) => self.push_link(link),
            }
        }

        self.pending
            .pop_front()
            .unwrap_or_else(|| Event::Text(CowStr::Borrowed("")))
    }

    fn push_link(&mut self, link: Link) {
        self.pending.push_back(Event::Start(Tag::Link {
            link_type: LinkType::Inline,
            dest_url: link.url.into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        self.pending.push_back(Event::Text(link.text.into()));
        self.pending.push_back(Event::End(TagEnd::Link));
    }

    fn track(&mut self, event: &Event<'a>) {
        match event {
            Event::Start(tag) => {
                if is_opaque(tag) {
                    self.opaque_depth += 1;
                }
                self.lead = is_inline(tag).then_some(INLINE_BOUNDARY);
            }
            Event::End(end) => {
                if is_opaque_end(end) {
                    self.opaque_depth = self.opaque_depth.saturating_sub(1);
                }
                self.lead = is_inline_end(end).then_some(INLINE_BOUNDARY);
            }
            Event::Text(text) => self.lead = text.chars().last().or(self.lead),
            Event::SoftBreak | Event::HardBreak => self.lead = Some('\n'),
            Event::TaskListMarker(_) => self.lead = Some(' '),
            Event::Code(_)
            | Event::InlineHtml(_)
            | Event::InlineMath(_)
            | Event::FootnoteReference(_) => self.lead = Some(INLINE_BOUNDARY),
            _ => self.lead = None,
        }
    }
}

impl<'a, I> Iterator for MentionEvents<'_, 'a, I>
where
    I: Iterator<Item = (Event<'a>, Range<usize>)>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        match self.inner.next()? {
            (Event::Text(text), range) if self.opaque_depth == 0 && !self.dispatcher.is_empty() => {
                Some(self.rewrite_text(text, range))
            }
            (event, _) => {
                self.track(&event);
                Some(event)
            }
        }
    }
}

/// Records the offsets (relative to `base`) of trigger characters in `text`
/// that are not written literally in `source[range]`: decoded entities and
/// backslash escapes.
fn escaped_triggers(
    source: &str,
    text: &str,
    range: Range<usize>,
    base: usize,
    triggers: &[char],
    escaped: &mut Vec<usize>,
) {
    if !text.contains(triggers) {
        return;
    }

    let verbatim = source.get(range.clone()) == Some(text);
    let after_backslash = source.get(..range.start).is_some_and(|before| {
        before.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
    });

    for (offset, _) in text.match_indices(triggers) {
        if !verbatim || (offset == 0 && after_backslash) {
            escaped.push(base + offset);
        }
    }
}

fn is_opaque(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::CodeBlock(_) | Tag::Link { .. } | Tag::Image { .. } | Tag::MetadataBlock(_)
    )
}

fn is_opaque_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::CodeBlock | TagEnd::Link | TagEnd::Image | TagEnd::MetadataBlock(_)
    )
}

fn is_inline(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis
            | Tag::Strong
            | Tag::Strikethrough
            | Tag::Superscript
            | Tag::Subscript
            | Tag::Link { .. }
            | Tag::Image { .. }
    )
}

fn is_inline_end(end: &TagEnd) -> bool {
    matches!(
        end,
        TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link
            | TagEnd::Image
    )
}
