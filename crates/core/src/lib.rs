//! `@handle` mentions for pulldown-cmark pipelines.
//!
//! [`MentionParser`] recognizes `@handle` at a cursor and turns it into a
//! link; [`MentionEvents`] runs it over a Markdown event stream.

use std::io::Write;

use pulldown_cmark::{OffsetIter, Options, Parser, html};

mod adapter;
mod cursor;
mod error;
mod events;
mod inline;
mod mention;
mod options;

pub use crate::adapter::{MarkdownStream, PipeAdapter};
pub use crate::cursor::{Cursor, CursorState};
pub use crate::error::{Error, Result};
pub use crate::events::MentionEvents;
pub use crate::inline::{
    Inline, InlineContainer, InlineDispatcher, InlineParser, InlineParserContext, Link,
};
pub use crate::mention::{
    DEFAULT_HANDLE_PATTERN, GITHUB_HANDLE_PATTERN, GITHUB_LINK_TEMPLATE, HANDLE_SLOT,
    MentionParser, TWITTER_HANDLE_PATTERN, TWITTER_LINK_TEMPLATE,
};
pub use crate::options::{CustomMention, MentionOptions};

/// Crate version, as reported to the bindings.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Markdown extensions enabled for every render.
pub fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options
}

/// Parses `input` and rewrites mentions through `dispatcher`.
pub fn get_event_iterator<'d, 'a>(
    input: &'a str,
    dispatcher: &'d InlineDispatcher,
) -> MentionEvents<'d, 'a, OffsetIter<'a>> {
    let events = Parser::new_ext(input, parser_options()).into_offset_iter();
    MentionEvents::new(input, events, dispatcher)
}

/// Renders Markdown into an HTML `String`, linking mentions per `options`.
pub fn render_html(input: &str, options: &MentionOptions) -> Result<String> {
    let dispatcher = options.dispatcher()?;
    let mut html_output = String::with_capacity(input.len() + input.len() / 2);
    html::push_html(&mut html_output, get_event_iterator(input, &dispatcher));
    Ok(html_output)
}

/// Streams rendered HTML into `writer` and returns it once flushed.
///
/// Configuration errors and writer failures both come back as [`Error`];
/// the latter as [`Error::Io`].
pub fn render_to_writer<W: Write>(input: &str, options: &MentionOptions, writer: W) -> Result<W> {
    let dispatcher = options.dispatcher()?;
    let writer = get_event_iterator(input, &dispatcher).stream_to_writer(writer)?;
    Ok(writer)
}
