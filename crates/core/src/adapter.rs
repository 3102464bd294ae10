use pulldown_cmark::{Event, html};
use std::io::{self, Write};

/// A bridge that accepts an Iterator of Markdown Events and streams
/// the resulting HTML directly to an io::Write, avoiding intermediate String allocation.
pub struct PipeAdapter<W> {
    writer: W,
}

impl<W: Write> PipeAdapter<W> {
    /// Create a new adapter wrapping an IO writer
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the event iterator, drives the HTML into the writer and hands
    /// the flushed writer back.
    pub fn drive<'a, I>(self, events: I) -> io::Result<W>
    where
        I: Iterator<Item = Event<'a>>,
    {
        let mut writer = self.writer;

        html::write_html_io(&mut writer, events)?;

        writer.flush()?;
        Ok(writer)
    }
}

/// Event streams that can be rendered straight into a writer.
pub trait MarkdownStream {
    fn stream_to_writer<W: Write>(self, writer: W) -> io::Result<W>;
}

impl<'a, I> MarkdownStream for I
where
    I: Iterator<Item = Event<'a>>,
{
    fn stream_to_writer<W: Write>(self, writer: W) -> io::Result<W> {
        PipeAdapter::new(writer).drive(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MentionEvents;
    use crate::inline::InlineDispatcher;
    use crate::mention::MentionParser;
    use pulldown_cmark::{Options, Parser};

    #[test]
    fn test_streaming_output() {
        let markdown_input = "# Hello @jack\n\n* ping @octo-cat";
        let dispatcher = InlineDispatcher::new().with_parser(MentionParser::github());
        let parser = Parser::new_ext(markdown_input, Options::empty());
        let events = MentionEvents::new(markdown_input, parser.into_offset_iter(), &dispatcher);

        let output_buffer = events
            .stream_to_writer(Vec::new())
            .expect("Failed to drive stream");
        let output_str = String::from_utf8(output_buffer).unwrap();

        assert!(output_str.contains(r#"<h1>Hello <a href="https://www.github.com/jack">@jack</a></h1>"#));
        assert!(output_str.contains(r#"<li>ping <a href="https://www.github.com/octo-cat">@octo-cat</a></li>"#));
    }

    #[test]
    fn test_writer_errors_surface() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = Parser::new("text").stream_to_writer(Broken).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
