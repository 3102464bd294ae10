use atlink_core::{MarkdownStream, MentionOptions, get_event_iterator};
use js_sys::Function;
use std::io::{self, Write};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

/// Renders markdown into an HTML `String`, linking `@handle` mentions.
///
/// Twitter mentions are on unless `twitter` is `false`; GitHub mentions are
/// off unless `github` is `true`.
#[wasm_bindgen(js_name = render_html)]
pub fn render_html(
    input: &str,
    twitter: Option<bool>,
    github: Option<bool>,
) -> Result<String, JsError> {
    atlink_core::render_html(input, &mention_options(twitter, github)).map_err(to_js_error)
}

/// Streams rendered HTML chunks into the provided JavaScript callback.
///
/// The callback is invoked with each UTF-8 chunk produced by the streaming
/// renderer, so callers can forward output to a `WritableStream`, append to the
/// DOM incrementally, or buffer it manually.
#[wasm_bindgen(js_name = stream_html)]
pub fn stream_html(
    input: &str,
    chunk_callback: &Function,
    twitter: Option<bool>,
    github: Option<bool>,
) -> Result<(), JsError> {
    let dispatcher = mention_options(twitter, github)
        .dispatcher()
        .map_err(to_js_error)?;
    let writer = JsChunkWriter::new(chunk_callback.clone());

    get_event_iterator(input, &dispatcher)
        .stream_to_writer(writer)
        .map_err(to_js_error)?;
    Ok(())
}

/// Version of the core crate.
#[wasm_bindgen]
pub fn version() -> String {
    atlink_core::version().to_string()
}

fn mention_options(twitter: Option<bool>, github: Option<bool>) -> MentionOptions {
    let defaults = MentionOptions::default();
    MentionOptions {
        twitter: twitter.unwrap_or(defaults.twitter),
        github: github.unwrap_or(defaults.github),
        ..defaults
    }
}

fn to_js_error<E: ToString>(err: E) -> JsError {
    JsError::new(&err.to_string())
}

struct JsChunkWriter {
    callback: Function,
}

impl JsChunkWriter {
    fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl Write for JsChunkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let chunk = std::str::from_utf8(buf)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        self.callback
            .call1(&JsValue::UNDEFINED, &JsValue::from_str(chunk))
            .map_err(js_callback_error)?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn js_callback_error(err: JsValue) -> io::Error {
    let message = err
        .as_string()
        .or_else(|| {
            js_sys::JSON::stringify(&err)
                .ok()
                .and_then(|s| s.as_string())
        })
        .unwrap_or_else(|| "callback threw".to_string());
    io::Error::other(message)
}
