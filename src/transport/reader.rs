//! Incremental reader for chunked text responses.

use futures::{Stream, StreamExt};

/// Prefix the service puts on heartbeat chunks while it is still composing.
pub const TYPING_MARKER: &str = "[typing]";

/// UTF-8 decoder that keeps incomplete sequences between calls.
///
/// A multi-byte character split across two chunks is held back until the rest
/// of its bytes arrive. Invalid bytes decode to U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning all text that is complete so far.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let buf = std::mem::take(&mut self.pending);

        let mut out = String::with_capacity(buf.len());
        let mut rest = &buf[..];
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for more bytes.
                            self.pending = tail.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is still pending once the input has ended.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let pending = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&pending).into_owned()
    }

    /// Whether bytes of an unfinished character are being held back.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

/// Consume a byte stream, handing each decoded text chunk to `on_chunk`.
///
/// Chunks are visited once, in arrival order. Text beginning with
/// [`TYPING_MARKER`] is dropped, as is text that decodes to nothing because
/// all of its bytes are still pending. The first stream error stops reading
/// and is returned.
pub async fn read_stream<S, B, E, F>(stream: S, mut on_chunk: F) -> Result<(), E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    F: FnMut(String),
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = Utf8Decoder::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        deliver(decoder.decode(chunk.as_ref()), &mut on_chunk);
    }

    deliver(decoder.finish(), &mut on_chunk);
    Ok(())
}

fn deliver<F: FnMut(String)>(text: String, on_chunk: &mut F) {
    if text.is_empty() {
        return;
    }
    if text.starts_with(TYPING_MARKER) {
        tracing::trace!("dropping typing heartbeat");
        return;
    }
    on_chunk(text);
}
