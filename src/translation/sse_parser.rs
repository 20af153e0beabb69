//! Server-Sent Events (SSE) parser for OpenAI-compatible streaming responses.

use anyhow::{Result, anyhow};
use bytes::Bytes;
use futures_util::Stream;
use serde::Deserialize;

/// One `data:` payload of a streaming chat completion.
///
/// Some compatible servers report failures mid-stream as an `error` object
/// instead of an HTTP status.
#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamError {
    message: String,
}

/// What a single SSE line means for the consumer.
#[derive(Debug, PartialEq, Eq)]
enum SseLine {
    Content(String),
    Error(String),
    Done,
    Skip,
}

/// Converts a raw SSE byte stream into a stream of text chunks.
///
/// The stream ends after `data: [DONE]`, and ends with an error after the
/// first transport failure or server-reported error.
pub fn sse_to_text_stream(
    byte_stream: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> impl Stream<Item = Result<String>> + Send {
    async_stream::stream! {
        use futures_util::StreamExt;

        let mut byte_stream = std::pin::pin!(byte_stream);
        // Bytes, not text: a multi-byte character may straddle two packets.
        let mut buffer: Vec<u8> = Vec::new();

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    yield Err(anyhow!("Stream error: {e}"));
                    return;
                }
            };

            buffer.extend_from_slice(&chunk);

            while let Some(line_end) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&line);

                match parse_sse_line(line.trim()) {
                    SseLine::Content(content) => yield Ok(content),
                    SseLine::Error(message) => {
                        yield Err(anyhow!("Translation endpoint reported an error: {message}"));
                        return;
                    }
                    SseLine::Done => return,
                    SseLine::Skip => {}
                }
            }
        }
    }
}

fn parse_sse_line(line: &str) -> SseLine {
    // The space after the colon is optional in the SSE grammar.
    let Some(data) = line.strip_prefix("data:").map(str::trim_start) else {
        return SseLine::Skip;
    };

    if data == "[DONE]" {
        return SseLine::Done;
    }

    let Ok(event) = serde_json::from_str::<StreamEvent>(data) else {
        return SseLine::Skip;
    };

    if let Some(error) = event.error {
        return SseLine::Error(error.message);
    }

    let content: String = event
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();

    if content.is_empty() {
        SseLine::Skip
    } else {
        SseLine::Content(content)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    #[test]
    fn test_parse_content_line() {
        let line = r#"data: {"choices":[{"delta":{"content":"The dog"}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Content("The dog".to_string()));
    }

    #[test]
    fn test_parse_line_without_space_after_colon() {
        let line = r#"data:{"choices":[{"delta":{"content":"sleeps"}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Content("sleeps".to_string()));
    }

    #[test]
    fn test_parse_role_only_delta_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_sse_line(line), SseLine::Skip);
    }

    #[test]
    fn test_parse_done_marker() {
        assert_eq!(parse_sse_line("data: [DONE]"), SseLine::Done);
    }

    #[test]
    fn test_parse_error_event() {
        let line = r#"data: {"error":{"message":"model overloaded"}}"#;
        assert_eq!(
            parse_sse_line(line),
            SseLine::Error("model overloaded".to_string())
        );
    }

    #[test]
    fn test_parse_comment_and_event_lines_are_skipped() {
        assert_eq!(parse_sse_line(": keep-alive"), SseLine::Skip);
        assert_eq!(parse_sse_line("event: message"), SseLine::Skip);
        assert_eq!(parse_sse_line(""), SseLine::Skip);
        assert_eq!(parse_sse_line("data: not json"), SseLine::Skip);
    }

    #[tokio::test]
    async fn test_stream_joins_chunks_split_across_packets() {
        let packets: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Good \"}}]}\n\ndata: {\"choi",
            )),
            Ok(Bytes::from_static(
                b"ces\":[{\"delta\":{\"content\":\"morning\"}}]}\n\ndata: [DONE]\n\n",
            )),
        ];

        let chunks: Vec<String> = sse_to_text_stream(futures_util::stream::iter(packets))
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks, vec!["Good ".to_string(), "morning".to_string()]);
    }

    #[tokio::test]
    async fn test_stream_keeps_umlaut_split_across_packets() {
        let line = "data: {\"choices\":[{\"delta\":{\"content\":\"schön\"}}]}\n".as_bytes();
        let split = line.iter().position(|&b| b == 0xC3).unwrap() + 1;
        let packets: Vec<reqwest::Result<Bytes>> = vec![
            Ok(Bytes::copy_from_slice(&line[..split])),
            Ok(Bytes::copy_from_slice(&line[split..])),
        ];

        let chunks: Vec<String> = sse_to_text_stream(futures_util::stream::iter(packets))
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks, vec!["schön".to_string()]);
    }

    #[tokio::test]
    async fn test_stream_stops_at_error_event() {
        let packets: Vec<reqwest::Result<Bytes>> = vec![Ok(Bytes::from_static(
            b"data: {\"error\":{\"message\":\"quota exceeded\"}}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n",
        ))];

        let items: Vec<Result<String>> = sse_to_text_stream(futures_util::stream::iter(packets))
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(items[0].as_ref().is_err_and(|e| e.to_string().contains("quota exceeded")));
    }
}
