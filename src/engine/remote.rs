use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use futures_util::StreamExt;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::engine::{EventStream, SpeechEngine, TimedEvent, VoiceParams};
use crate::errors::EngineError;

/// Client for a remote streaming synthesis service.
///
/// The service answers `POST {endpoint}/synthesize` with a newline-delimited
/// JSON event stream: one object per line, discriminated by `type` into
/// `audio` (base64 payload), `SentenceBoundary` and `WordBoundary` (tick
/// offsets plus text). The stream ends when the response body ends.
#[derive(Debug, Clone)]
pub struct RemoteEngine {
    /// Base URL of the synthesis service
    base_url: Url,
    /// HTTP client for making requests
    client: Client,
}

/// Synthesis request body
#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    /// Text to synthesize
    text: &'a str,
    /// Voice identifier
    voice: &'a str,
    /// Speech rate adjustment, passed through verbatim
    rate: &'a str,
    /// Speech pitch adjustment, passed through verbatim
    pitch: &'a str,
    /// Speech volume adjustment, passed through verbatim
    volume: &'a str,
}

/// One line of the event stream as it appears on the wire
#[derive(Debug, Deserialize)]
struct WireEvent {
    /// Event discriminator: `audio`, `SentenceBoundary` or `WordBoundary`
    #[serde(rename = "type")]
    kind: String,
    /// Base64 audio payload (audio events only)
    #[serde(default)]
    data: Option<String>,
    /// Offset in 100 ns ticks (boundary events only)
    #[serde(default)]
    offset: Option<u64>,
    /// Duration in 100 ns ticks (boundary events only)
    #[serde(default)]
    duration: Option<u64>,
    /// Sentence or word text (boundary events only)
    #[serde(default)]
    text: Option<String>,
}

impl RemoteEngine {
    /// Create a new engine client for the given service endpoint
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, EngineError> {
        let base_url = Url::parse(endpoint)
            .map_err(|e| EngineError::ConnectionError(format!("Invalid endpoint URL {}: {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| EngineError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EngineError> {
        self.base_url
            .join(path)
            .map_err(|e| EngineError::ConnectionError(format!("Invalid endpoint path {}: {}", path, e)))
    }

    /// Decode one wire line into a timed event
    fn decode_line(line: &str) -> Result<TimedEvent, EngineError> {
        let wire: WireEvent = serde_json::from_str(line)
            .map_err(|e| EngineError::Protocol(format!("Undecodable event line: {}", e)))?;

        match wire.kind.as_str() {
            "audio" => {
                let encoded = wire
                    .data
                    .ok_or_else(|| EngineError::Protocol("audio event without data".to_string()))?;
                let data = base64::engine::general_purpose::STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|e| EngineError::Protocol(format!("Invalid audio payload: {}", e)))?;
                Ok(TimedEvent::Audio {
                    data: Bytes::from(data),
                })
            }
            "SentenceBoundary" => Ok(TimedEvent::SentenceBoundary {
                offset_ticks: wire.offset.unwrap_or(0),
                duration_ticks: wire.duration.unwrap_or(0),
                text: wire.text.unwrap_or_default(),
            }),
            "WordBoundary" => Ok(TimedEvent::WordBoundary {
                offset_ticks: wire.offset.unwrap_or(0),
                duration_ticks: wire.duration.unwrap_or(0),
                text: wire.text.unwrap_or_default(),
            }),
            other => Err(EngineError::Protocol(format!("Unknown event type: {}", other))),
        }
    }
}

fn map_request_error(e: reqwest::Error) -> EngineError {
    if e.is_connect() {
        EngineError::ConnectionError(e.to_string())
    } else if e.is_timeout() {
        EngineError::RequestFailed(format!("Request timed out: {}", e))
    } else {
        EngineError::RequestFailed(e.to_string())
    }
}

#[async_trait]
impl SpeechEngine for RemoteEngine {
    async fn stream(&self, text: &str, params: &VoiceParams) -> Result<EventStream, EngineError> {
        let request = SynthesisRequest {
            text,
            voice: &params.voice,
            rate: &params.rate,
            pitch: &params.pitch,
            volume: &params.volume,
        };

        let response = self
            .client
            .post(self.endpoint("synthesize")?)
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EngineError::ApiError {
                status_code: status.as_u16(),
                message,
            });
        }

        debug!("Opened synthesis stream for {} chars with voice {}", text.chars().count(), params.voice);

        let mut body = response.bytes_stream();
        let stream = async_stream::try_stream! {
            let mut buffer: Vec<u8> = Vec::new();

            while let Some(piece) = body.next().await {
                let piece = piece.map_err(|e| EngineError::StreamInterrupted(e.to_string()))?;
                buffer.extend_from_slice(&piece);

                while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline).collect();
                    let line = std::str::from_utf8(&line[..line.len() - 1])
                        .map_err(|e| EngineError::Protocol(format!("Non-UTF-8 event line: {}", e)))?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    yield RemoteEngine::decode_line(line)?;
                }
            }

            // Final line without a trailing newline
            if !buffer.is_empty() {
                let line = std::str::from_utf8(&buffer)
                    .map_err(|e| EngineError::Protocol(format!("Non-UTF-8 event line: {}", e)))?;
                if !line.trim().is_empty() {
                    yield RemoteEngine::decode_line(line)?;
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn test_connection(&self) -> Result<(), EngineError> {
        let response = self
            .client
            .get(self.endpoint("voices")?)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(EngineError::ApiError {
                status_code: status.as_u16(),
                message: "Voice listing failed".to_string(),
            })
        }
    }
}
