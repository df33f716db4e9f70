//! Edge read-aloud synthesis backend
//!
//! Websocket client for the Microsoft Edge read-aloud service. One
//! request per connection: send a `speech.config` selecting raw 24 kHz
//! 16-bit mono PCM output, send the SSML, then forward `Path:audio`
//! binary frames until `Path:turn.end`.

use async_stream::try_stream;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;

use super::{SpeechRequest, SynthesisError, TtsBackend, TtsChunk, TtsStream};

/// Public read-aloud endpoint; the trusted client token is the one the
/// Edge browser itself presents.
const EDGE_ENDPOINT: &str = "wss://speech.platform.bing.com/consumer/speech/synthesize/\
                             readaloud/edge/v1?TrustedClientToken=6A5AA1D4EAFF4E9FB37E23D68491D6F4";

const EDGE_ORIGIN: &str = "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold";

const OUTPUT_FORMAT: &str = "raw-24khz-16bit-mono-pcm";

/// Synthesis backend speaking the Edge read-aloud websocket protocol.
pub struct EdgeTtsBackend {
    endpoint: String,
}

impl Default for EdgeTtsBackend {
    fn default() -> Self {
        Self {
            endpoint: EDGE_ENDPOINT.to_string(),
        }
    }
}

impl EdgeTtsBackend {
    /// Backend against a non-default endpoint (tests, proxies).
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl TtsBackend for EdgeTtsBackend {
    async fn stream(&self, request: SpeechRequest) -> Result<TtsStream, SynthesisError> {
        let request_id = uuid::Uuid::new_v4().simple().to_string();
        let url = format!("{}&ConnectionId={}", self.endpoint, request_id);

        let mut ws_request = url
            .into_client_request()
            .map_err(|err| SynthesisError::Transport(err.to_string()))?;
        ws_request
            .headers_mut()
            .insert("Origin", HeaderValue::from_static(EDGE_ORIGIN));

        let (mut socket, _) = connect_async(ws_request)
            .await
            .map_err(|err| SynthesisError::Transport(err.to_string()))?;

        let timestamp = request_timestamp();
        socket
            .send(Message::Text(speech_config_message(&timestamp).into()))
            .await
            .map_err(|err| SynthesisError::Transport(err.to_string()))?;
        socket
            .send(Message::Text(
                ssml_message(&request_id, &timestamp, &request).into(),
            ))
            .await
            .map_err(|err| SynthesisError::Transport(err.to_string()))?;

        tracing::debug!(request_id = %request_id, voice = %request.voice, "edge synthesis started");

        let stream = try_stream! {
            let mut turn_ended = false;
            while let Some(frame) = socket.next().await {
                let frame = frame.map_err(|err| SynthesisError::Transport(err.to_string()))?;
                match frame {
                    Message::Binary(data) => {
                        if let Some(audio) = binary_audio_payload(&data) {
                            yield TtsChunk::Audio(Bytes::copy_from_slice(audio));
                        }
                    }
                    Message::Text(text) => {
                        if text_frame_path(&text) == Some("turn.end") {
                            turn_ended = true;
                            break;
                        }
                        yield TtsChunk::Metadata(text.to_string());
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            if !turn_ended {
                Err(SynthesisError::TruncatedStream)?;
            }
        };
        Ok(Box::pin(stream))
    }
}

/// Timestamp header in the JavaScript date string form the service expects.
fn request_timestamp() -> String {
    chrono::Utc::now()
        .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

fn speech_config_message(timestamp: &str) -> String {
    format!(
        "X-Timestamp:{timestamp}\r\n\
         Content-Type:application/json; charset=utf-8\r\n\
         Path:speech.config\r\n\r\n\
         {{\"context\":{{\"synthesis\":{{\"audio\":{{\"metadataoptions\":{{\
         \"sentenceBoundaryEnabled\":\"false\",\"wordBoundaryEnabled\":\"false\"}},\
         \"outputFormat\":\"{OUTPUT_FORMAT}\"}}}}}}}}"
    )
}

fn ssml_message(request_id: &str, timestamp: &str, request: &SpeechRequest) -> String {
    let ssml = format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
         <voice name='{}'><prosody pitch='+0Hz' rate='{}' volume='{}'>{}</prosody></voice></speak>",
        request.voice,
        request.rate,
        request.volume,
        escape_xml(&request.text),
    );
    format!(
        "X-RequestId:{request_id}\r\n\
         Content-Type:application/ssml+xml\r\n\
         X-Timestamp:{timestamp}\r\n\
         Path:ssml\r\n\r\n\
         {ssml}"
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&apos;")
        .replace('"', "&quot;")
}

/// Value of the `Path` header of a text frame.
fn text_frame_path(frame: &str) -> Option<&str> {
    let headers = frame.split("\r\n\r\n").next().unwrap_or(frame);
    headers
        .lines()
        .find_map(|line| line.strip_prefix("Path:"))
        .map(str::trim)
}

/// Audio payload of a binary frame: a big-endian u16 header length,
/// headers, then the data. Frames whose headers do not announce
/// `Path:audio` carry no audio.
fn binary_audio_payload(frame: &[u8]) -> Option<&[u8]> {
    if frame.len() < 2 {
        return None;
    }
    let header_len = u16::from_be_bytes([frame[0], frame[1]]) as usize;
    let payload_start = 2 + header_len;
    if payload_start > frame.len() {
        return None;
    }
    let headers = std::str::from_utf8(&frame[2..payload_start]).ok()?;
    if !headers.contains("Path:audio") {
        return None;
    }
    Some(&frame[payload_start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssml_carries_voice_and_prosody() {
        let message = ssml_message(
            "abc123",
            "now",
            &SpeechRequest {
                text: "Hello world!".to_string(),
                voice: "en-GB-SoniaNeural".to_string(),
                rate: "+10%".to_string(),
                volume: "-5%".to_string(),
            },
        );
        assert!(message.starts_with("X-RequestId:abc123\r\n"));
        assert!(message.contains("<voice name='en-GB-SoniaNeural'>"));
        assert!(message.contains("rate='+10%'"));
        assert!(message.contains("volume='-5%'"));
        assert!(message.contains(">Hello world!</prosody>"));
    }

    #[test]
    fn test_ssml_escapes_markup_in_text() {
        let message = ssml_message(
            "id",
            "now",
            &SpeechRequest {
                text: "a < b & c".to_string(),
                voice: "v".to_string(),
                rate: "+0%".to_string(),
                volume: "+0%".to_string(),
            },
        );
        assert!(message.contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_speech_config_requests_raw_pcm() {
        let message = speech_config_message("now");
        assert!(message.contains("Path:speech.config"));
        assert!(message.contains("raw-24khz-16bit-mono-pcm"));
    }

    #[test]
    fn test_text_frame_path() {
        let frame = "X-RequestId:1\r\nPath:turn.end\r\n\r\n{}";
        assert_eq!(text_frame_path(frame), Some("turn.end"));
        assert_eq!(text_frame_path("no headers here"), None);
    }

    #[test]
    fn test_binary_audio_payload() {
        let headers = b"X-RequestId:1\r\nPath:audio\r\n";
        let mut frame = Vec::new();
        frame.extend_from_slice(&(headers.len() as u16).to_be_bytes());
        frame.extend_from_slice(headers);
        frame.extend_from_slice(&[1, 2, 3, 4]);
        assert_eq!(binary_audio_payload(&frame), Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn test_binary_frame_without_audio_path() {
        let headers = b"Path:metadata\r\n";
        let mut frame = Vec::new();
        frame.extend_from_slice(&(headers.len() as u16).to_be_bytes());
        frame.extend_from_slice(headers);
        frame.extend_from_slice(&[9, 9]);
        assert_eq!(binary_audio_payload(&frame), None);
        assert_eq!(binary_audio_payload(&[0x01]), None);
    }
}
