//! Wire message decoder
//!
//! Tokenizes a datagram payload, classifies the leading address, and
//! interprets the remainder per channel. Malformed numeric tokens are
//! skipped at token granularity; a message missing an address or a usable
//! payload decodes to `None` rather than an error.

use super::{classify, ChannelKind};

/// A decoded wire message
#[derive(Debug, Clone, PartialEq)]
pub enum OscMessage {
    /// Audio samples for playback
    Audio { address: String, samples: Vec<f32> },
    /// Free-form text
    Text { address: String, text: String },
    /// Feature vector
    Analysis { address: String, features: Vec<f32> },
    /// Parsed but unroutable; counted, never dispatched
    Unknown { address: String },
}

impl OscMessage {
    /// Address the message was sent under, including any chunk suffix
    pub fn address(&self) -> &str {
        match self {
            OscMessage::Audio { address, .. }
            | OscMessage::Text { address, .. }
            | OscMessage::Analysis { address, .. }
            | OscMessage::Unknown { address } => address,
        }
    }
}

/// Decode one datagram payload. `None` means the message is invalid:
/// no address, or no usable payload for its channel.
pub fn decode(data: &[u8]) -> Option<OscMessage> {
    let text = String::from_utf8_lossy(data);
    let mut tokens = text.split_whitespace();

    let address = tokens.next()?.to_string();

    match classify(&address) {
        ChannelKind::Audio => {
            let samples = parse_floats(tokens);
            (!samples.is_empty()).then_some(OscMessage::Audio { address, samples })
        }
        ChannelKind::Analysis => {
            let features = parse_floats(tokens);
            (!features.is_empty()).then_some(OscMessage::Analysis { address, features })
        }
        ChannelKind::Text => {
            // Everything after the address token, original spacing preserved
            let body = text
                .trim_start()
                .strip_prefix(address.as_str())
                .unwrap_or_default()
                .trim();
            (!body.is_empty()).then(|| OscMessage::Text {
                address,
                text: body.to_string(),
            })
        }
        ChannelKind::Unknown => Some(OscMessage::Unknown { address }),
    }
}

/// Parse whitespace tokens as finite floats, silently skipping the rest
fn parse_floats<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<f32> {
    tokens
        .filter_map(|token| token.parse::<f32>().ok())
        .filter(|value| value.is_finite())
        .collect()
}
