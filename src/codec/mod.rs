//! ASCII wire codec
//!
//! Converts float buffers to and from the text-based message format and
//! classifies addresses into channels. Pure functions, no I/O, no state.

pub mod decoder;
pub mod encoder;

pub use decoder::{decode, OscMessage};
pub use encoder::encode_audio;

/// Semantic channel of a message, derived from its address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Audio,
    Text,
    Analysis,
    Unknown,
}

/// Classify an address into a channel.
///
/// Matching is by substring against an ordered rule set; the first match
/// wins. Audio is checked before Text before Analysis. The structured
/// prefixes `/audio/stream` and `/chan1/audio` are listed explicitly even
/// though the substring rule already covers them; the precedence must stay
/// observable either way.
pub fn classify(address: &str) -> ChannelKind {
    if address.starts_with("/audio/stream")
        || address.starts_with("/chan1/audio")
        || address.contains("audio")
    {
        ChannelKind::Audio
    } else if address.starts_with("/chan2/text") || address.contains("text") {
        ChannelKind::Text
    } else if address.starts_with("/chan3/analysis")
        || address.contains("analysis")
        || address.contains("features")
    {
        ChannelKind::Analysis
    } else {
        ChannelKind::Unknown
    }
}
