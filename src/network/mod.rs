//! Network subsystem for UDP message transport

pub mod receiver;
pub mod sender;

pub use receiver::{OscHandler, OscReceiver, ReceiverStats};
pub use sender::{OscSender, SenderStats};
