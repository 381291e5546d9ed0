//! Protocol module: inbound command framing and the outbound LED frame.

pub mod frame;
pub mod framer;

pub use frame::{encode_led_frame, frame_len, FRAME_HEADER};
pub use framer::CommandFramer;
