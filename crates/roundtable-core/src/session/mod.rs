//! Session domain types: messages, the transcript, specs, and results.

pub mod message;
pub mod result;
pub mod spec;
pub mod transcript;

pub use message::{Message, ROUND_INITIAL, ROUND_SYNTHESIS};
pub use result::{SessionResult, SessionStatus};
pub use spec::{MAX_FOCUS_GROUP_PARTICIPANTS, SessionSpec, SessionType};
pub use transcript::{Transcript, Window};
