//! Chat state: the turn history and the per-user conversation session.

pub mod history;
pub mod session;

pub use history::{HistoryBuffer, Role, Turn, DEFAULT_WINDOW_SIZE};
pub use session::{ChatSettings, ConversationSession, Transcript};
