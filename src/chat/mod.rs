//! Chat with a deployed agent: prompt-parameter confirmation and turn
//! threading through the continuation token.

pub mod error;
pub mod params;
pub mod session;

pub use error::ChatError;
pub use params::{join_values, split_values, toggle_value, ParamValues, MULTI_SELECT_SEPARATOR};
pub use session::{ChatMessage, ChatSession, MessageRole, ParamPhase, PendingTurn};
