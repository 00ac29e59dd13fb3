pub mod history;
pub mod store;

pub use history::RollingHistory;
pub use store::{ConversationLog, ConversationTurn, Speaker};
