mod output;
mod sink;
mod sqlite;
mod state;
mod storage;

pub use output::{ContentId, MsgStatus, OutputMessage, OutputSnapshot, TextContent};
pub use sink::{ChannelSink, LogSink, MessageSink, NoopSink, RecordingSink, SessionEvent};
pub use sqlite::SqliteStorage;
pub use state::{SessionState, SessionStatus, SessionSummary};
pub use storage::Storage;
