mod csv_log;
mod types;

pub use csv_log::{CsvEventLog, ERROR_LOG_FILE, RECEIVE_LOG_FILE, SEND_LOG_FILE};
pub use types::{EventSink, NullSink, ReceiveEvent, SendEvent};
