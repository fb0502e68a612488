use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use super::types::{EventSink, ReceiveEvent, SendEvent};
use crate::time::now_micros;

pub const SEND_LOG_FILE: &str = "snd.csv";
pub const RECEIVE_LOG_FILE: &str = "rcv.csv";
pub const ERROR_LOG_FILE: &str = "err.csv";

#[derive(Serialize)]
struct SendRow {
    event_time: u64,
    predicted: bool,
    packet_time: u64,
    sequence: u32,
    pos_x: f64,
    pos_y: f64,
    pos_z: f64,
}

#[derive(Serialize)]
struct ReceiveRow {
    event_time: u64,
    predicted: bool,
    packet_time: u64,
    sequence: u32,
    pos_x: f64,
    pos_y: f64,
    pos_z: f64,
    loss: f64,
}

#[derive(Serialize)]
struct ErrorRow<'a> {
    event_time: u64,
    msg: &'a str,
}

struct Archive {
    path: PathBuf,
    writer: Writer<File>,
    failed: bool,
}

impl Archive {
    fn create(path: PathBuf) -> csv::Result<Self> {
        let writer = WriterBuilder::new().has_headers(true).from_path(&path)?;
        Ok(Self {
            path,
            writer,
            failed: false,
        })
    }

    fn write<T: Serialize>(&mut self, row: T) {
        if let Err(e) = self.writer.serialize(row) {
            // One warning per file; a full disk would otherwise flood the log.
            if !self.failed {
                log::warn!("Event log {} write failed: {}", self.path.display(), e);
                self.failed = true;
            }
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("Event log {} flush failed: {}", self.path.display(), e);
        }
    }
}

/// Writes send, receive and error events into three CSV files in one
/// directory. Rows are buffered and only reach disk on flush or drop.
pub struct CsvEventLog {
    send: Archive,
    receive: Archive,
    error: Archive,
}

impl CsvEventLog {
    pub fn create<P: AsRef<Path>>(dir: P) -> csv::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        Ok(Self {
            send: Archive::create(dir.join(SEND_LOG_FILE))?,
            receive: Archive::create(dir.join(RECEIVE_LOG_FILE))?,
            error: Archive::create(dir.join(ERROR_LOG_FILE))?,
        })
    }
}

impl EventSink for CsvEventLog {
    fn record_send(&mut self, event: &SendEvent) {
        self.send.write(SendRow {
            event_time: now_micros(),
            predicted: event.suppressed,
            packet_time: event.packet_time,
            sequence: event.sequence,
            pos_x: event.position.x,
            pos_y: event.position.y,
            pos_z: event.position.z,
        });
    }

    fn record_receive(&mut self, event: &ReceiveEvent) {
        self.receive.write(ReceiveRow {
            event_time: now_micros(),
            predicted: event.predicted,
            packet_time: event.packet_time,
            sequence: event.sequence,
            pos_x: event.position.x,
            pos_y: event.position.y,
            pos_z: event.position.z,
            loss: event.loss_ratio,
        });
    }

    fn record_error(&mut self, message: &str) {
        self.error.write(ErrorRow {
            event_time: now_micros(),
            msg: message,
        });
    }

    fn flush(&mut self) {
        self.send.flush();
        self.receive.flush();
        self.error.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tether-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_writes_three_files_with_headers() {
        let dir = scratch_dir("csv-log");
        let mut log = CsvEventLog::create(&dir).unwrap();

        log.record_send(&SendEvent {
            suppressed: false,
            packet_time: 11,
            sequence: 1,
            position: DVec3::new(1.0, 2.0, 3.0),
        });
        log.record_receive(&ReceiveEvent {
            predicted: true,
            packet_time: 22,
            sequence: 4,
            position: DVec3::new(-1.0, 0.5, 0.0),
            loss_ratio: 0.25,
        });
        log.record_error("send failed");
        log.flush();

        let snd = fs::read_to_string(dir.join(SEND_LOG_FILE)).unwrap();
        let mut lines = snd.lines();
        assert_eq!(
            lines.next(),
            Some("event_time,predicted,packet_time,sequence,pos_x,pos_y,pos_z")
        );
        assert!(lines.next().unwrap().ends_with(",false,11,1,1.0,2.0,3.0"));

        let rcv = fs::read_to_string(dir.join(RECEIVE_LOG_FILE)).unwrap();
        assert!(rcv.lines().next().unwrap().ends_with(",loss"));
        assert!(rcv.lines().nth(1).unwrap().ends_with(",true,22,4,-1.0,0.5,0.0,0.25"));

        let err = fs::read_to_string(dir.join(ERROR_LOG_FILE)).unwrap();
        assert!(err.lines().nth(1).unwrap().ends_with(",send failed"));

        let _ = fs::remove_dir_all(&dir);
    }
}
