//! Minimal TensorBoard event-file writer for scalars.
//!
//! Produces files the trainer's own summary writer would: a version header
//! followed by one `simple_value` summary per scalar. Used to seed fixture
//! logs and by tooling that replays metrics.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use prost::Message;

use crate::types::Step;

use super::proto::{Event, SessionLog, SessionStatus, Summary, SummaryValue};
use super::record::frame;
use super::EVENT_FILE_PREFIX;

/// Version header written first in every file.
const FILE_VERSION: &str = "brain.Event:2";

pub struct EventFileWriter {
    path: PathBuf,
    out: BufWriter<File>,
}

impl EventFileWriter {
    /// Create `<dir>/events.out.tfevents.<unix_secs>.<suffix>`.
    pub fn create(dir: &Path, suffix: &str) -> io::Result<Self> {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self::create_named(dir, &format!("{EVENT_FILE_PREFIX}{secs}.{suffix}"))
    }

    /// Create an event file with an explicit file name inside `dir`.
    pub fn create_named(dir: &Path, file_name: &str) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        let out = BufWriter::new(File::create(&path)?);
        let mut writer = Self { path, out };
        writer.write_event(&Event {
            wall_time: wall_time(),
            file_version: Some(FILE_VERSION.to_string()),
            ..Default::default()
        })?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_event(&mut self, event: &Event) -> io::Result<()> {
        self.out.write_all(&frame(&event.encode_to_vec()))
    }

    pub fn add_scalar(&mut self, tag: &str, value: f32, step: Step) -> io::Result<()> {
        self.write_event(&Event {
            wall_time: wall_time(),
            step,
            summary: Some(Summary {
                value: vec![SummaryValue {
                    tag: tag.to_string(),
                    simple_value: Some(value),
                    tensor: None,
                    metadata: None,
                }],
            }),
            ..Default::default()
        })
    }

    /// Record a restart at `step`; readers discard points at or past it.
    pub fn add_session_start(&mut self, step: Step) -> io::Result<()> {
        self.write_event(&Event {
            wall_time: wall_time(),
            step,
            session_log: Some(SessionLog {
                status: SessionStatus::Start as i32,
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn wall_time() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
