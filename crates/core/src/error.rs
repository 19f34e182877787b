use std::path::PathBuf;

/// Failures while decoding a single event file.
///
/// These never escape the log reader: a bad file or record is logged and
/// skipped, because an incomplete log is normal while training is running.
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("Failed to read event file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Checksum mismatch in {section} of record at byte {offset}")]
    Checksum { section: &'static str, offset: u64 },

    #[error("Malformed event record at byte {offset}: {message}")]
    Decode { offset: u64, message: String },
}

/// Failures launching, waiting on, or signalling an external trainer process.
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("Failed to launch {mode} trainer ({program}): {source}")]
    Spawn {
        mode: &'static str,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed waiting for {mode} trainer: {source}")]
    Wait {
        mode: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to terminate {mode} trainer (pid {pid}): {source}")]
    Terminate {
        mode: &'static str,
        pid: u32,
        #[source]
        source: std::io::Error,
    },
}
