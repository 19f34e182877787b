//! TFRecord framing used by TensorBoard event files.
//!
//! Each record is laid out as:
//!
//! | Bytes    | Content                               |
//! |----------|---------------------------------------|
//! | 8        | payload length, little-endian `u64`   |
//! | 4        | masked CRC-32C of the length bytes    |
//! | `length` | payload (a serialized `Event`)        |
//! | 4        | masked CRC-32C of the payload         |

use crate::error::EventLogError;

const LENGTH_BYTES: usize = 8;
const CRC_BYTES: usize = 4;
const HEADER_BYTES: usize = LENGTH_BYTES + CRC_BYTES;

const MASK_DELTA: u32 = 0xa282_ead8;

/// CRC-32C rotated and offset the way TFRecord stores it.
pub fn masked_crc(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    ((crc >> 15) | (crc << 17)).wrapping_add(MASK_DELTA)
}

/// Frame `payload` as one TFRecord.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let length = (payload.len() as u64).to_le_bytes();
    let mut out = Vec::with_capacity(HEADER_BYTES + payload.len() + CRC_BYTES);
    out.extend_from_slice(&length);
    out.extend_from_slice(&masked_crc(&length).to_le_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&masked_crc(payload).to_le_bytes());
    out
}

/// Iterates record payloads in an in-memory event file.
///
/// A truncated final record ends iteration quietly, since the writer may
/// still be appending to the file. A checksum mismatch yields one error
/// and then ends iteration.
pub struct RecordReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Byte offset of the next unread record.
    pub fn offset(&self) -> u64 {
        self.offset as u64
    }

    fn stop(&mut self) {
        self.offset = self.buf.len();
    }
}

impl<'a> Iterator for RecordReader<'a> {
    type Item = Result<&'a [u8], EventLogError>;

    fn next(&mut self) -> Option<Self::Item> {
        let buf: &'a [u8] = self.buf;
        let start = self.offset;
        let rest = &buf[start..];
        if rest.len() < HEADER_BYTES {
            return None;
        }

        let length_bytes = &rest[..LENGTH_BYTES];
        let length_crc = read_u32(&rest[LENGTH_BYTES..HEADER_BYTES]);
        if masked_crc(length_bytes) != length_crc {
            self.stop();
            return Some(Err(EventLogError::Checksum {
                section: "length",
                offset: start as u64,
            }));
        }

        let mut raw_length = [0u8; LENGTH_BYTES];
        raw_length.copy_from_slice(length_bytes);
        let length = match usize::try_from(u64::from_le_bytes(raw_length)) {
            Ok(length) => length,
            Err(_) => {
                self.stop();
                return Some(Err(EventLogError::Decode {
                    offset: start as u64,
                    message: "record length does not fit in memory".to_string(),
                }));
            }
        };

        let Some(payload_end) = HEADER_BYTES.checked_add(length) else {
            self.stop();
            return None;
        };
        if rest.len() < payload_end.saturating_add(CRC_BYTES) {
            // Partially written tail.
            return None;
        }

        let payload = &rest[HEADER_BYTES..payload_end];
        let payload_crc = read_u32(&rest[payload_end..payload_end + CRC_BYTES]);
        if masked_crc(payload) != payload_crc {
            self.stop();
            return Some(Err(EventLogError::Checksum {
                section: "payload",
                offset: start as u64,
            }));
        }

        self.offset = start + payload_end + CRC_BYTES;
        Some(Ok(payload))
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; CRC_BYTES];
    raw.copy_from_slice(&bytes[..CRC_BYTES]);
    u32::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn reads_back_framed_payloads() {
        let mut buf = frame(b"first");
        buf.extend(frame(b""));
        buf.extend(frame(b"third"));

        let payloads: Vec<_> = RecordReader::new(&buf).map(Result::unwrap).collect();
        assert_eq!(payloads, vec![&b"first"[..], &b""[..], &b"third"[..]]);
    }

    #[test]
    fn truncated_tail_ends_quietly() {
        let mut buf = frame(b"complete");
        let partial = frame(b"partial record");
        buf.extend_from_slice(&partial[..partial.len() - 3]);

        let items: Vec<_> = RecordReader::new(&buf).collect();
        assert_eq!(items.len(), 1);
        assert_matches!(items[0], Ok(b"complete"));
    }

    #[test]
    fn corrupted_payload_is_reported_once() {
        let mut buf = frame(b"good");
        let mut bad = frame(b"bad!");
        bad[HEADER_BYTES] ^= 0xff;
        buf.extend(bad);
        buf.extend(frame(b"never reached"));

        let items: Vec<_> = RecordReader::new(&buf).collect();
        assert_eq!(items.len(), 2);
        assert_matches!(items[0], Ok(b"good"));
        assert_matches!(
            items[1],
            Err(EventLogError::Checksum {
                section: "payload",
                ..
            })
        );
    }

    #[test]
    fn corrupted_length_is_reported() {
        let mut buf = frame(b"payload");
        buf[0] ^= 0x01;

        let items: Vec<_> = RecordReader::new(&buf).collect();
        assert_eq!(items.len(), 1);
        assert_matches!(
            items[0],
            Err(EventLogError::Checksum {
                section: "length",
                offset: 0
            })
        );
    }

    #[test]
    fn empty_buffer_has_no_records() {
        assert_eq!(RecordReader::new(&[]).count(), 0);
    }
}
