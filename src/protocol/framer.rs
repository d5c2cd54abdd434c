//! Reassembly of board messages from the serial byte stream.
//!
//! A frame is `[id | 0x80][len_hi][len_lo][payload...]` where the 14-bit
//! length `(len_hi << 7) | len_lo` counts the whole frame including its
//! header. Only the id byte may have its high bit set, which is what makes
//! resynchronisation after line noise possible: on any header violation
//! everything up to the next byte with the high bit set is dropped.

use tracing::{debug, trace, warn};

use crate::protocol::messages::{decode_message, DgtMessage};

const HEADER_LEN: usize = 3;

#[derive(Debug, Default, Clone)]
pub struct Framer {
    buffer: Vec<u8>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes held back waiting for the rest of a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append `bytes` and decode every complete frame now available.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Vec<DgtMessage> {
        self.buffer.extend_from_slice(bytes);
        let mut messages = Vec::new();
        self.try_emit(&mut messages);
        messages
    }

    fn try_emit(&mut self, messages: &mut Vec<DgtMessage>) {
        while self.buffer.len() >= HEADER_LEN {
            let (id, len_hi, len_lo) = (self.buffer[0], self.buffer[1], self.buffer[2]);
            if id & 0x80 == 0 {
                self.resync(1);
                continue;
            }
            if len_hi & 0x80 != 0 {
                self.resync(1);
                continue;
            }
            if len_lo & 0x80 != 0 {
                self.resync(2);
                continue;
            }

            let len = (usize::from(len_hi) << 7) | usize::from(len_lo);
            if len < HEADER_LEN {
                debug!(id = id & 0x7f, len, "frame shorter than its header");
                self.resync(1);
                continue;
            }
            if len > self.buffer.len() {
                break;
            }

            let frame: Vec<u8> = self.buffer.drain(..len).collect();
            let id = id & 0x7f;
            trace!(id, len, "frame");
            match decode_message(id, &frame[HEADER_LEN..]) {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => {}
                Err(err) => warn!(%err, id, "dropping message"),
            }
        }
    }

    /// Drop bytes before the first byte at or after `start` that has its
    /// high bit set. With no such byte the whole buffer goes.
    fn resync(&mut self, start: usize) {
        let start = start.min(self.buffer.len());
        let keep_from = self.buffer[start..]
            .iter()
            .position(|&b| b & 0x80 != 0)
            .map_or(self.buffer.len(), |pos| start + pos);
        debug!(discarded = keep_from, "resynchronising board stream");
        self.buffer.drain(..keep_from);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::dgt_constants::*;
    use crate::protocol::messages::Version;

    fn frame(id: u8, payload: &[u8]) -> Vec<u8> {
        let len = payload.len() + HEADER_LEN;
        let mut bytes = vec![id | 0x80, (len >> 7) as u8, (len & 0x7f) as u8];
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn decodes_a_complete_frame() {
        let mut framer = Framer::new();
        let messages = framer.push_bytes(&frame(DGT_VERSION, &[1, 9]));
        assert_eq!(messages, vec![DgtMessage::Version(Version { major: 1, minor: 9 })]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn board_dump_length_spans_both_length_bytes() {
        let bytes = frame(DGT_BOARD_DUMP, &[0; 64]);
        assert_eq!(&bytes[..3], &[0x86, 0x00, 67]);

        let mut long = frame(DGT_SERIALNR, &[b'7'; 200]);
        assert_eq!(long[1], 1);
        assert_eq!(long[2], (203 - 128) as u8);
        long.truncate(150);
        let mut framer = Framer::new();
        assert!(framer.push_bytes(&long).is_empty());
        assert_eq!(framer.buffered(), 150);
    }

    #[test]
    fn partial_frame_waits_for_more_bytes() {
        let bytes = frame(DGT_FIELD_UPDATE, &[12, 0x01]);
        let mut framer = Framer::new();
        assert!(framer.push_bytes(&bytes[..4]).is_empty());
        assert_eq!(framer.push_bytes(&bytes[4..]).len(), 1);
    }

    #[test]
    fn garbage_before_frame_is_discarded() {
        let mut bytes = vec![0x01, 0x7f, 0x00, 0x22];
        bytes.extend(frame(DGT_VERSION, &[3, 4]));
        let mut framer = Framer::new();
        assert_eq!(
            framer.push_bytes(&bytes),
            vec![DgtMessage::Version(Version { major: 3, minor: 4 })]
        );
    }

    #[test]
    fn header_with_flagged_length_byte_resyncs_to_next_id() {
        let mut bytes = vec![0x93, 0x80, 0x05];
        bytes.extend(frame(DGT_VERSION, &[1, 1]));
        let mut framer = Framer::new();
        assert_eq!(framer.push_bytes(&bytes).len(), 1);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn short_declared_length_does_not_stall() {
        let mut bytes = vec![0x93, 0x00, 0x01];
        bytes.extend(frame(DGT_VERSION, &[2, 0]));
        let mut framer = Framer::new();
        assert_eq!(framer.push_bytes(&bytes).len(), 1);
    }

    #[test]
    fn malformed_and_unknown_messages_are_dropped() {
        let mut bytes = frame(DGT_VERSION, &[1]);
        bytes.extend(frame(0x31, &[0, 0]));
        bytes.extend(frame(DGT_BWTIME, &[0; 7]));
        bytes.extend(frame(DGT_VERSION, &[1, 2]));
        let mut framer = Framer::new();
        assert_eq!(
            framer.push_bytes(&bytes),
            vec![DgtMessage::Version(Version { major: 1, minor: 2 })]
        );
    }
}
