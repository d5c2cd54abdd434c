//! Both directions of the board link over one byte transport.
//!
//! Incoming bytes go through the [`Framer`]; outgoing board commands are
//! single bytes and clock commands are framed by [`ClockCommand`]. Only one
//! clock command may be in flight: the gate closes on send and reopens when
//! the clock acknowledges.

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::protocol::clock_commands::ClockCommand;
use crate::protocol::dgt_constants::BoardCommand;
use crate::protocol::framer::Framer;
use crate::protocol::messages::DgtMessage;

#[derive(Debug)]
pub struct DgtDriver<W: Write> {
    writer: W,
    framer: Framer,
    ready_for_clock_message: bool,
}

impl<W: Write> DgtDriver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            framer: Framer::new(),
            ready_for_clock_message: true,
        }
    }

    pub fn send_command(&mut self, command: BoardCommand) -> io::Result<()> {
        trace!(?command, byte = command.code(), "board command");
        self.writer.write_all(&[command.code()])?;
        self.writer.flush()
    }

    /// Send `command` unless an earlier clock command is still unacknowledged.
    ///
    /// Returns `Ok(false)` without writing when the gate is closed. A failed
    /// write leaves the gate open.
    pub fn send_clock_message(&mut self, command: &ClockCommand) -> io::Result<bool> {
        if !self.ready_for_clock_message {
            debug!(?command, "clock busy, command not sent");
            return Ok(false);
        }

        let bytes = command.to_bytes();
        trace!(?bytes, "clock command");
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        self.ready_for_clock_message = false;
        Ok(true)
    }

    pub fn is_ready_for_clock_message(&self) -> bool {
        self.ready_for_clock_message
    }

    /// Feed bytes read from the transport and return the decoded messages.
    pub fn got_bytes(&mut self, bytes: &[u8]) -> Vec<DgtMessage> {
        let messages = self.framer.push_bytes(bytes);
        if messages
            .iter()
            .any(|message| matches!(message, DgtMessage::ClockAck(_)))
        {
            self.ready_for_clock_message = true;
        }
        messages
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::dgt_constants::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn clock_frame(payload: [u8; 7]) -> Vec<u8> {
        let mut bytes = vec![DGT_BWTIME | 0x80, 0x00, 10];
        bytes.extend_from_slice(&payload);
        bytes
    }

    #[test]
    fn board_commands_are_single_bytes() {
        let mut driver = DgtDriver::new(Vec::new());
        driver.send_command(BoardCommand::SendBoard).expect("vec write");
        driver.send_command(BoardCommand::UpdateBoard).expect("vec write");
        assert_eq!(driver.writer(), &vec![0x42, 0x44]);
        assert!(driver.is_ready_for_clock_message());
    }

    #[test]
    fn clock_gate_blocks_until_ack() {
        let mut driver = DgtDriver::new(Vec::new());
        assert!(driver.send_clock_message(&ClockCommand::Version).expect("vec write"));
        assert!(!driver.send_clock_message(&ClockCommand::End).expect("vec write"));
        assert_eq!(driver.writer().len(), 5);

        // Time reports do not reopen the gate.
        let messages = driver.got_bytes(&clock_frame([0x00, 0x05, 0x00, 0x00, 0x05, 0x00, 0x01]));
        assert!(matches!(messages.as_slice(), [DgtMessage::ClockTime(_)]));
        assert!(!driver.is_ready_for_clock_message());

        let messages = driver.got_bytes(&clock_frame([0x0a, 0x00, 0x09, 0x00, 0x12, 0x00, 0x00]));
        assert!(matches!(messages.as_slice(), [DgtMessage::ClockAck(_)]));
        assert!(driver.is_ready_for_clock_message());
        assert!(driver.send_clock_message(&ClockCommand::End).expect("vec write"));
    }

    #[test]
    fn heartbeat_neither_emits_nor_reopens() {
        let mut driver = DgtDriver::new(Vec::new());
        driver.send_clock_message(&ClockCommand::Button).expect("vec write");
        assert!(driver.got_bytes(&clock_frame([0; 7])).is_empty());
        assert!(!driver.is_ready_for_clock_message());
    }

    #[test]
    fn failed_write_keeps_gate_open() {
        let mut driver = DgtDriver::new(FailingWriter);
        assert!(driver.send_clock_message(&ClockCommand::End).is_err());
        assert!(driver.is_ready_for_clock_message());
    }
}
