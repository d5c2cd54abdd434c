//! Raw transport capture for debugging sessions.
//!
//! One line per transfer: nanoseconds since the capture started, `<` for
//! bytes read from the board or `>` for bytes written to it, then the bytes
//! in standard base64.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use base64::prelude::*;

pub struct DebugCapture {
    out: Box<dyn Write>,
    start: Instant,
}

impl DebugCapture {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out,
            start: Instant::now(),
        }
    }

    /// Capture to `{prefix}.debug`, truncating an existing file.
    pub fn create(prefix: &str) -> io::Result<Self> {
        let path = Self::path_for(prefix);
        Ok(Self::new(Box::new(BufWriter::new(File::create(path)?))))
    }

    pub fn path_for(prefix: &str) -> PathBuf {
        PathBuf::from(format!("{prefix}.debug"))
    }

    pub fn record(&mut self, is_input: bool, bytes: &[u8]) -> io::Result<()> {
        let direction = if is_input { '<' } else { '>' };
        writeln!(
            self.out,
            "{} {} {}",
            self.start.elapsed().as_nanos(),
            direction,
            BASE64_STANDARD.encode(bytes)
        )?;
        self.out.flush()
    }
}

impl std::fmt::Debug for DebugCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugCapture").field("start", &self.start).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_transfer() {
        let prefix = std::env::temp_dir()
            .join(format!("dgt_pgn-capture-{}", std::process::id()))
            .to_string_lossy()
            .into_owned();
        let mut capture = DebugCapture::create(&prefix).expect("capture file created");
        capture.record(false, &[0x42]).expect("written");
        capture.record(true, &[0x93, 0x00, 0x05, 0x01, 0x09]).expect("written");
        drop(capture);

        let path = DebugCapture::path_for(&prefix);
        let text = std::fs::read_to_string(&path).expect("capture readable");
        let _ = std::fs::remove_file(&path);

        let lines: Vec<Vec<&str>> = text.lines().map(|line| line.split(' ').collect()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(&lines[0][1..], &[">", "Qg=="]);
        assert_eq!(&lines[1][1..], &["<", "kwAFAQk="]);
        let first: u128 = lines[0][0].parse().expect("elapsed nanoseconds");
        let second: u128 = lines[1][0].parse().expect("elapsed nanoseconds");
        assert!(first <= second);
    }
}
