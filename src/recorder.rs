//! Records games from a board byte stream into numbered PGN files.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

use tracing::{debug, info, warn, Level};

use crate::capture::DebugCapture;
use crate::errors::RecorderResult;
use crate::game_state::chess_types::*;
use crate::game_state::position::Setup;
use crate::protocol::clock_commands::ClockCommand;
use crate::protocol::dgt_constants::BoardCommand;
use crate::protocol::driver::DgtDriver;
use crate::protocol::messages::{ClockTime, DgtMessage};
use crate::reconciliation::ee_replay::replay_ee_events;
use crate::reconciliation::game::Game;
use crate::reconciliation::move_parser::MoveParser;
use crate::utils::pgn::{default_headers, write_pgn};
use crate::utils::render_position::render_position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfig {
    /// Games go to `{output_prefix}-{n}.pgn`, numbered from 1.
    pub output_prefix: String,
    pub include_clock: bool,
    /// Bytes handed to the driver per read.
    pub chunk_size: usize,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_prefix: "game".to_owned(),
            include_clock: true,
            chunk_size: 64,
        }
    }
}

pub struct Recorder<W: Write> {
    config: RecorderConfig,
    driver: DgtDriver<W>,
    parser: MoveParser,
    games_written: usize,
    capture: Option<DebugCapture>,
    /// Latest clock report, as sent by the clock.
    clock: Option<ClockTime>,
}

impl<W: Write> Recorder<W> {
    /// `writer` is the transport towards the board.
    pub fn new(config: RecorderConfig, writer: W) -> Self {
        Self {
            config,
            driver: DgtDriver::new(writer),
            parser: MoveParser::new(),
            games_written: 0,
            capture: None,
            clock: None,
        }
    }

    /// Record every transfer in both directions to `capture`.
    pub fn with_capture(mut self, capture: DebugCapture) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Ask for a full board dump, then for field updates as pieces move.
    pub fn init_board(&mut self) -> RecorderResult<()> {
        self.send_command(BoardCommand::SendBoard)?;
        self.send_command(BoardCommand::UpdateNice)?;
        Ok(())
    }

    pub fn send_command(&mut self, command: BoardCommand) -> RecorderResult<()> {
        self.record(false, &[command.code()])?;
        Ok(self.driver.send_command(command)?)
    }

    /// Returns `false` when the clock has not acknowledged the previous command.
    pub fn send_clock_message(&mut self, command: &ClockCommand) -> RecorderResult<bool> {
        if !self.driver.is_ready_for_clock_message() {
            return Ok(false);
        }
        self.record(false, &command.to_bytes())?;
        Ok(self.driver.send_clock_message(command)?)
    }

    fn record(&mut self, is_input: bool, bytes: &[u8]) -> RecorderResult<()> {
        if let Some(capture) = self.capture.as_mut() {
            capture.record(is_input, bytes)?;
        }
        Ok(())
    }

    /// Read `reader` to the end in chunks, then flush the unfinished game.
    /// Returns every file written.
    pub fn run<R: Read>(&mut self, mut reader: R) -> RecorderResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        let mut chunk = vec![0u8; self.config.chunk_size.max(1)];
        loop {
            let read = reader.read(&mut chunk)?;
            if read == 0 {
                break;
            }
            written.extend(self.got_bytes(&chunk[..read])?);
        }
        written.extend(self.finish()?);
        Ok(written)
    }

    /// Feed bytes from the board. Returns the files of games finished by them.
    pub fn got_bytes(&mut self, bytes: &[u8]) -> RecorderResult<Vec<PathBuf>> {
        self.record(true, bytes)?;
        let mut written = Vec::new();
        for message in self.driver.got_bytes(bytes) {
            let before = self.confirmed_setup();
            for game in self.handle_message(&message) {
                written.extend(self.write_game(&game)?);
            }
            let changed = before != self.confirmed_setup()
                || matches!(message, DgtMessage::ClockTime(_));
            if changed && tracing::enabled!(Level::DEBUG) {
                if let Some(progress) = self.progress() {
                    debug!("\n{progress}");
                }
            }
        }
        Ok(written)
    }

    fn confirmed_setup(&self) -> Option<Setup> {
        self.parser.current_position().map(Position::setup)
    }

    /// Board, move list and clocks of the game in progress.
    pub fn progress(&self) -> Option<String> {
        let position = self.parser.current_position()?;
        let game = self.parser.current_game(GameResult::Unknown);

        let mut out = render_position(position);
        for (number, pair) in game.san_moves().chunks(2).enumerate() {
            let black = pair.get(1).copied().unwrap_or_default();
            let line = format!("{:3}. {:7} {}", number + 1, pair[0], black);
            out.push_str(line.trim_end());
            out.push('\n');
        }
        if let Some(clock) = self.clock {
            let clock = if self.parser.is_rotated() { clock.rotated() } else { clock };
            let _ = writeln!(
                out,
                "white {}  black {}",
                clock.left_time_string(),
                clock.right_time_string()
            );
        }
        Some(out)
    }

    /// Flush the game in progress with an unknown result.
    pub fn finish(&mut self) -> RecorderResult<Option<PathBuf>> {
        match self.parser.end_game() {
            Some(game) => self.write_game(&game),
            None => Ok(None),
        }
    }

    fn handle_message(&mut self, message: &DgtMessage) -> Vec<Game> {
        match message {
            DgtMessage::BoardDump(_) | DgtMessage::FieldUpdate(_) | DgtMessage::ClockTime(_) => {
                if let DgtMessage::ClockTime(clock) = message {
                    self.clock = Some(*clock);
                }
                match self.parser.got_message(message) {
                    Ok(finished) => finished.into_iter().collect(),
                    Err(err) => {
                        warn!(%err, "board update not applied");
                        Vec::new()
                    }
                }
            }
            DgtMessage::EeMoves(log) => {
                let games = replay_ee_events(&log.events);
                info!(events = log.len(), games = games.len(), "EEPROM log replayed");
                games
            }
            DgtMessage::ClockAck(ack) => {
                debug!(ack0 = ack.ack0, ack1 = ack.ack1, "clock ack");
                Vec::new()
            }
            DgtMessage::Version(version) => {
                info!(%version, "board version");
                Vec::new()
            }
            DgtMessage::Trademark(text)
            | DgtMessage::SerialNumber(text)
            | DgtMessage::LongSerialNumber(text) => {
                info!(%text, "board info");
                Vec::new()
            }
            DgtMessage::BusAddress(address) => {
                info!(address, "bus address");
                Vec::new()
            }
        }
    }

    fn write_game(&mut self, game: &Game) -> RecorderResult<Option<PathBuf>> {
        if game.is_empty() {
            debug!(result = game.result.as_pgn(), "skipping game without moves");
            return Ok(None);
        }

        self.games_written += 1;
        let path = PathBuf::from(format!(
            "{}-{}.pgn",
            self.config.output_prefix, self.games_written
        ));
        let mut writer = BufWriter::new(File::create(&path)?);
        writer.write_all(
            write_pgn(game, &default_headers(game), self.config.include_clock).as_bytes(),
        )?;
        writer.flush()?;
        info!(path = %path.display(), plies = game.len(), result = game.result.as_pgn(), "game written");
        Ok(Some(path))
    }

    pub fn parser(&self) -> &MoveParser {
        &self.parser
    }

    pub fn driver(&self) -> &DgtDriver<W> {
        &self.driver
    }

    pub fn games_written(&self) -> usize {
        self.games_written
    }
}
