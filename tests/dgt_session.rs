//! Byte-level recording sessions, from raw board output to PGN files.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use dgt_pgn::capture::DebugCapture;
use dgt_pgn::game_state::chess_types::*;
use dgt_pgn::protocol::clock_commands::ClockCommand;
use dgt_pgn::protocol::dgt_constants::*;
use dgt_pgn::protocol::messages::BoardDump;
use dgt_pgn::recorder::{Recorder, RecorderConfig};
use dgt_pgn::utils::algebraic::algebraic_to_square;

fn frame(id: u8, payload: &[u8]) -> Vec<u8> {
    let len = payload.len() + 3;
    let mut bytes = vec![id | 0x80, (len >> 7) as u8, (len & 0x7f) as u8];
    bytes.extend_from_slice(payload);
    bytes
}

fn code(name: &str) -> u8 {
    square_to_dgt_code(algebraic_to_square(name).expect("valid square"))
}

fn lift(name: &str) -> Vec<u8> {
    frame(DGT_FIELD_UPDATE, &[code(name), PieceCode::Empty.to_dgt()])
}

fn place(name: &str, color: Color, role: Role) -> Vec<u8> {
    let piece = PieceCode::Piece(Piece::new(color, role));
    frame(DGT_FIELD_UPDATE, &[code(name), piece.to_dgt()])
}

/// Right 0:05:00, left 0:04:55, running.
fn clock_report() -> Vec<u8> {
    frame(DGT_BWTIME, &[0x00, 0x05, 0x00, 0x00, 0x04, 0x55, 0x01])
}

fn clock_ack() -> Vec<u8> {
    frame(DGT_BWTIME, &[0x0a, 0x00, 0x0b, 0x00, 0x00, 0x00, 0x00])
}

fn session_bytes() -> Vec<u8> {
    use Color::{Black, White};

    let mut bytes = Vec::new();
    bytes.extend(frame(DGT_VERSION, &[1, 9]));
    bytes.extend(frame(DGT_BOARD_DUMP, &BoardDump::from_position(&Position::new()).to_payload()));
    bytes.extend(lift("e2"));
    bytes.extend(place("e4", White, Role::Pawn));
    bytes.extend(clock_report());
    bytes.extend(lift("e7"));
    bytes.extend(place("e5", Black, Role::Pawn));
    bytes.extend(lift("g1"));
    bytes.extend(place("f3", White, Role::Knight));
    // Kings to e4 and d5: white wins.
    bytes.extend(lift("e1"));
    bytes.extend(lift("e8"));
    bytes.extend(place("e4", White, Role::King));
    bytes.extend(place("d5", Black, Role::King));
    bytes
}

fn output_prefix(test: &str) -> String {
    std::env::temp_dir()
        .join(format!("dgt_pgn-{}-{}", test, std::process::id()))
        .to_string_lossy()
        .into_owned()
}

fn cleanup(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

const EXPECTED_PGN: &str = "[White \"White\"]\n[Black \"Black\"]\n[Result \"1-0\"]\n\n\
                            1. e4 {[%clk 0:04:55]} e5\n2. Nf3 1-0\n";

#[test]
fn session_records_game_ended_by_signal() {
    let prefix = output_prefix("signal");
    let mut recorder = Recorder::new(
        RecorderConfig {
            output_prefix: prefix.clone(),
            ..RecorderConfig::default()
        },
        Vec::new(),
    );
    recorder.init_board().expect("commands written");
    assert_eq!(
        recorder.driver().writer(),
        &vec![BoardCommand::SendBoard.code(), BoardCommand::UpdateNice.code()]
    );

    let written = recorder.run(session_bytes().as_slice()).expect("session recorded");
    assert_eq!(written, vec![PathBuf::from(format!("{prefix}-1.pgn"))]);
    assert_eq!(recorder.games_written(), 1);
    assert!(!recorder.parser().seen_initial_position());

    let pgn = fs::read_to_string(&written[0]).expect("pgn readable");
    cleanup(&written);
    assert_eq!(pgn, EXPECTED_PGN);
}

#[test]
fn byte_by_byte_feeding_gives_the_same_game() {
    let prefix = output_prefix("bytewise");
    let mut recorder = Recorder::new(
        RecorderConfig {
            output_prefix: prefix,
            include_clock: true,
            chunk_size: 1,
        },
        Vec::new(),
    );

    let written = recorder.run(session_bytes().as_slice()).expect("session recorded");
    assert_eq!(written.len(), 1);
    let pgn = fs::read_to_string(&written[0]).expect("pgn readable");
    cleanup(&written);
    assert_eq!(pgn, EXPECTED_PGN);
}

#[test]
fn unfinished_game_is_flushed_at_end_of_stream() {
    let prefix = output_prefix("flush");
    let mut recorder = Recorder::new(
        RecorderConfig {
            output_prefix: prefix,
            include_clock: false,
            chunk_size: 7,
        },
        Vec::new(),
    );

    let mut bytes = vec![0x13, 0x00, 0x05]; // line noise before the first frame
    bytes.extend(frame(DGT_BOARD_DUMP, &BoardDump::from_position(&Position::new()).to_payload()));
    bytes.extend(lift("d2"));
    bytes.extend(place("d4", Color::White, Role::Pawn));
    bytes.extend(clock_report());

    let written = recorder.run(bytes.as_slice()).expect("session recorded");
    assert_eq!(written.len(), 1);
    let pgn = fs::read_to_string(&written[0]).expect("pgn readable");
    cleanup(&written);
    assert_eq!(pgn, "[White \"White\"]\n[Black \"Black\"]\n[Result \"*\"]\n\n1. d4 *\n");
}

#[test]
fn board_left_in_start_position_writes_nothing() {
    let mut recorder = Recorder::new(
        RecorderConfig {
            output_prefix: output_prefix("empty"),
            ..RecorderConfig::default()
        },
        Vec::new(),
    );
    let bytes = frame(DGT_BOARD_DUMP, &BoardDump::from_position(&Position::new()).to_payload());
    let written = recorder.run(bytes.as_slice()).expect("session recorded");
    assert!(written.is_empty());
    assert_eq!(recorder.games_written(), 0);
}

#[test]
fn clock_commands_wait_for_acknowledgement() {
    let mut recorder = Recorder::new(RecorderConfig::default(), Vec::new());
    let beep = ClockCommand::Beep { duration: 4 };
    let set_and_run = ClockCommand::SetAndRun {
        left: Duration::from_secs(300),
        left_counts_up: false,
        right: Duration::from_secs(300),
        right_counts_up: false,
        pause: false,
        toggle_on_lever: true,
    };

    assert!(recorder.send_clock_message(&beep).expect("written"));
    assert!(!recorder.driver().is_ready_for_clock_message());
    assert!(!recorder.send_clock_message(&set_and_run).expect("no write"));
    assert_eq!(recorder.driver().writer(), &beep.to_bytes());

    // A time report is not an acknowledgement.
    recorder.got_bytes(&clock_report()).expect("no game finished");
    assert!(!recorder.driver().is_ready_for_clock_message());

    recorder.got_bytes(&clock_ack()).expect("no game finished");
    assert!(recorder.driver().is_ready_for_clock_message());
    assert!(recorder.send_clock_message(&set_and_run).expect("written"));

    let mut expected = beep.to_bytes();
    expected.extend(set_and_run.to_bytes());
    assert_eq!(recorder.driver().writer(), &expected);
}

#[test]
fn progress_shows_board_moves_and_clock() {
    let mut recorder = Recorder::new(RecorderConfig::default(), Vec::new());
    assert_eq!(recorder.progress(), None);

    let mut bytes = frame(DGT_BOARD_DUMP, &BoardDump::from_position(&Position::new()).to_payload());
    bytes.extend(lift("e2"));
    bytes.extend(place("e4", Color::White, Role::Pawn));
    bytes.extend(clock_report());
    bytes.extend(lift("e7"));
    bytes.extend(place("e5", Color::Black, Role::Pawn));
    bytes.extend(lift("g1"));
    bytes.extend(place("f3", Color::White, Role::Knight));
    recorder.got_bytes(&bytes).expect("no game finished");

    let progress = recorder.progress().expect("game in progress");
    let lines: Vec<&str> = progress.lines().collect();
    assert_eq!(lines.len(), 8 + 2 + 1);
    assert_eq!(lines[0], "r n b q k b n r");
    assert_eq!(lines[4], ". . . . P . . .");
    assert_eq!(lines[5], ". . . . . N . .");
    assert_eq!(lines[8], "  1. e4      e5");
    assert_eq!(lines[9], "  2. Nf3");
    assert_eq!(lines[10], "white 0:04:55  black 0:05:00");
}

#[test]
fn capture_records_both_directions() {
    let prefix = output_prefix("capture");
    let capture = DebugCapture::create(&prefix).expect("capture file created");
    let mut recorder = Recorder::new(
        RecorderConfig {
            output_prefix: prefix.clone(),
            ..RecorderConfig::default()
        },
        Vec::new(),
    )
    .with_capture(capture);

    recorder.init_board().expect("commands written");
    let report = clock_report();
    recorder.got_bytes(&report).expect("no game finished");
    let beep = ClockCommand::Beep { duration: 4 };
    assert!(recorder.send_clock_message(&beep).expect("written"));
    // Not acknowledged yet: nothing sent, nothing captured.
    assert!(!recorder.send_clock_message(&beep).expect("no write"));
    drop(recorder);

    let path = DebugCapture::path_for(&prefix);
    let text = fs::read_to_string(&path).expect("capture readable");
    cleanup(&[path]);

    let lines: Vec<Vec<&str>> = text.lines().map(|line| line.split(' ').collect()).collect();
    let directions: Vec<&str> = lines.iter().map(|fields| fields[1]).collect();
    assert_eq!(directions, vec![">", ">", "<", ">"]);
    assert_eq!(lines[0][2], "Qg=="); // SendBoard, 0x42
    assert_eq!(lines[1][2], "Sw=="); // UpdateNice, 0x4b
    assert_eq!(lines[2][2], "jQAKAAUAAARVAQ==");
    assert!(lines.iter().all(|fields| fields[0].parse::<u128>().is_ok()));
}
