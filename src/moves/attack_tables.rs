//! Precomputed attack tables.
//!
//! Leaper attacks (knight, king, pawn) are produced by ray-casting a single
//! step per delta. Sliding attacks use magic multiplication: for every square
//! a relevant-occupancy mask and a 64-bit factor hash the blockers into a
//! per-square slice of one shared table. Factors are searched once from a
//! fixed seed and every enumerated blocker subset is verified, so a wrong
//! factor surfaces as `ChessError::MagicCollision` during initialisation and
//! never at lookup time.
//!
//! The tables are built once per process behind a `OnceLock` and are
//! read-only afterwards.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::*;
use crate::moves::bitboard::{contains, FILES, RANKS};

const KNIGHT_DELTAS: [i32; 8] = [17, 15, 10, 6, -17, -15, -10, -6];
const BISHOP_DELTAS: [i32; 4] = [7, -7, 9, -9];
const ROOK_DELTAS: [i32; 4] = [1, -1, 8, -8];
const KING_DELTAS: [i32; 8] = [1, 7, 8, 9, -1, -7, -8, -9];
const WHITE_PAWN_DELTAS: [i32; 2] = [7, 9];
const BLACK_PAWN_DELTAS: [i32; 2] = [-7, -9];

const ROOK_SHIFT: u32 = 12;
const BISHOP_SHIFT: u32 = 9;
const ROOK_TABLE_SIZE: usize = 64 << ROOK_SHIFT;
const BISHOP_TABLE_SIZE: usize = 64 << BISHOP_SHIFT;

const MAGIC_SEED: u64 = 0x0D67_7A11_CE55_B0A4;
const MAX_MAGIC_ATTEMPTS: u32 = 10_000_000;

/// Magic hashing parameters for one square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Magic {
    pub factor: u64,
    pub mask: u64,
    pub offset: usize,
}

#[derive(Debug)]
pub struct AttackTables {
    knight: [u64; 64],
    king: [u64; 64],
    pawn: [[u64; 64]; 2],
    rook_magics: [Magic; 64],
    bishop_magics: [Magic; 64],
    attacks: Vec<u64>,
    between: Vec<[u64; 64]>,
    rays: Vec<[u64; 64]>,
}

static ATTACK_TABLES: OnceLock<AttackTables> = OnceLock::new();

/// Shared tables, built on first use.
///
/// A build failure means a broken magic configuration; there is nothing to
/// fall back to, so the process aborts.
pub fn attack_tables() -> &'static AttackTables {
    ATTACK_TABLES.get_or_init(|| match AttackTables::build() {
        Ok(tables) => tables,
        Err(err) => panic!("attack table initialisation failed: {err}"),
    })
}

impl AttackTables {
    pub fn build() -> ChessResult<Self> {
        let mut rng = StdRng::seed_from_u64(MAGIC_SEED);
        let mut tables = AttackTables {
            knight: [0; 64],
            king: [0; 64],
            pawn: [[0; 64]; 2],
            rook_magics: [Magic::default(); 64],
            bishop_magics: [Magic::default(); 64],
            attacks: vec![0; ROOK_TABLE_SIZE + BISHOP_TABLE_SIZE],
            between: vec![[0; 64]; 64],
            rays: vec![[0; 64]; 64],
        };

        for sq in 0..64u8 {
            let idx = sq as usize;
            tables.knight[idx] = sliding_attacks(sq, u64::MAX, &KNIGHT_DELTAS);
            tables.king[idx] = sliding_attacks(sq, u64::MAX, &KING_DELTAS);
            tables.pawn[Color::White.index()][idx] =
                sliding_attacks(sq, u64::MAX, &WHITE_PAWN_DELTAS);
            tables.pawn[Color::Black.index()][idx] =
                sliding_attacks(sq, u64::MAX, &BLACK_PAWN_DELTAS);

            let rook = find_magic(sq, &ROOK_DELTAS, ROOK_SHIFT, idx << ROOK_SHIFT, &mut rng)?;
            init_magic(&mut tables.attacks, sq, rook, ROOK_SHIFT, &ROOK_DELTAS)?;
            tables.rook_magics[idx] = rook;

            let bishop_offset = ROOK_TABLE_SIZE + (idx << BISHOP_SHIFT);
            let bishop = find_magic(sq, &BISHOP_DELTAS, BISHOP_SHIFT, bishop_offset, &mut rng)?;
            init_magic(&mut tables.attacks, sq, bishop, BISHOP_SHIFT, &BISHOP_DELTAS)?;
            tables.bishop_magics[idx] = bishop;
        }

        tables.init_lines();
        Ok(tables)
    }

    fn init_lines(&mut self) {
        let rook_empty: Vec<u64> = (0..64u8).map(|sq| sliding_attacks(sq, 0, &ROOK_DELTAS)).collect();
        let bishop_empty: Vec<u64> =
            (0..64u8).map(|sq| sliding_attacks(sq, 0, &BISHOP_DELTAS)).collect();

        for a in 0..64u8 {
            for b in 0..64u8 {
                let (ai, bi) = (a as usize, b as usize);
                let (deltas, empty): (&[i32], &[u64]) = if contains(rook_empty[ai], b) {
                    (&ROOK_DELTAS, &rook_empty)
                } else if contains(bishop_empty[ai], b) {
                    (&BISHOP_DELTAS, &bishop_empty)
                } else {
                    continue;
                };
                self.between[ai][bi] =
                    sliding_attacks(a, 1u64 << b, deltas) & sliding_attacks(b, 1u64 << a, deltas);
                self.rays[ai][bi] = (1u64 << a) | (1u64 << b) | (empty[ai] & empty[bi]);
            }
        }
    }

    #[inline]
    pub fn knight_attacks(&self, square: Square) -> u64 {
        self.knight[square as usize]
    }

    #[inline]
    pub fn king_attacks(&self, square: Square) -> u64 {
        self.king[square as usize]
    }

    /// Squares attacked by a pawn of `color` standing on `square`.
    #[inline]
    pub fn pawn_attacks(&self, color: Color, square: Square) -> u64 {
        self.pawn[color.index()][square as usize]
    }

    #[inline]
    pub fn rook_attacks(&self, square: Square, occupied: u64) -> u64 {
        let magic = &self.rook_magics[square as usize];
        self.attacks[magic.offset + magic_index(magic, occupied, ROOK_SHIFT)]
    }

    #[inline]
    pub fn bishop_attacks(&self, square: Square, occupied: u64) -> u64 {
        let magic = &self.bishop_magics[square as usize];
        self.attacks[magic.offset + magic_index(magic, occupied, BISHOP_SHIFT)]
    }

    #[inline]
    pub fn queen_attacks(&self, square: Square, occupied: u64) -> u64 {
        self.rook_attacks(square, occupied) ^ self.bishop_attacks(square, occupied)
    }

    /// Squares strictly between `a` and `b` when they share a line, else empty.
    #[inline]
    pub fn between(&self, a: Square, b: Square) -> u64 {
        self.between[a as usize][b as usize]
    }

    /// The full line through `a` and `b` when they share one, else empty.
    #[inline]
    pub fn ray(&self, a: Square, b: Square) -> u64 {
        self.rays[a as usize][b as usize]
    }

    #[inline]
    pub fn aligned(&self, a: Square, b: Square, c: Square) -> bool {
        contains(self.ray(a, b), c)
    }
}

#[inline]
fn magic_index(magic: &Magic, occupied: u64, shift: u32) -> usize {
    (magic.factor.wrapping_mul(occupied & magic.mask) >> (64 - shift)) as usize
}

/// Slow attack set generation. Used only to bootstrap the tables.
///
/// A step that lands more than two files/ranks away from the previous square
/// wrapped around a board edge and ends the ray.
pub fn sliding_attacks(square: Square, occupied: u64, deltas: &[i32]) -> u64 {
    let mut attacks = 0u64;
    for &delta in deltas {
        let mut sq = square as i32;
        loop {
            let prev = sq;
            sq += delta;
            if !(0..64).contains(&sq) || distance(sq as Square, prev as Square) > 2 {
                break;
            }
            attacks |= 1u64 << sq;
            if contains(occupied, sq as Square) {
                break;
            }
        }
    }
    attacks
}

fn relevant_mask(square: Square, deltas: &[i32]) -> u64 {
    let edges = ((RANKS[0] | RANKS[7]) & !RANKS[rank_of(square) as usize])
        | ((FILES[0] | FILES[7]) & !FILES[file_of(square) as usize]);
    sliding_attacks(square, 0, deltas) & !edges
}

fn find_magic(
    square: Square,
    deltas: &[i32],
    shift: u32,
    offset: usize,
    rng: &mut StdRng,
) -> ChessResult<Magic> {
    let mask = relevant_mask(square, deltas);

    // Carry-rippler enumeration of every blocker subset of the mask.
    let mut subsets = Vec::<(u64, u64)>::with_capacity(1 << shift);
    let mut subset = 0u64;
    loop {
        subsets.push((subset, sliding_attacks(square, subset, deltas)));
        subset = subset.wrapping_sub(mask) & mask;
        if subset == 0 {
            break;
        }
    }

    let size = 1usize << shift;
    let mut epoch = vec![0u32; size];
    let mut used = vec![0u64; size];

    for attempt in 1..=MAX_MAGIC_ATTEMPTS {
        let factor = rng.random::<u64>() & rng.random::<u64>() & rng.random::<u64>();
        if (mask.wrapping_mul(factor) >> 56).count_ones() < 6 {
            continue;
        }

        let candidate = Magic {
            factor,
            mask,
            offset,
        };
        let mut collision = false;
        for &(occupied, attack) in &subsets {
            let idx = magic_index(&candidate, occupied, shift);
            if epoch[idx] != attempt {
                epoch[idx] = attempt;
                used[idx] = attack;
            } else if used[idx] != attack {
                collision = true;
                break;
            }
        }

        if !collision {
            return Ok(candidate);
        }
    }

    Err(ChessError::MagicNotFound { square })
}

fn init_magic(
    attacks: &mut [u64],
    square: Square,
    magic: Magic,
    shift: u32,
    deltas: &[i32],
) -> ChessResult<()> {
    let mut subset = 0u64;
    loop {
        let attack = sliding_attacks(square, subset, deltas);
        let slot = magic.offset + magic_index(&magic, subset, shift);
        if attacks[slot] != 0 && attacks[slot] != attack {
            return Err(ChessError::MagicCollision { square });
        }
        attacks[slot] = attack;

        subset = subset.wrapping_sub(magic.mask) & magic.mask;
        if subset == 0 {
            break;
        }
    }
    Ok(())
}
