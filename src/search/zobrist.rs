//! Zobrist keys for position identity and repetition detection.
//!
//! Keys are generated from a fixed seed so they are identical across runs
//! and across processes; the persisted archive never stores them, but logs
//! and tests can compare them. Clocks are not hashed: two
//! positions that differ only in their move counters repeat each other.

use std::sync::OnceLock;

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::moves::attack_tables::pawn_attacks;

struct ZobristTables {
    piece_square: [[[u64; 64]; 6]; 2],
    dark_to_move: u64,
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(|| {
        let mut rng = SplitMix64(0x9E37_79B9_7F4A_7C15);
        let mut piece_square = [[[0u64; 64]; 6]; 2];
        piece_square
            .iter_mut()
            .flatten()
            .flatten()
            .for_each(|key| *key = rng.next());
        let dark_to_move = rng.next();
        let castling = std::array::from_fn(|_| rng.next());
        let en_passant_file = std::array::from_fn(|_| rng.next());
        ZobristTables {
            piece_square,
            dark_to_move,
            castling,
            en_passant_file,
        }
    })
}

struct SplitMix64(u64);

impl SplitMix64 {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// Identity key of a position for repetition purposes.
///
/// The en-passant file only contributes when the side to move has a pawn
/// that could actually capture there, so a double push nobody can answer
/// does not make an otherwise identical position look new.
pub fn position_key(position: &Position) -> u64 {
    let tables = tables();
    let mut key = 0u64;

    for color in Color::BOTH {
        for kind in PieceKind::ALL {
            for sq in squares_of(position.pieces(color, kind)) {
                key ^= tables.piece_square[color.index()][kind.index()][sq as usize];
            }
        }
    }

    let side = position.side_to_move();
    if side == Color::Dark {
        key ^= tables.dark_to_move;
    }
    key ^= tables.castling[usize::from(position.castling_rights() & CASTLE_ALL)];

    if let Some(target) = position.en_passant_square() {
        // Pawns that attack the target are the ones standing where an enemy
        // pawn on the target would attack.
        let capturers = pawn_attacks(side.opposite(), target) & position.pieces(side, PieceKind::Pawn);
        if capturers != 0 {
            key ^= tables.en_passant_file[usize::from(square_file(target))];
        }
    }

    key
}
