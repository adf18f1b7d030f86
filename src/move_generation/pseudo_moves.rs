//! Pseudo-legal move generation.
//!
//! Moves are generated per piece kind in a fixed order (pawns, knights,
//! bishops, rooks, queens, king) without testing whether the mover's own
//! king is left in check. Castling is the exception: its attacked-square
//! conditions are checked here because they are not captured by the
//! post-move king test.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::moves::attack_tables::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};

pub fn generate_pseudo_moves(position: &Position, out: &mut Vec<Move>) {
    generate_pawn_moves(position, out);
    for kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        generate_piece_moves(position, kind, out);
    }
    generate_castling_moves(position, out);
}

fn piece_targets(kind: PieceKind, from: Square, occupancy: u64) -> u64 {
    match kind {
        PieceKind::Knight => knight_attacks(from),
        PieceKind::Bishop => bishop_attacks(from, occupancy),
        PieceKind::Rook => rook_attacks(from, occupancy),
        PieceKind::Queen => queen_attacks(from, occupancy),
        PieceKind::King => king_attacks(from),
        PieceKind::Pawn => 0,
    }
}

fn generate_piece_moves(position: &Position, kind: PieceKind, out: &mut Vec<Move>) {
    let side = position.side_to_move();
    let own = position.occupancy(side);

    for from in squares_of(position.pieces(side, kind)) {
        for to in squares_of(piece_targets(kind, from, position.occupancy_all()) & !own) {
            out.push(with_capture(position, Move::quiet(from, to, kind)));
        }
    }
}

fn with_capture(position: &Position, mut mv: Move) -> Move {
    if let Some((_, captured)) = position.piece_at(mv.to) {
        mv.captured = Some(captured);
        mv.flags = mv.flags.with(MoveFlags::CAPTURE);
    }
    mv
}

fn push_pawn_move(mv: Move, side: Color, out: &mut Vec<Move>) {
    if square_rank(mv.to) == side.promotion_rank() {
        for promo in PieceKind::PROMOTIONS {
            out.push(Move {
                promotion: Some(promo),
                ..mv
            });
        }
    } else {
        out.push(mv);
    }
}

fn generate_pawn_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move();
    let enemy_occ = position.occupancy(side.opposite());
    let empty = !position.occupancy_all();
    let start_rank = match side {
        Color::Light => 1,
        Color::Dark => 6,
    };

    for from in squares_of(position.pieces(side, PieceKind::Pawn)) {
        let one_step = match side {
            Color::Light => from + 8,
            Color::Dark => from - 8,
        };

        if square_bit(one_step) & empty != 0 {
            push_pawn_move(Move::quiet(from, one_step, PieceKind::Pawn), side, out);

            if square_rank(from) == start_rank {
                let two_step = match side {
                    Color::Light => from + 16,
                    Color::Dark => from - 16,
                };
                if square_bit(two_step) & empty != 0 {
                    out.push(Move {
                        flags: MoveFlags::DOUBLE_PAWN_PUSH,
                        ..Move::quiet(from, two_step, PieceKind::Pawn)
                    });
                }
            }
        }

        let attacks = pawn_attacks(side, from);
        for to in squares_of(attacks & enemy_occ) {
            push_pawn_move(with_capture(position, Move::quiet(from, to, PieceKind::Pawn)), side, out);
        }

        if let Some(target) = position.en_passant_square() {
            if attacks & square_bit(target) != 0 {
                out.push(Move {
                    captured: Some(PieceKind::Pawn),
                    flags: MoveFlags::CAPTURE.with(MoveFlags::EN_PASSANT),
                    ..Move::quiet(from, target, PieceKind::Pawn)
                });
            }
        }
    }
}

fn generate_castling_moves(position: &Position, out: &mut Vec<Move>) {
    let side = position.side_to_move();
    let enemy = side.opposite();
    let rank = side.home_rank();
    let king_from = make_square(4, rank);

    if position.king_square(side) != Some(king_from) {
        return;
    }
    // Cannot castle out of check.
    if is_square_attacked(position, king_from, enemy) {
        return;
    }

    let (kingside, queenside) = match side {
        Color::Light => (CASTLE_LIGHT_KINGSIDE, CASTLE_LIGHT_QUEENSIDE),
        Color::Dark => (CASTLE_DARK_KINGSIDE, CASTLE_DARK_QUEENSIDE),
    };
    let own_rook = |file| position.pieces(side, PieceKind::Rook) & square_bit(make_square(file, rank)) != 0;
    let empty = |files: &[u8]| {
        files
            .iter()
            .all(|&file| position.occupancy_all() & square_bit(make_square(file, rank)) == 0)
    };
    let safe = |files: &[u8]| {
        files
            .iter()
            .all(|&file| !is_square_attacked(position, make_square(file, rank), enemy))
    };

    if position.has_castling_right(kingside) && own_rook(7) && empty(&[5, 6]) && safe(&[5, 6]) {
        out.push(Move {
            flags: MoveFlags::CASTLE_KINGSIDE,
            ..Move::quiet(king_from, make_square(6, rank), PieceKind::King)
        });
    }
    if position.has_castling_right(queenside) && own_rook(0) && empty(&[1, 2, 3]) && safe(&[3, 2]) {
        out.push(Move {
            flags: MoveFlags::CASTLE_QUEENSIDE,
            ..Move::quiet(king_from, make_square(2, rank), PieceKind::King)
        });
    }
}
