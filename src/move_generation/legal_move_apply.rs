use crate::game_state::chess_types::*;
use crate::game_state::position::Position;
use crate::moves::attack_tables::pawn_attacks;

/// Apply a move produced by the legal move generator and return the
/// resulting position. The input position is left untouched.
pub fn apply(position: &Position, mv: &Move) -> Position {
    let moving_color = position.side_to_move;
    let enemy_color = moving_color.opposite();

    let mut next = position.clone();

    next.remove(moving_color, mv.piece, mv.from);

    if mv.is_en_passant() {
        // The captured pawn sits behind the destination, on the mover's side.
        let capture_sq = match moving_color {
            Color::Light => mv.to - 8,
            Color::Dark => mv.to + 8,
        };
        next.remove(enemy_color, PieceKind::Pawn, capture_sq);
    } else if let Some(captured) = mv.captured {
        next.remove(enemy_color, captured, mv.to);
    }

    next.put(moving_color, mv.promotion.unwrap_or(mv.piece), mv.to);

    if mv.flags.contains(MoveFlags::CASTLE_KINGSIDE) {
        let rank = moving_color.home_rank();
        hop_rook(&mut next, moving_color, make_square(7, rank), make_square(5, rank));
    } else if mv.flags.contains(MoveFlags::CASTLE_QUEENSIDE) {
        let rank = moving_color.home_rank();
        hop_rook(&mut next, moving_color, make_square(0, rank), make_square(3, rank));
    }

    next.castling_rights &= !(rights_touched_by(mv.from) | rights_touched_by(mv.to));
    if mv.piece == PieceKind::King {
        next.castling_rights &= match moving_color {
            Color::Light => !(CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE),
            Color::Dark => !(CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE),
        };
    }

    // The target is only recorded when an enemy pawn stands ready to take.
    next.en_passant_square = mv
        .is_double_pawn_push()
        .then(|| (mv.from + mv.to) / 2)
        .filter(|&target| {
            pawn_attacks(moving_color, target) & next.pieces(enemy_color, PieceKind::Pawn) != 0
        });

    if mv.piece == PieceKind::Pawn || mv.is_capture() {
        next.halfmove_clock = 0;
    } else {
        next.halfmove_clock = next.halfmove_clock.saturating_add(1);
    }
    if moving_color == Color::Dark {
        next.fullmove_number = next.fullmove_number.saturating_add(1);
    }

    next.side_to_move = enemy_color;
    next.refresh_occupancy();
    next
}

fn hop_rook(position: &mut Position, color: Color, from: Square, to: Square) {
    position.remove(color, PieceKind::Rook, from);
    position.put(color, PieceKind::Rook, to);
}

/// Castling rights lost when anything moves from or to a corner (a rook
/// leaving home or being captured there) or a king's home square.
const fn rights_touched_by(square: Square) -> CastlingRights {
    match square {
        0 => CASTLE_LIGHT_QUEENSIDE,
        7 => CASTLE_LIGHT_KINGSIDE,
        4 => CASTLE_LIGHT_KINGSIDE | CASTLE_LIGHT_QUEENSIDE,
        56 => CASTLE_DARK_QUEENSIDE,
        63 => CASTLE_DARK_KINGSIDE,
        60 => CASTLE_DARK_KINGSIDE | CASTLE_DARK_QUEENSIDE,
        _ => 0,
    }
}
