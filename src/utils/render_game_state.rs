//! Terminal-oriented Unicode board renderer.

use crate::game_state::chess_types::*;
use crate::game_state::position::Position;

/// Render the board as text, seen from `perspective`'s side of the table.
pub fn render_position(position: &Position, perspective: Color) -> String {
    let (ranks, files): (Vec<u8>, Vec<u8>) = match perspective {
        Color::Light => ((0..8).rev().collect(), (0..8).collect()),
        Color::Dark => ((0..8).collect(), (0..8).rev().collect()),
    };
    let file_labels: String = files
        .iter()
        .map(|&file| char::from(b'a' + file).to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut out = format!("  {file_labels}\n");
    for &rank in &ranks {
        let rank_label = char::from(b'1' + rank);
        out.push(rank_label);
        out.push(' ');
        let row: Vec<String> = files
            .iter()
            .map(|&file| {
                position
                    .piece_at(make_square(file, rank))
                    .map_or('·', |(color, kind)| piece_to_unicode(color, kind))
                    .to_string()
            })
            .collect();
        out.push_str(&row.join(" "));
        out.push(' ');
        out.push(rank_label);
        out.push('\n');
    }
    out.push_str(&format!("  {file_labels}"));
    out
}

fn piece_to_unicode(color: Color, piece: PieceKind) -> char {
    match (color, piece) {
        (Color::Light, PieceKind::Pawn) => '♙',
        (Color::Light, PieceKind::Knight) => '♘',
        (Color::Light, PieceKind::Bishop) => '♗',
        (Color::Light, PieceKind::Rook) => '♖',
        (Color::Light, PieceKind::Queen) => '♕',
        (Color::Light, PieceKind::King) => '♔',
        (Color::Dark, PieceKind::Pawn) => '♟',
        (Color::Dark, PieceKind::Knight) => '♞',
        (Color::Dark, PieceKind::Bishop) => '♝',
        (Color::Dark, PieceKind::Rook) => '♜',
        (Color::Dark, PieceKind::Queen) => '♛',
        (Color::Dark, PieceKind::King) => '♚',
    }
}
