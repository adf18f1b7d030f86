//! Immutable bitboard position.
//!
//! `Position` stores piece bitboards indexed `[color][piece_kind]` together
//! with occupancy caches, the side to move, castling rights, the en-passant
//! target and both clocks. Fields are crate-private; every transition (see
//! [`apply`](crate::move_generation::legal_move_apply::apply)) returns a new
//! value, so a `Position` handed out by the store can never change under a
//! reader.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::FenError;
use crate::game_state::chess_types::*;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) pieces: [[u64; 6]; 2],
    pub(crate) occupancy_by_color: [u64; 2],
    pub(crate) occupancy_all: u64,
    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: CastlingRights,
    pub(crate) en_passant_square: Option<Square>,
    pub(crate) halfmove_clock: u16,
    pub(crate) fullmove_number: u16,
}

impl Position {
    /// Empty board, Light to move, no rights. Only used while building a
    /// position from an encoding.
    pub(crate) fn empty() -> Self {
        Self {
            pieces: [[0; 6]; 2],
            occupancy_by_color: [0; 2],
            occupancy_all: 0,
            side_to_move: Color::Light,
            castling_rights: 0,
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard initial position.
    pub fn new_game() -> Self {
        let mut position = Self::empty();
        let back_rank = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, kind) in back_rank.into_iter().enumerate() {
            let file = file as u8;
            position.put(Color::Light, kind, make_square(file, 0));
            position.put(Color::Light, PieceKind::Pawn, make_square(file, 1));
            position.put(Color::Dark, PieceKind::Pawn, make_square(file, 6));
            position.put(Color::Dark, kind, make_square(file, 7));
        }
        position.castling_rights = CASTLE_ALL;
        position.refresh_occupancy();
        position
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        parse_fen(fen)
    }

    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    #[inline]
    pub fn has_castling_right(&self, right: CastlingRights) -> bool {
        self.castling_rights & right != 0
    }

    #[inline]
    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u16 {
        self.fullmove_number
    }

    /// Bitboard of one color's pieces of one kind.
    #[inline]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> u64 {
        self.pieces[color.index()][kind.index()]
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> u64 {
        self.occupancy_by_color[color.index()]
    }

    #[inline]
    pub fn occupancy_all(&self) -> u64 {
        self.occupancy_all
    }

    pub fn piece_at(&self, square: Square) -> Option<(Color, PieceKind)> {
        let bit = square_bit(square);
        if self.occupancy_all & bit == 0 {
            return None;
        }
        let color = if self.occupancy_by_color[Color::Light.index()] & bit != 0 {
            Color::Light
        } else {
            Color::Dark
        };
        PieceKind::ALL
            .into_iter()
            .find(|kind| self.pieces[color.index()][kind.index()] & bit != 0)
            .map(|kind| (color, kind))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.pieces(color, PieceKind::King);
        (kings != 0).then(|| kings.trailing_zeros() as Square)
    }

    /// Total material of one side using conventional piece values.
    pub fn material(&self, color: Color) -> i32 {
        PieceKind::ALL
            .into_iter()
            .map(|kind| self.pieces(color, kind).count_ones() as i32 * kind.value())
            .sum()
    }

    #[inline]
    pub(crate) fn put(&mut self, color: Color, kind: PieceKind, square: Square) {
        self.pieces[color.index()][kind.index()] |= square_bit(square);
    }

    #[inline]
    pub(crate) fn remove(&mut self, color: Color, kind: PieceKind, square: Square) {
        self.pieces[color.index()][kind.index()] &= !square_bit(square);
    }

    pub(crate) fn refresh_occupancy(&mut self) {
        for color in Color::BOTH {
            self.occupancy_by_color[color.index()] =
                self.pieces[color.index()].iter().fold(0u64, |acc, bb| acc | bb);
        }
        self.occupancy_all = self.occupancy_by_color[0] | self.occupancy_by_color[1];
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new_game()
    }
}

impl std::str::FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fen(s)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&generate_fen(self))
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&generate_fen(self))
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fen = String::deserialize(deserializer)?;
        parse_fen(&fen).map_err(serde::de::Error::custom)
    }
}
