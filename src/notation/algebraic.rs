//! Square name conversions (`e4` <-> square index).
//!
//! Parsing is case-insensitive on the file letter so that human input such
//! as `E4` reads the same as `e4`; output is always lowercase.

use crate::game_state::chess_types::{make_square, square_file, square_rank, Square};

/// Convert a square name (for example: "e4") to a square index.
#[inline]
pub fn algebraic_to_square(name: &str) -> Option<Square> {
    let bytes = name.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let file = file_from_char(char::from(bytes[0]))?;
    let rank = rank_from_char(char::from(bytes[1]))?;
    Some(make_square(file, rank))
}

/// Convert a square index (`0..=63`) to its lowercase name.
#[inline]
pub fn square_name(square: Square) -> String {
    debug_assert!(square < 64, "square index out of bounds: {square}");
    let mut out = String::with_capacity(2);
    out.push(file_char(square_file(square)));
    out.push(char::from(b'1' + square_rank(square)));
    out
}

#[inline]
pub fn file_char(file: u8) -> char {
    char::from(b'a' + file)
}

/// File index for a file letter, case-insensitive.
#[inline]
pub fn file_from_char(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    ('a'..='h').contains(&c).then(|| c as u8 - b'a')
}

#[inline]
pub fn rank_from_char(c: char) -> Option<u8> {
    ('1'..='8').contains(&c).then(|| c as u8 - b'1')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_names_convert_both_ways() {
        assert_eq!(algebraic_to_square("a1"), Some(0));
        assert_eq!(algebraic_to_square("h8"), Some(63));
        assert_eq!(algebraic_to_square("E4"), Some(28));
        assert_eq!(square_name(0), "a1");
        assert_eq!(square_name(28), "e4");
        assert_eq!(square_name(63), "h8");
    }

    #[test]
    fn rejects_off_board_names() {
        assert_eq!(algebraic_to_square("i1"), None);
        assert_eq!(algebraic_to_square("a9"), None);
        assert_eq!(algebraic_to_square("a"), None);
        assert_eq!(algebraic_to_square("a10"), None);
    }
}
