//! PGN export of game records.
//!
//! Headers follow the seven-tag roster order, with `SetUp`/`FEN` added when
//! the game did not start from the standard position. Movetext uses the SAN
//! stored in each record entry and is wrapped at 80 columns.

use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::Color;
use crate::store::game_record::GameRecord;

pub const PGN_EVENT: &str = "issue_chess game";
const LINE_WIDTH: usize = 80;

pub fn write_pgn(record: &GameRecord, site: &str) -> String {
    let result = record.result_token();
    let mut headers: Vec<(&str, String)> = vec![
        ("Event", PGN_EVENT.to_owned()),
        ("Site", site.to_owned()),
        ("Date", record.started_at.format("%Y.%m.%d").to_string()),
        ("Round", record.id.to_string()),
        ("White", record.player_of(Color::Light).unwrap_or("?").to_owned()),
        ("Black", record.player_of(Color::Dark).unwrap_or("?").to_owned()),
        ("Result", result.to_owned()),
    ];
    let initial_fen = record.initial.to_fen();
    if initial_fen != STARTING_POSITION_FEN {
        headers.push(("SetUp", "1".to_owned()));
        headers.push(("FEN", initial_fen));
    }

    let mut out = String::new();
    for (key, value) in &headers {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape_pgn_value(value)));
    }
    out.push('\n');

    let mut tokens = Vec::with_capacity(record.entries.len() * 3 / 2 + 1);
    let mut number = record.initial.fullmove_number();
    for (ply, entry) in record.entries.iter().enumerate() {
        match entry.color {
            Color::Light => tokens.push(format!("{number}.")),
            Color::Dark if ply == 0 => tokens.push(format!("{number}...")),
            Color::Dark => {}
        }
        tokens.push(entry.san.clone());
        if entry.color == Color::Dark {
            number += 1;
        }
    }
    tokens.push(result.to_owned());

    out.push_str(&wrap_tokens(&tokens, LINE_WIDTH));
    out.push('\n');
    out
}

fn wrap_tokens(tokens: &[String], width: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for token in tokens {
        if line_len > 0 && line_len + 1 + token.len() > width {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(token);
        line_len += token.len();
    }
    out
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::position::Position;
    use crate::move_generation::legal_move_apply::apply;
    use crate::notation::move_parser::{parse, ParsedInput};
    use crate::store::game_state_store::{GameStateStore, Ply};

    fn play(store: &mut GameStateStore, moves: &[(&str, &str)]) {
        for (mover, text) in moves {
            let position = store.current().clone();
            let ParsedInput::Move(mv) = parse(text, &position).expect("legal") else {
                panic!("expected a move");
            };
            store
                .commit_turn(&[Ply::new(*mover, mv, apply(&position, &mv))])
                .expect("legal");
        }
    }

    #[test]
    fn finished_game_exports_headers_and_result() {
        let mut store = GameStateStore::new();
        play(
            &mut store,
            &[("alice", "f2f3"), ("AI", "e7e5"), ("alice", "g2g4"), ("AI", "d8h4")],
        );
        let pgn = write_pgn(store.current_record(), "local");

        let expected_date = store.current_record().started_at.format("%Y.%m.%d").to_string();
        assert!(pgn.starts_with("[Event \"issue_chess game\"]\n[Site \"local\"]\n"));
        assert!(pgn.contains(&format!("[Date \"{expected_date}\"]")));
        assert!(pgn.contains("[Round \"1\"]"));
        assert!(pgn.contains("[White \"alice\"]\n[Black \"AI\"]\n[Result \"0-1\"]"));
        assert!(!pgn.contains("SetUp"));
        assert!(pgn.ends_with("\n\n1. f3 e5 2. g4 Qh4# 0-1\n"));
    }

    #[test]
    fn custom_start_with_black_to_move() {
        let initial = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").expect("FEN");
        let mut store = GameStateStore::with_initial(initial);
        play(&mut store, &[("AI", "Kd7"), ("bob", "e4")]);
        let pgn = write_pgn(store.current_record(), "local");

        assert!(pgn.contains("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 12\"]"));
        assert!(pgn.contains("[Result \"*\"]"));
        assert!(pgn.ends_with("12... Kd7 13. e4 *\n"));
    }

    #[test]
    fn long_movetext_wraps() {
        let tokens: Vec<String> = (0..40).map(|i| format!("tok{i:02}")).collect();
        let wrapped = wrap_tokens(&tokens, 20);
        assert!(wrapped.lines().all(|line| line.len() <= 20));
        assert_eq!(wrapped.split_whitespace().count(), 40);
    }

    #[test]
    fn header_values_are_escaped() {
        assert_eq!(escape_pgn_value(r#"a "quoted" \ name"#), r#"a \"quoted\" \\ name"#);
    }
}
