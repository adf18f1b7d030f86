//! UCI client adapter: drives an external engine process for one position.
//!
//! Each request starts a fresh process, runs the `uci` handshake, applies
//! the configured options, sends the position as FEN and waits for
//! `bestmove`. Engine output is read on a separate thread and delivered over
//! a channel so the whole exchange can be bounded by a single deadline; the
//! process is killed when the deadline passes.

use std::io::{BufRead, BufReader, Write};
use std::process::{ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Instant;

use tracing::{debug, instrument};

use crate::engines::engine_trait::{DelegateEvaluator, SearchLimits};
use crate::errors::DelegateError;
use crate::game_state::position::Position;

#[derive(Debug, Clone)]
pub struct UciDelegate {
    program: String,
    args: Vec<String>,
    skill_level: u8,
    threads: u16,
    hash_mb: u32,
}

impl UciDelegate {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            skill_level: 20,
            threads: 2,
            hash_mb: 128,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_skill_level(mut self, skill_level: u8) -> Self {
        self.skill_level = skill_level;
        self
    }

    pub fn with_threads(mut self, threads: u16) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_hash_mb(mut self, hash_mb: u32) -> Self {
        self.hash_mb = hash_mb;
        self
    }

    fn options(&self) -> [(&'static str, String); 3] {
        [
            ("Skill Level", self.skill_level.to_string()),
            ("Threads", self.threads.to_string()),
            ("Hash", self.hash_mb.to_string()),
        ]
    }

    fn converse(
        &self,
        stdin: &mut ChildStdin,
        lines: &Receiver<String>,
        position: &Position,
        limits: &SearchLimits,
    ) -> Result<String, DelegateError> {
        let deadline = Instant::now() + limits.timeout;
        let expect = |predicate: &dyn Fn(&str) -> bool| {
            wait_for_line(lines, deadline, limits, predicate)
        };

        send(stdin, "uci")?;
        expect(&|line: &str| line == "uciok")?;

        for (name, value) in self.options() {
            send(stdin, &format!("setoption name {name} value {value}"))?;
        }
        send(stdin, "isready")?;
        expect(&|line: &str| line == "readyok")?;

        send(stdin, "ucinewgame")?;
        send(stdin, &format!("position fen {}", position.to_fen()))?;
        send(stdin, &go_command(limits))?;

        let reply = expect(&|line: &str| line.starts_with("bestmove"))?;
        // Best effort; the process is killed right after anyway.
        let _ = send(stdin, "quit");
        parse_bestmove(&reply)
    }
}

impl DelegateEvaluator for UciDelegate {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(skip(self, position), fields(program = %self.program, fen = %position))]
    fn best_move(&self, position: &Position, limits: &SearchLimits) -> Result<String, DelegateError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DelegateError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let (mut stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DelegateError::Protocol("engine pipes unavailable".to_owned()));
            }
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line.trim().to_owned()).is_err() {
                    break;
                }
            }
        });

        let result = self.converse(&mut stdin, &rx, position, limits);

        drop(stdin);
        let _ = child.kill();
        let _ = child.wait();

        debug!(?result, "evaluator exchange finished");
        result
    }
}

fn send(stdin: &mut ChildStdin, command: &str) -> Result<(), DelegateError> {
    writeln!(stdin, "{command}")?;
    stdin.flush()?;
    Ok(())
}

fn wait_for_line(
    lines: &Receiver<String>,
    deadline: Instant,
    limits: &SearchLimits,
    predicate: &dyn Fn(&str) -> bool,
) -> Result<String, DelegateError> {
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(DelegateError::Timeout(limits.timeout));
        }
        match lines.recv_timeout(remaining) {
            Ok(line) if predicate(&line) => return Ok(line),
            Ok(_) => continue,
            Err(RecvTimeoutError::Timeout) => return Err(DelegateError::Timeout(limits.timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(DelegateError::Protocol(
                    "engine closed its output before answering".to_owned(),
                ))
            }
        }
    }
}

pub(crate) fn go_command(limits: &SearchLimits) -> String {
    match limits.depth {
        Some(depth) => format!("go movetime {} depth {depth}", limits.movetime_ms),
        None => format!("go movetime {}", limits.movetime_ms),
    }
}

/// Extract the move from a `bestmove <move> [ponder <move>]` line.
pub(crate) fn parse_bestmove(line: &str) -> Result<String, DelegateError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("bestmove") {
        return Err(DelegateError::Protocol(format!("unexpected reply '{line}'")));
    }
    match tokens.next() {
        None | Some("(none)") | Some("0000") => Err(DelegateError::NoMove),
        Some(mv) => Ok(mv.to_owned()),
    }
}
