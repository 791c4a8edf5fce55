// src/query/codec.rs
//! Encoding and decoding for the legacy connectionless query protocol.
//!
//! Every datagram starts with four `0xFF` bytes followed by a command byte.
//! Decoding is deliberately lenient: short or malformed replies produce
//! whatever could be read instead of an error.

use byteorder::{ByteOrder, LittleEndian};
use crate::models::server::{PlayerRecord, RuleSet};

pub const MAGIC: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

pub const RULES_REQUEST: u8 = b'V';
pub const PLAYERS_REQUEST: u8 = b'U';
pub const CHALLENGE_REPLY: u8 = b'A';
pub const RULES_REPLY: u8 = b'E';
pub const PLAYERS_REPLY: u8 = b'D';

/// Placeholder sent in place of a challenge on the first attempt.
const NO_CHALLENGE: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

const PREFIX_LEN: usize = 5;
const CHALLENGE_LEN: usize = 4;
const RULES_HEADER_LEN: usize = 7;
const PLAYER_SCORE_AND_TIME_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Rules,
    Players,
}

impl QueryKind {
    pub fn request_byte(self) -> u8 {
        match self {
            Self::Rules => RULES_REQUEST,
            Self::Players => PLAYERS_REQUEST,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rules => "rules",
            Self::Players => "players",
        }
    }
}

/// A received datagram, classified by its prefix. Payload slices exclude
/// the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply<'a> {
    Challenge(&'a [u8]),
    Rules(&'a [u8]),
    Players(&'a [u8]),
    Unrecognized,
}

impl Reply<'_> {
    pub fn answers(&self, kind: QueryKind) -> bool {
        matches!(
            (self, kind),
            (Reply::Rules(_), QueryKind::Rules) | (Reply::Players(_), QueryKind::Players)
        )
    }
}

pub fn encode_request(kind: QueryKind, challenge: Option<&[u8]>) -> Vec<u8> {
    let challenge = challenge.unwrap_or(&NO_CHALLENGE);
    let mut packet = Vec::with_capacity(PREFIX_LEN + challenge.len());
    packet.extend_from_slice(&MAGIC);
    packet.push(kind.request_byte());
    packet.extend_from_slice(challenge);
    packet
}

pub fn encode_rules_request(challenge: Option<&[u8]>) -> Vec<u8> {
    encode_request(QueryKind::Rules, challenge)
}

pub fn encode_players_request(challenge: Option<&[u8]>) -> Vec<u8> {
    encode_request(QueryKind::Players, challenge)
}

pub fn classify(datagram: &[u8]) -> Reply<'_> {
    if datagram.len() < PREFIX_LEN || datagram[..4] != MAGIC {
        return Reply::Unrecognized;
    }

    match datagram[4] {
        CHALLENGE_REPLY => {
            let end = datagram.len().min(PREFIX_LEN + CHALLENGE_LEN);
            Reply::Challenge(&datagram[PREFIX_LEN..end])
        }
        RULES_REPLY => Reply::Rules(datagram.get(RULES_HEADER_LEN..).unwrap_or(&[])),
        PLAYERS_REPLY => Reply::Players(&datagram[PREFIX_LEN..]),
        _ => Reply::Unrecognized,
    }
}

/// Reads a NUL-terminated string starting at `start`. Returns the text and
/// the offset just past the terminator, or `None` if no terminator follows.
fn read_cstring(buf: &[u8], start: usize) -> Option<(String, usize)> {
    let rest = buf.get(start..)?;
    let len = rest.iter().position(|&b| b == 0)?;
    let text = String::from_utf8_lossy(&rest[..len]).into_owned();
    Some((text, start + len + 1))
}

pub fn decode_rules(payload: &[u8]) -> RuleSet {
    let mut rules = RuleSet::new();
    let mut idx = 0;

    while idx < payload.len() {
        let Some((key, after_key)) = read_cstring(payload, idx) else {
            break;
        };
        let Some((value, after_value)) = read_cstring(payload, after_key) else {
            break;
        };
        rules.insert(key, value);
        idx = after_value;
    }

    rules
}

pub fn decode_players(payload: &[u8]) -> Vec<PlayerRecord> {
    let Some((&count, buf)) = payload.split_first() else {
        return Vec::new();
    };

    let mut players = Vec::with_capacity(count as usize);
    let mut idx = 0;

    for _ in 0..count {
        if idx >= buf.len() {
            break;
        }
        // player index, unused
        idx += 1;

        let Some((name, after_name)) = read_cstring(buf, idx) else {
            break;
        };
        idx = after_name;

        let (score, duration) = if idx + PLAYER_SCORE_AND_TIME_LEN > buf.len() {
            // trailing bytes cannot hold another player
            idx = buf.len();
            (0, 0.0)
        } else {
            let score = LittleEndian::read_i32(&buf[idx..idx + 4]);
            let duration = LittleEndian::read_f32(&buf[idx + 4..idx + 8]);
            idx += PLAYER_SCORE_AND_TIME_LEN;
            (score, duration)
        };

        players.push(PlayerRecord { name, score, duration });
    }

    players
}
