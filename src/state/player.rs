//! Player identity and roster.
//!
//! A `PlayerId` is the opaque, fixed-width identity of whoever invoked an
//! operation. The `Roster` keeps joined players in join order, which is also
//! turn order.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Width of a player identity in bytes.
pub const PLAYER_ID_LEN: usize = 20;

/// Opaque caller identity.
///
/// Text form is `0x` followed by 40 lowercase hex digits.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlayerId([u8; PLAYER_ID_LEN]);

impl PlayerId {
    pub const fn new(bytes: [u8; PLAYER_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an identity whose low 8 bytes hold `value` (big-endian).
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; PLAYER_ID_LEN];
        bytes[PLAYER_ID_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PLAYER_ID_LEN] {
        &self.0
    }
}

impl From<[u8; PLAYER_ID_LEN]> for PlayerId {
    fn from(bytes: [u8; PLAYER_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self)
    }
}

/// Error parsing a `PlayerId` from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsePlayerIdError {
    InvalidLength(usize),
    InvalidHex,
}

impl fmt::Display for ParsePlayerIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidLength(len) => write!(
                f,
                "Expected {} hex digits, got {}",
                PLAYER_ID_LEN * 2,
                len
            ),
            Self::InvalidHex => write!(f, "Invalid hex digit in player id"),
        }
    }
}

impl std::error::Error for ParsePlayerIdError {}

impl FromStr for PlayerId {
    type Err = ParsePlayerIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.len() != PLAYER_ID_LEN * 2 {
            return Err(ParsePlayerIdError::InvalidLength(digits.len()));
        }
        // from_str_radix alone would accept a leading '+'
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParsePlayerIdError::InvalidHex);
        }

        let mut bytes = [0u8; PLAYER_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let pair = &digits[i * 2..i * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| ParsePlayerIdError::InvalidHex)?;
        }
        Ok(Self(bytes))
    }
}

impl Serialize for PlayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Roster errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    Full,
    AlreadyPresent,
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "Roster is full"),
            Self::AlreadyPresent => write!(f, "Player already on roster"),
        }
    }
}

impl std::error::Error for RosterError {}

/// Ordered, capacity-bounded set of players.
#[derive(Debug, Clone)]
pub struct Roster {
    /// Join order (= turn order)
    order: Vec<PlayerId>,

    /// Membership index
    members: HashSet<PlayerId>,

    /// Maximum players allowed
    capacity: usize,
}

impl Roster {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: Vec::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a player, returning their seat index.
    ///
    /// Capacity is checked before membership, so a full roster always
    /// reports `Full`.
    pub fn push(&mut self, player: PlayerId) -> Result<usize, RosterError> {
        if self.is_full() {
            return Err(RosterError::Full);
        }

        if self.members.contains(&player) {
            return Err(RosterError::AlreadyPresent);
        }

        self.members.insert(player);
        self.order.push(player);
        Ok(self.order.len() - 1)
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.members.contains(player)
    }

    /// Seat index of a player.
    pub fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.order.iter().position(|p| p == player)
    }

    pub fn get(&self, index: usize) -> Option<PlayerId> {
        self.order.get(index).copied()
    }

    pub fn first(&self) -> Option<PlayerId> {
        self.order.first().copied()
    }

    pub fn as_slice(&self) -> &[PlayerId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.order.len() >= self.capacity
    }
}
