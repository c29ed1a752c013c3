//! Derivation path values
//!
//! A path is an ordered list of raw 32-bit indices. Indices with the top bit
//! set are hardened. The raw number is the persisted form; the textual form
//! `m/44'/0'/1` is for humans.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Offset of the first hardened index
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("Path must start with 'm': {0}")]
    MissingRoot(String),
    #[error("Invalid index '{0}'")]
    InvalidIndex(String),
    #[error("Index out of range: {0}")]
    IndexOutOfRange(u32),
}

/// A single raw derivation index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slip10RawIndex(u32);

impl Slip10RawIndex {
    /// Hardened index `n'`. `n` must be below 2^31.
    pub fn hardened(n: u32) -> Result<Self, PathError> {
        if n >= HARDENED_OFFSET {
            return Err(PathError::IndexOutOfRange(n));
        }
        Ok(Self(n | HARDENED_OFFSET))
    }

    /// Normal index `n`. `n` must be below 2^31.
    pub fn normal(n: u32) -> Result<Self, PathError> {
        if n >= HARDENED_OFFSET {
            return Err(PathError::IndexOutOfRange(n));
        }
        Ok(Self(n))
    }

    /// Wrap a raw index as stored (hardened bit included)
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn is_hardened(&self) -> bool {
        self.0 >= HARDENED_OFFSET
    }

    /// The raw number, hardened bit included
    pub fn as_number(&self) -> u32 {
        self.0
    }

    /// Index without the hardened bit
    pub fn unhardened(&self) -> u32 {
        self.0 & !HARDENED_OFFSET
    }
}

impl fmt::Display for Slip10RawIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hardened() {
            write!(f, "{}'", self.unhardened())
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for Slip10RawIndex {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (digits, hardened) = match s.strip_suffix('\'').or_else(|| s.strip_suffix('h')) {
            Some(digits) => (digits, true),
            None => (s, false),
        };
        let n: u32 = digits
            .parse()
            .map_err(|_| PathError::InvalidIndex(s.to_string()))?;
        if hardened {
            Self::hardened(n)
        } else {
            Self::normal(n)
        }
    }
}

/// Ordered sequence of derivation indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DerivationPath(Vec<Slip10RawIndex>);

impl DerivationPath {
    pub fn new(indices: Vec<Slip10RawIndex>) -> Self {
        Self(indices)
    }

    /// Build a path from raw stored numbers
    pub fn from_raw(raw: &[u32]) -> Self {
        Self(raw.iter().copied().map(Slip10RawIndex::from_raw).collect())
    }

    /// The single-element path `m/n'`
    pub fn single_hardened(n: u32) -> Result<Self, PathError> {
        Ok(Self(vec![Slip10RawIndex::hardened(n)?]))
    }

    pub fn indices(&self) -> &[Slip10RawIndex] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_fully_hardened(&self) -> bool {
        self.0.iter().all(Slip10RawIndex::is_hardened)
    }

    /// Raw numbers in order, as persisted
    pub fn to_raw(&self) -> Vec<u32> {
        self.0.iter().map(Slip10RawIndex::as_number).collect()
    }
}

impl From<Vec<Slip10RawIndex>> for DerivationPath {
    fn from(indices: Vec<Slip10RawIndex>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let rest = match s.strip_prefix('m') {
            Some(rest) => rest,
            None => return Err(PathError::MissingRoot(s.to_string())),
        };
        if rest.is_empty() {
            return Ok(Self::default());
        }
        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| PathError::MissingRoot(s.to_string()))?;

        rest.split('/')
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
