//! Identifier generation for rendered records
//!
//! Translation blocks and concepts need numeric suffixes that do not
//! collide across terms. The generator is injected so rendering stays
//! reproducible; randomness is one strategy among three.
//!
//! Within one generator, distinct keys never share an identifier in the
//! same range while the range has room left. Hashed and random candidates
//! move to the next free value on a clash.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Suffix range for translation blocks (lexical variant)
pub const TRANSLATION_IDS: RangeInclusive<u64> = 10_000..=99_999;

/// Range of synthetic concept identifiers (taxonomic variant)
pub const CONCEPT_IDS: RangeInclusive<u64> = 1_000_000..=9_999_999;

/// Prefix of synthetic concept identifiers
pub const CONCEPT_PREFIX: &str = "LT";

/// Source of numeric identifiers within a range
pub trait IdGenerator: Send + Sync {
    /// Next identifier in `range` for the item described by `key`
    fn next_id(&self, range: &RangeInclusive<u64>, key: &str) -> u64;
}

/// How identifiers are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Sequential from the start of the range
    Counter,
    /// Derived from a SHA-256 of the key
    #[default]
    ContentHash,
    /// Uniformly random in the range
    Random,
}

impl IdStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::ContentHash => "content_hash",
            Self::Random => "random",
        }
    }
}

impl FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "counter" => Ok(Self::Counter),
            "content_hash" | "content-hash" | "hash" => Ok(Self::ContentHash),
            "random" => Ok(Self::Random),
            other => Err(format!("Unknown id strategy: {other}")),
        }
    }
}

/// Build the generator for a strategy
pub fn generator(strategy: IdStrategy) -> Arc<dyn IdGenerator> {
    match strategy {
        IdStrategy::Counter => Arc::new(CounterIds::default()),
        IdStrategy::ContentHash => Arc::new(ContentHashIds::default()),
        IdStrategy::Random => Arc::new(RandomIds::default()),
    }
}

/// Synthetic concept identifier, e.g. `LT4821337`
pub fn concept_id(ids: &dyn IdGenerator, key: &str) -> String {
    format!("{CONCEPT_PREFIX}{}", ids.next_id(&CONCEPT_IDS, key))
}

fn span(range: &RangeInclusive<u64>) -> u64 {
    range.end().saturating_sub(*range.start()).saturating_add(1)
}

/// Sequential identifiers; wraps around at the end of the range
#[derive(Debug, Default)]
pub struct CounterIds {
    next: AtomicU64,
}

impl IdGenerator for CounterIds {
    fn next_id(&self, range: &RangeInclusive<u64>, _key: &str) -> u64 {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        range.start() + n % span(range)
    }
}

/// Identifiers handed out in one range
#[derive(Debug, Default)]
struct RangeLedger {
    by_key: HashMap<String, u64>,
    taken: HashSet<u64>,
}

/// Identifiers handed out so far, per range
#[derive(Debug, Default)]
struct Issued {
    ranges: Mutex<HashMap<(u64, u64), RangeLedger>>,
}

impl Issued {
    /// Claim `candidate` for `key`, or the next free value after it
    ///
    /// A key that already owns an identifier gets it back. When the range
    /// is full the candidate is returned as is.
    fn claim(&self, range: &RangeInclusive<u64>, key: &str, candidate: u64) -> u64 {
        let mut ranges = self.ranges.lock().unwrap_or_else(PoisonError::into_inner);
        let ledger = ranges.entry((*range.start(), *range.end())).or_default();

        if let Some(&id) = ledger.by_key.get(key) {
            return id;
        }

        let mut id = candidate;
        for _ in 0..span(range) {
            if ledger.taken.insert(id) {
                ledger.by_key.insert(key.to_string(), id);
                return id;
            }
            id = if id >= *range.end() { *range.start() } else { id + 1 };
        }

        tracing::warn!(
            start = range.start(),
            end = range.end(),
            "Identifier range exhausted, reusing an identifier"
        );
        candidate
    }
}

/// Position of `key`'s SHA-256 in `range`
pub(crate) fn hashed(range: &RangeInclusive<u64>, key: &str) -> u64 {
    let digest = Sha256::digest(key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    range.start() + u64::from_be_bytes(prefix) % span(range)
}

/// Identifiers derived from the key; equal keys get equal identifiers
#[derive(Debug, Default)]
pub struct ContentHashIds {
    issued: Issued,
}

impl IdGenerator for ContentHashIds {
    fn next_id(&self, range: &RangeInclusive<u64>, key: &str) -> u64 {
        self.issued.claim(range, key, hashed(range, key))
    }
}

/// Random identifiers
#[derive(Debug, Default)]
pub struct RandomIds {
    issued: Issued,
}

impl IdGenerator for RandomIds {
    fn next_id(&self, range: &RangeInclusive<u64>, key: &str) -> u64 {
        let candidate = rand::thread_rng().gen_range(range.clone());
        self.issued.claim(range, key, candidate)
    }
}

/// Always the same identifier, clamped into the range
#[derive(Debug, Clone, Copy)]
pub struct FixedId(pub u64);

impl IdGenerator for FixedId {
    fn next_id(&self, range: &RangeInclusive<u64>, _key: &str) -> u64 {
        self.0.clamp(*range.start(), *range.end())
    }
}
