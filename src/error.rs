//! Errors raised while loading tickets and reading the draw.
//!
//! Line-level problems ([LineError]) are recovered where they happen: the line is skipped and a
//! warning is logged. Everything in [LottoError] reaches the caller.

use std::io;
use std::ops::Range;
use thiserror::Error;

pub type LottoResult<T> = Result<T, LottoError>;

/// Why a single input line was not turned into a ticket.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum LineError {
    #[error("expected 5 numbers, found {0}")]
    TokenCount(usize),

    #[error("invalid number `{0}`")]
    Number(String),

    #[error("number {0} is outside 1..=90")]
    OutOfRange(u32),
}

/// A segment whose reader stopped on an I/O error, so its tickets are missing from the load.
#[derive(Debug)]
pub struct SegmentFailure {
    pub ordinal: u8,
    pub range: Range<u64>,
    pub error: io::Error,
}

#[derive(Debug, Error)]
pub enum LottoError {
    #[error("expected exactly 5 winning numbers, got {0}")]
    WinningCount(usize),

    #[error("invalid winning number `{0}`")]
    WinningNumber(String),

    #[error("{failed} of {total} segments failed to load, first failure in segment {first} ({cause})")]
    PartialIngest {
        failed: usize,
        total: usize,
        first: u8,
        cause: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
