use std::fmt::{Display, Formatter};
use ahash::AHashSet;

use crate::codec::EncodedTicket;
use crate::error::{LottoError, LottoResult};
use crate::{number_from_bytes, MAX_NUMBER, MIN_NUMBER, TICKET_LEN};

/// The numbers drawn for a round. Built once, then only read.
#[derive(Clone, Debug)]
pub struct WinningSet {
    drawn: [u8; TICKET_LEN],
    set: AHashSet<u8>,
}

impl WinningSet {
    /// Numbers are trusted to be in `1..=90`; repeats collapse in the membership set.
    pub fn from_numbers(drawn: [u8; TICKET_LEN]) -> Self {
        WinningSet { drawn, set: drawn.iter().copied().collect() }
    }

    /// Parse a line of exactly five whitespace separated numbers in `1..=90`.
    pub fn parse(line: &str) -> LottoResult<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != TICKET_LEN {
            return Err(LottoError::WinningCount(fields.len()));
        }

        let mut drawn = [0u8; TICKET_LEN];
        for (slot, field) in drawn.iter_mut().zip(&fields) {
            match number_from_bytes(field.as_bytes()) {
                Some(n) if (MIN_NUMBER..=MAX_NUMBER).contains(&n) => *slot = n as u8,
                _ => return Err(LottoError::WinningNumber(field.to_string())),
            }
        }
        Ok(WinningSet::from_numbers(drawn))
    }

    pub fn contains(&self, n: u8) -> bool {
        self.set.contains(&n)
    }

    pub fn drawn(&self) -> &[u8; TICKET_LEN] {
        &self.drawn
    }

    /// How many of `numbers` were drawn. A number repeated on the ticket counts every time.
    #[inline]
    pub fn count_matches(&self, numbers: &[u8]) -> u8 {
        numbers.iter().filter(|&&n| self.contains(n)).count() as u8
    }
}

impl Display for WinningSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e] = self.drawn;
        write!(f, "{a} {b} {c} {d} {e}")
    }
}

/// Match count of one ticket, `0..=5`.
#[inline]
pub fn count_matches(ticket: &EncodedTicket, winning: &WinningSet) -> u8 {
    winning.count_matches(ticket.numbers())
}
