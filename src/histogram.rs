use std::fmt::{Display, Formatter};
use std::iter::Sum;

use crate::TICKET_LEN;

/// Fewest matches that still wins something.
pub const MIN_PRIZE_MATCHES: u8 = 2;
const BUCKETS: usize = TICKET_LEN - MIN_PRIZE_MATCHES as usize + 1;

/// Winners per match count, for match counts 2 to 5.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MatchHistogram {
    buckets: [u64; BUCKETS],
}

impl MatchHistogram {
    pub fn new() -> Self {
        MatchHistogram::default()
    }

    /// Count one ticket with `matches` hits. Fewer than two hits is not a prize and is dropped.
    #[inline]
    pub fn record(&mut self, matches: u8) {
        if let Some(b) = Self::bucket(matches) {
            self.buckets[b] += 1;
        }
    }

    /// Winners with exactly `matches` hits; 0 for anything outside 2..=5.
    pub fn get(&self, matches: u8) -> u64 {
        Self::bucket(matches).map_or(0, |b| self.buckets[b])
    }

    /// All winners, over every bucket.
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    pub fn merge(&mut self, other: &Self) {
        for (a, b) in self.buckets.iter_mut().zip(other.buckets) {
            *a += b;
        }
    }

    /// `(matches, winners)` pairs from 5 down to 2.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        (MIN_PRIZE_MATCHES..=TICKET_LEN as u8).rev().map(|m| (m, self.get(m)))
    }

    fn bucket(matches: u8) -> Option<usize> {
        if (MIN_PRIZE_MATCHES..=TICKET_LEN as u8).contains(&matches) {
            Some((matches - MIN_PRIZE_MATCHES) as usize)
        } else {
            None
        }
    }
}

impl Sum for MatchHistogram {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MatchHistogram::new(), |mut acc, h| {
            acc.merge(&h);
            acc
        })
    }
}

impl<'a> Sum<&'a MatchHistogram> for MatchHistogram {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(MatchHistogram::new(), |mut acc, h| {
            acc.merge(h);
            acc
        })
    }
}

impl Display for MatchHistogram {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number Matching | Winners")?;
        write!(f, "----------------|--------")?;
        for (m, winners) in self.iter() {
            write!(f, "\n{m:<16}| {winners}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn histogram(counts: &[u8]) -> MatchHistogram {
        let mut h = MatchHistogram::new();
        counts.iter().for_each(|&m| h.record(m));
        h
    }

    #[test]
    fn test_record() {
        let h = histogram(&[0, 1, 2, 2, 3, 4, 5, 5, 5, 6]);
        assert_eq!(0, h.get(0));
        assert_eq!(0, h.get(1));
        assert_eq!(2, h.get(2));
        assert_eq!(1, h.get(3));
        assert_eq!(1, h.get(4));
        assert_eq!(3, h.get(5));
        assert_eq!(0, h.get(6));
        assert_eq!(7, h.total());
    }

    #[test]
    fn test_merge_any_order() {
        let h1 = histogram(&[2, 3, 3]);
        let h2 = histogram(&[5, 0, 4]);
        let h3 = histogram(&[2, 2, 1]);

        let forward: MatchHistogram = [h1, h2, h3].iter().sum();
        let backward: MatchHistogram = [h3, h2, h1].into_iter().sum();

        let mut nested = h2;
        nested.merge(&h3);
        let mut grouped = h1;
        grouped.merge(&nested);

        assert_eq!(forward, backward);
        assert_eq!(forward, grouped);
        assert_eq!(histogram(&[2, 3, 3, 5, 4, 2, 2]), forward);
    }

    #[test]
    fn test_empty() {
        let h: MatchHistogram = std::iter::empty::<MatchHistogram>().sum();
        assert_eq!(MatchHistogram::new(), h);
        assert_eq!(vec![(5, 0), (4, 0), (3, 0), (2, 0)], h.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_display() {
        let h = histogram(&[4, 2, 2]);
        let expected = "\
Number Matching | Winners
----------------|--------
5               | 0
4               | 1
3               | 0
2               | 2";
        assert_eq!(expected, h.to_string());
    }
}
