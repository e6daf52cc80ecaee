use std::panic;
use std::thread;
use tracing::debug;

use crate::codec::EncodedTicket;
use crate::histogram::MatchHistogram;
use crate::matcher::{count_matches, WinningSet};
use crate::clamp_workers;

/// Histogram of one contiguous run of tickets.
pub fn tally(tickets: &[EncodedTicket], winning: &WinningSet) -> MatchHistogram {
    let mut local = MatchHistogram::new();
    for t in tickets {
        local.record(count_matches(t, winning));
    }
    local
}

/// Count winners over `tickets` with up to `workers` threads.
///
/// Tickets are cut into contiguous chunks of `len / workers`, the last chunk taking the rest.
/// Every worker fills its own histogram; they are summed once all workers are done.
pub fn reduce(tickets: &[EncodedTicket], winning: &WinningSet, workers: usize) -> MatchHistogram {
    if tickets.is_empty() {
        return MatchHistogram::new();
    }

    let workers = clamp_workers(workers).min(tickets.len());
    if workers == 1 {
        return tally(tickets, winning);
    }

    let size = tickets.len() / workers;

    thread::scope(|s| {
        let mut threads = Vec::with_capacity(workers);

        let mut rest = tickets;
        for id in 0..workers {
            let (cur, tail) = if id == workers - 1 { (rest, &rest[rest.len()..]) } else { rest.split_at(size) };
            debug!(worker = id, tickets = cur.len(), "counting chunk");
            threads.push(s.spawn(move || tally(cur, winning)));
            rest = tail;
        }

        threads.into_iter()
            .map(|h| h.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_ticket;
    use crate::test::TEST_STR_20;

    fn tickets(data: &str) -> Vec<EncodedTicket> {
        data.lines().map(|l| EncodedTicket::encode(&parse_ticket(l.as_bytes()).unwrap())).collect()
    }

    #[test]
    fn test_single_ticket_scenario() {
        let tickets = tickets("1 4 22 56 89");
        let winning = WinningSet::from_numbers([1, 4, 22, 56, 90]);
        let h = reduce(&tickets, &winning, 4);
        assert_eq!([0, 0, 1, 0], [h.get(2), h.get(3), h.get(4), h.get(5)]);
    }

    #[test]
    fn test_empty() {
        let winning = WinningSet::from_numbers([1, 4, 22, 56, 90]);
        assert_eq!(MatchHistogram::new(), reduce(&[], &winning, 8));
    }

    #[test]
    fn test_worker_count_does_not_matter() {
        let tickets = tickets(TEST_STR_20);
        let winning = WinningSet::from_numbers([1, 4, 22, 56, 90]);
        let single = reduce(&tickets, &winning, 1);

        // "1 4 22 56 89", "56 22 4 1 89" and "1 4 22 56 90"
        assert_eq!(1, single.get(5));
        assert_eq!(2, single.get(4));

        for workers in [0, 2, 3, 7, 19, 20, 21, 255, 1000] {
            assert_eq!(single, reduce(&tickets, &winning, workers), "{workers} workers");
        }
    }
}
