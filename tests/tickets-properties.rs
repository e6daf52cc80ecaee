use std::fs;
use proptest::prelude::*;
use lotto_tally::codec::EncodedTicket;
use lotto_tally::histogram::MatchHistogram;
use lotto_tally::ingest::{ingest, Backend, IngestOptions};
use lotto_tally::matcher::{count_matches, WinningSet};
use lotto_tally::reduce::reduce;
use lotto_tally::Ticket;

fn ticket() -> impl Strategy<Value = Ticket> {
    prop::array::uniform5(1u32..=90)
}

fn drawn() -> impl Strategy<Value = [u8; 5]> {
    prop::array::uniform5(1u8..=90)
}

fn histogram() -> impl Strategy<Value = MatchHistogram> {
    prop::collection::vec(0u8..=5, 0..50).prop_map(|counts| {
        let mut h = MatchHistogram::new();
        counts.into_iter().for_each(|m| h.record(m));
        h
    })
}

proptest! {
    #[test]
    fn encode_decode_round_trip(t in ticket()) {
        prop_assert_eq!(t, EncodedTicket::encode(&t).decode());
        prop_assert_eq!(EncodedTicket::encode(&t), EncodedTicket::from_tagged(EncodedTicket::encode(&t).to_tagged()));
    }

    #[test]
    fn matches_ignore_ticket_order(t in ticket(), d in drawn(), seed in any::<u64>()) {
        let winning = WinningSet::from_numbers(d);
        let mut shuffled = t;
        let n = shuffled.len();
        for i in (1..n).rev() {
            shuffled.swap(i, ((seed as usize) >> i) % (i + 1));
        }
        prop_assert_eq!(
            count_matches(&EncodedTicket::encode(&t), &winning),
            count_matches(&EncodedTicket::encode(&shuffled), &winning)
        );
    }

    #[test]
    fn reduce_ignores_worker_count(ts in prop::collection::vec(ticket(), 0..300), d in drawn(), workers in 1usize..300) {
        let tickets: Vec<EncodedTicket> = ts.iter().map(EncodedTicket::encode).collect();
        let winning = WinningSet::from_numbers(d);
        let single = reduce(&tickets, &winning, 1);
        prop_assert!(single.total() <= tickets.len() as u64);
        prop_assert_eq!(single, reduce(&tickets, &winning, workers));
    }

    #[test]
    fn merge_in_any_order(h1 in histogram(), h2 in histogram(), h3 in histogram()) {
        let a: MatchHistogram = [h1, h2, h3].into_iter().sum();
        let b: MatchHistogram = [h3, h1, h2].into_iter().sum();
        let mut c = h2;
        c.merge(&h3);
        c.merge(&h1);
        prop_assert_eq!(a, b);
        prop_assert_eq!(a, c);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn ingest_ignores_worker_count(ts in prop::collection::vec(ticket(), 0..200), workers in 2usize..64, trailing_newline in any::<bool>()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tickets.txt");
        let mut data = ts.iter()
            .map(|t| t.map(|n| n.to_string()).join(" "))
            .collect::<Vec<_>>()
            .join("\n");
        if trailing_newline && !data.is_empty() {
            data.push('\n');
        }
        fs::write(&path, data).unwrap();

        let mut expected: Vec<EncodedTicket> = ts.iter().map(EncodedTicket::encode).collect();
        expected.sort();

        for backend in [Backend::Buffered, Backend::Mapped] {
            let options = IngestOptions { workers, backend, fail_fast: true };
            let mut tickets = ingest(&path, &options).unwrap().into_complete().unwrap();
            tickets.sort();
            prop_assert_eq!(&expected, &tickets);
        }
    }
}
