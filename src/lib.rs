pub mod codec;
pub mod error;
pub mod fixture;
pub mod histogram;
pub mod ingest;
pub mod matcher;
pub mod reduce;
pub mod segment;

use crate::error::LineError;

pub const TICKET_LEN: usize = 5;
pub const MIN_NUMBER: u32 = 1;
pub const MAX_NUMBER: u32 = 90;
/// Worker ordinals are carried as `u8`, so a phase never runs more workers than this.
pub const MAX_WORKERS: usize = u8::MAX as usize;
pub const NUMBER_MAX_LEN: usize = 3;

/// A player's numbers in file order.
pub type Ticket = [u32; TICKET_LEN];

/// Parse decimal digits to Option<u32> value, leading zeros allowed
/// Return None if the token is empty, has more than NUMBER_MAX_LEN significant digits
/// or holds anything but digits
pub fn number_from_bytes(buf: &[u8]) -> Option<u32> {
    if buf.is_empty() {
        return None;
    }

    let significant = buf.iter().position(|&b| b != b'0').map_or(&buf[buf.len()..], |i| &buf[i..]);
    if significant.len() > NUMBER_MAX_LEN {
        return None;
    }

    let mut n: u32 = 0;
    for &b in significant {
        match b {
            b'0'..=b'9' => n = n * 10 + (b - b'0') as u32,
            _ => return None
        }
    }
    Some(n)
}

#[test]
fn test_number_from_bytes() {
    for i in 0..=999u32 {
        let string = format!("{i}");
        assert_eq!(Some(i), number_from_bytes(string.as_bytes()));
    }

    assert_eq!(Some(7), number_from_bytes(b"007"));
    assert_eq!(Some(90), number_from_bytes(b"0090"));
    assert_eq!(Some(1), number_from_bytes(b"0001"));
    assert_eq!(Some(0), number_from_bytes(b"0000"));
    assert_eq!(Some(45), number_from_bytes(b"0000000000045"));

    assert_eq!(None, number_from_bytes(b""));
    assert_eq!(None, number_from_bytes(b"1000"));
    assert_eq!(None, number_from_bytes(b"-1"));
    assert_eq!(None, number_from_bytes(b"+1"));
    assert_eq!(None, number_from_bytes(b"1a"));
    assert_eq!(None, number_from_bytes(b"4.0"));
    assert_eq!(None, number_from_bytes(b"00x1"));
    assert_eq!(None, number_from_bytes(b"0001000"));
}

/// Split a line on ASCII whitespace and parse exactly [`TICKET_LEN`] numbers in
/// `MIN_NUMBER..=MAX_NUMBER`. A trailing `\n` or `\r\n` is just more whitespace.
pub fn parse_ticket(line: &[u8]) -> Result<Ticket, LineError> {
    let mut ticket: Ticket = [0; TICKET_LEN];
    let mut count = 0;

    for token in line.split(|b| b.is_ascii_whitespace()).filter(|t| !t.is_empty()) {
        if count == TICKET_LEN {
            count += 1;
            continue;
        }
        let n = number_from_bytes(token)
            .ok_or_else(|| LineError::Number(String::from_utf8_lossy(token).into_owned()))?;
        if !(MIN_NUMBER..=MAX_NUMBER).contains(&n) {
            return Err(LineError::OutOfRange(n));
        }
        ticket[count] = n;
        count += 1;
    }

    if count != TICKET_LEN {
        return Err(LineError::TokenCount(count));
    }
    Ok(ticket)
}

/// True for lines made only of whitespace; those are neither tickets nor errors.
pub fn is_blank(line: &[u8]) -> bool {
    line.iter().all(|b| b.is_ascii_whitespace())
}

/// Map a requested worker count into `1..=MAX_WORKERS`.
pub fn clamp_workers(requested: usize) -> usize {
    requested.clamp(1, MAX_WORKERS)
}

#[test]
fn test_parse_ticket() {
    assert_eq!(Ok([1, 4, 22, 56, 89]), parse_ticket(b"1 4 22 56 89"));
    assert_eq!(Ok([1, 4, 22, 56, 89]), parse_ticket(b"1 4 22 56 89\n"));
    assert_eq!(Ok([1, 4, 22, 56, 89]), parse_ticket(b"  1\t4  22 56 89\r\n"));
    assert_eq!(Ok([7, 7, 7, 7, 7]), parse_ticket(b"7 7 7 7 7"));
    assert_eq!(Ok([90, 1, 2, 3, 4]), parse_ticket(b"0090 1 2 3 4"));
    assert_eq!(Ok([1, 4, 22, 56, 89]), parse_ticket(b"0001 04 022 56 0089"));

    assert_eq!(Err(LineError::TokenCount(3)), parse_ticket(b"12 5 7"));
    assert_eq!(Err(LineError::TokenCount(6)), parse_ticket(b"1 2 3 4 5 6"));
    assert_eq!(Err(LineError::TokenCount(0)), parse_ticket(b""));
    assert_eq!(Err(LineError::Number("x".to_string())), parse_ticket(b"1 2 x 4 5"));
    assert_eq!(Err(LineError::OutOfRange(91)), parse_ticket(b"1 2 91 4 5"));
    assert_eq!(Err(LineError::OutOfRange(0)), parse_ticket(b"0 2 3 4 5"));
    assert_eq!(Err(LineError::OutOfRange(0)), parse_ticket(b"000 2 3 4 5"));
    assert_eq!(Err(LineError::OutOfRange(910)), parse_ticket(b"1 2 0910 4 5"));
}

#[test]
fn test_clamp_workers() {
    assert_eq!(1, clamp_workers(0));
    assert_eq!(8, clamp_workers(8));
    assert_eq!(255, clamp_workers(255));
    assert_eq!(255, clamp_workers(10_000));
}

pub mod test {

    pub const TEST_STR_1: &str = "\
1 4 22 56 89
";

    /// 20 tickets, every line valid, no trailing newline on the last one.
    pub const TEST_STR_20: &str = "\
1 4 22 56 89
12 5 7 33 61
90 89 88 87 86
3 14 15 9 65
45 45 45 45 45
2 71 82 81 8
10 20 30 40 50
11 21 31 41 51
1 2 3 4 5
6 7 8 9 10
56 22 4 1 89
33 44 55 66 77
17 29 38 47 56
60 61 62 63 64
9 18 27 36 45
5 10 15 20 25
70 71 72 73 74
1 4 22 56 90
80 81 82 83 84
23 34 45 56 67";

    /// Valid tickets mixed with the kinds of damage a reader must skip.
    pub const TEST_STR_MIXED: &str = "\
1 4 22 56 89
12 5 7

1 2 x 4 5
10 20 30 40 50
1 2 3 4 5 6
4 8 15 16 23
";

}
