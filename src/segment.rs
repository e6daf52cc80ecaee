//! Reading one byte range of a ticket file.
//!
//! A line belongs to the segment that holds its first byte. A reader that does not start at
//! offset 0 looks one byte back and discards everything up to the first `\n`: if the byte before
//! `start` is already a newline only that byte goes, otherwise the tail of a line owned by the
//! previous segment goes. A line that starts inside the range but runs past `end` is finished
//! from the underlying stream. Each line of the file is therefore parsed by exactly one segment.

use std::io::{self, BufRead, ErrorKind, Read, Seek, SeekFrom};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use memchr::memchr;
use tracing::warn;

use crate::codec::EncodedTicket;
use crate::{is_blank, parse_ticket};

/// Lines between two looks at the abort flag.
const ABORT_POLL_LINES: usize = 4096;

/// A half-open byte range `[start, end)` of the input, read by worker `ordinal`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Segment {
    pub ordinal: u8,
    pub start: u64,
    pub end: u64,
}

impl Segment {
    pub fn new(ordinal: u8, start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Segment { ordinal, start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }
}

/// Tickets parsed from one segment plus its line counters.
#[derive(Debug, Default)]
pub struct SegmentTickets {
    pub ordinal: u8,
    pub tickets: Vec<EncodedTicket>,
    /// Lines owned by this segment, blank ones included.
    pub lines: usize,
    /// Lines skipped because they did not hold a valid ticket.
    pub malformed: usize,
}

impl SegmentTickets {
    fn new(segment: &Segment, capacity: usize) -> Self {
        SegmentTickets {
            ordinal: segment.ordinal,
            tickets: Vec::with_capacity(capacity),
            lines: 0,
            malformed: 0,
        }
    }

    fn push_line(&mut self, line: &[u8]) {
        self.lines += 1;
        if is_blank(line) {
            return;
        }
        match parse_ticket(line) {
            Ok(t) => self.tickets.push(EncodedTicket::encode(&t)),
            Err(e) => {
                self.malformed += 1;
                warn!(segment = self.ordinal, line = self.lines, "skipping malformed line: {e}");
            }
        }
    }
}

/// Rough ticket count for a byte range, used to size the output up front.
/// "1 2 3 4 5\n" is the shortest line, "90 90 90 90 90\n" the longest.
fn estimate_tickets(bytes: u64) -> usize {
    (bytes / 12) as usize
}

fn aborted(segment: &Segment) -> io::Error {
    io::Error::new(ErrorKind::Interrupted, format!("segment {} aborted", segment.ordinal))
}

/// Read the lines owned by `segment` from a seekable stream.
///
/// `abort` is checked on entry and polled between lines; once it is set the read stops with
/// [ErrorKind::Interrupted] and the partial output is dropped.
pub fn read_segment<R: BufRead + Seek>(reader: &mut R, segment: &Segment, abort: &AtomicBool) -> io::Result<SegmentTickets> {
    if abort.load(Ordering::Relaxed) {
        return Err(aborted(segment));
    }

    let mut out = SegmentTickets::new(segment, estimate_tickets(segment.len()));
    let mut line: Vec<u8> = Vec::with_capacity(64);

    let mut pos = segment.start;
    if segment.start > 0 {
        reader.seek(SeekFrom::Start(segment.start - 1))?;
        let n = reader.read_until(b'\n', &mut line)?;
        pos = segment.start - 1 + n as u64;
    } else {
        reader.seek(SeekFrom::Start(0))?;
    }

    if pos >= segment.end {
        return Ok(out);
    }

    let mut bounded = reader.take(segment.end - pos);
    let mut straddles = false;

    loop {
        if out.lines % ABORT_POLL_LINES == 0 && abort.load(Ordering::Relaxed) {
            return Err(aborted(segment));
        }

        line.clear();
        let n = bounded.read_until(b'\n', &mut line)?;
        if n == 0 {
            break;
        }
        if line.last() != Some(&b'\n') && bounded.limit() == 0 {
            straddles = true;
            break;
        }
        out.push_line(&line);
    }

    if straddles {
        // finish the line past `end`; it started inside this segment
        bounded.into_inner().read_until(b'\n', &mut line)?;
        out.push_line(&line);
    }

    Ok(out)
}

/// Same ownership rule as [read_segment], over a file already in memory (usually a mapping).
pub fn scan_segment(data: &[u8], segment: &Segment) -> SegmentTickets {
    let mut out = SegmentTickets::new(segment, estimate_tickets(segment.len()));

    let end = (segment.end as usize).min(data.len());
    let mut begin = segment.start as usize;

    if begin > 0 {
        match memchr(b'\n', &data[begin - 1..]) {
            Some(i) => begin = begin - 1 + i + 1,
            None => return out,
        }
    }

    while begin < end {
        let stop = match memchr(b'\n', &data[begin..]) {
            Some(i) => begin + i,
            None => data.len(),
        };
        out.push_line(&data[begin..stop]);
        begin = stop + 1;
    }

    out
}
