use std::fmt::{Display, Formatter};

use crate::{Ticket, TICKET_LEN};

const TAG_BIT: u8 = 0x80;
const VALUE_MASK: u8 = 0x7F;

/// A ticket packed one byte per number, in file order.
///
/// Numbers are stored as-is, so any value in `1..=90` round-trips. Encoding a value above
/// `u8::MAX` truncates; callers validate the range first (see [crate::parse_ticket]).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EncodedTicket([u8; TICKET_LEN]);

impl EncodedTicket {
    pub const SIZE: usize = TICKET_LEN;

    pub fn encode(ticket: &Ticket) -> Self {
        EncodedTicket(ticket.map(|n| n as u8))
    }

    pub fn decode(&self) -> Ticket {
        self.0.map(u32::from)
    }

    pub fn numbers(&self) -> &[u8; TICKET_LEN] {
        &self.0
    }

    /// Read a record written in the older tagged layout, where every byte but the last
    /// carried a "more numbers follow" high bit. The bit is positional noise and is dropped.
    pub fn from_tagged(bytes: [u8; TICKET_LEN]) -> Self {
        EncodedTicket(bytes.map(|b| b & VALUE_MASK))
    }

    /// Write the record in the older tagged layout.
    pub fn to_tagged(&self) -> [u8; TICKET_LEN] {
        let mut bytes = self.0;
        for b in &mut bytes[..TICKET_LEN - 1] {
            *b |= TAG_BIT;
        }
        bytes
    }
}

impl From<&Ticket> for EncodedTicket {
    fn from(ticket: &Ticket) -> Self {
        EncodedTicket::encode(ticket)
    }
}

impl Display for EncodedTicket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [a, b, c, d, e] = self.0;
        write!(f, "{a} {b} {c} {d} {e}")
    }
}

const NAIVE_BYTES_PER_TICKET: usize = TICKET_LEN * std::mem::size_of::<i64>();
const PACKED_BITS_PER_TICKET: usize = TICKET_LEN * 7;

/// Memory taken by a ticket collection, against a naive and a fully bit-packed layout.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Footprint {
    pub tickets: usize,
    pub encoded_bytes: usize,
    pub naive_bytes: usize,
    pub packed_bytes: usize,
}

impl Footprint {
    pub fn for_tickets(tickets: usize) -> Self {
        Footprint {
            tickets,
            encoded_bytes: tickets * EncodedTicket::SIZE,
            naive_bytes: tickets * NAIVE_BYTES_PER_TICKET,
            packed_bytes: (tickets * PACKED_BITS_PER_TICKET).div_ceil(8),
        }
    }
}

fn mib(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl Display for Footprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "tickets:          {}", self.tickets)?;
        writeln!(f, "encoded ({} B):    {:.2} MiB", EncodedTicket::SIZE, mib(self.encoded_bytes))?;
        writeln!(f, "naive ({NAIVE_BYTES_PER_TICKET} B):     {:.2} MiB", mib(self.naive_bytes))?;
        write!(f, "packed ({PACKED_BITS_PER_TICKET} bit):  {:.2} MiB", mib(self.packed_bytes))?;
        if self.naive_bytes > 0 {
            write!(f, "\nsaved vs naive:   {:.1}x", self.naive_bytes as f64 / self.encoded_bytes as f64)?;
        }
        Ok(())
    }
}
