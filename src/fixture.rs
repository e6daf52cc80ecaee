//! Synthetic ticket files for trying the tool out at scale.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::Path;
use memchr::memchr_iter;
use memmap::Mmap;
use rand::Rng;
use tracing::info;

use crate::{Ticket, MAX_NUMBER, MIN_NUMBER};

pub const DEFAULT_TARGET_LINES: usize = 1_000_000;

const BUFFER_SIZE: usize = 4 * 1024 * 1024;

/// Line count and whether the file ends with a newline. A missing file is empty.
fn scan_lines(path: &Path) -> io::Result<(usize, bool)> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok((0, true)),
        Err(e) => return Err(e),
    };
    if file.metadata()?.len() == 0 {
        return Ok((0, true));
    }

    let mmap = unsafe { Mmap::map(&file)? };
    let data = &mmap[..];
    let newlines = memchr_iter(b'\n', data).count();
    let terminated = data.last() == Some(&b'\n');

    Ok((if terminated { newlines } else { newlines + 1 }, terminated))
}

/// Lines in the file at `path`, counting an unterminated last line.
pub fn count_lines(path: impl AsRef<Path>) -> io::Result<usize> {
    scan_lines(path.as_ref()).map(|(lines, _)| lines)
}

/// Five independent draws from `1..=90`; a ticket may repeat a number.
pub fn random_ticket<R: Rng>(rng: &mut R) -> Ticket {
    std::array::from_fn(|_| rng.gen_range(MIN_NUMBER..=MAX_NUMBER))
}

/// Append random tickets to `path` (created if missing) until it holds `target_lines` lines.
/// Returns the number of lines written.
pub fn append_tickets<R: Rng>(path: impl AsRef<Path>, target_lines: usize, rng: &mut R) -> io::Result<usize> {
    let path = path.as_ref();
    let (existing, terminated) = scan_lines(path)?;
    if existing >= target_lines {
        info!(path = %path.display(), existing, "file already has enough lines");
        return Ok(0);
    }

    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, file);

    if !terminated {
        writer.write_all(b"\n")?;
    }

    let missing = target_lines - existing;
    for _ in 0..missing {
        let [a, b, c, d, e] = random_ticket(rng);
        writeln!(writer, "{a} {b} {c} {d} {e}")?;
    }
    writer.flush()?;

    info!(path = %path.display(), appended = missing, total = target_lines, "appended tickets");
    Ok(missing)
}
