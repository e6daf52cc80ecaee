use std::fs::File;
use std::io::{self, BufReader, ErrorKind};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::thread;
use ahash::AHashMap;
use memmap::Mmap;
use tracing::{debug, error};

use crate::codec::EncodedTicket;
use crate::error::{LottoError, LottoResult, SegmentFailure};
use crate::segment::{read_segment, scan_segment, Segment, SegmentTickets};
use crate::clamp_workers;

const MIN_BUFFER_SIZE: usize = 8 * 1024;
const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// How segment readers get at the file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Backend {
    /// Every reader opens its own handle and streams its range through a `BufReader`.
    #[default]
    Buffered,
    /// The file is mapped once and every reader scans its slice of the shared mapping.
    Mapped,
}

#[derive(Clone, Debug)]
pub struct IngestOptions {
    pub workers: usize,
    pub backend: Backend,
    /// Stop sibling readers as soon as one segment fails.
    pub fail_fast: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            workers: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            backend: Backend::default(),
            fail_fast: true,
        }
    }
}

/// Everything the readers produced, in no particular order.
#[derive(Debug, Default)]
pub struct Ingestion {
    pub tickets: Vec<EncodedTicket>,
    pub segments: usize,
    pub lines: usize,
    pub malformed: usize,
    pub failures: Vec<SegmentFailure>,
}

impl Ingestion {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// The loaded tickets, or [LottoError::PartialIngest] if any segment is missing.
    pub fn into_complete(mut self) -> LottoResult<Vec<EncodedTicket>> {
        if self.failures.is_empty() {
            return Ok(self.tickets);
        }

        let failed = self.failures.len();
        // aborted siblings are a consequence, report the segment that started it
        let first = self.failures.iter()
            .position(|f| f.error.kind() != ErrorKind::Interrupted)
            .unwrap_or(0);
        let cause = self.failures.swap_remove(first);
        Err(LottoError::PartialIngest {
            failed,
            total: self.segments,
            first: cause.ordinal,
            cause: cause.error,
        })
    }

    fn aggregate(&mut self, mut out: SegmentTickets) {
        self.lines += out.lines;
        self.malformed += out.malformed;
        if self.tickets.is_empty() {
            self.tickets = out.tickets;
        } else {
            self.tickets.append(&mut out.tickets);
        }
    }
}

/// Cut `file_size` bytes into one range per worker. The last range runs to the end of the file;
/// when there are fewer bytes than workers a single range covers everything.
pub fn plan_segments(file_size: u64, workers: usize) -> Vec<Segment> {
    let mut workers = clamp_workers(workers) as u64;
    let mut size = file_size / workers;
    if size == 0 {
        size = file_size;
        workers = 1;
    }

    (0..workers).map(|i| {
        let start = i * size;
        let end = if i == workers - 1 { file_size } else { start + size };
        Segment::new(i as u8, start, end)
    }).collect()
}

fn buffer_size(segment_len: u64) -> usize {
    let want = segment_len.saturating_add(segment_len / 2).min(MAX_BUFFER_SIZE as u64) as usize;
    want.next_power_of_two().clamp(MIN_BUFFER_SIZE, MAX_BUFFER_SIZE)
}

/// Load every ticket of the file at `path` with `options.workers` parallel readers.
///
/// Malformed lines are skipped and counted. A segment that fails to read is listed in
/// [Ingestion::failures]; use [Ingestion::into_complete] to treat that as an error.
pub fn ingest(path: impl AsRef<Path>, options: &IngestOptions) -> LottoResult<Ingestion> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let file_size = file.metadata()?.len();

    let segments = plan_segments(file_size, options.workers);
    debug!(path = %path.display(), file_size, segments = segments.len(), backend = ?options.backend, "planned segments");

    let abort = AtomicBool::new(false);

    let ingestion = match options.backend {
        Backend::Buffered => run_segments(&segments, options.fail_fast, &abort, |segment| {
            let file = File::open(path)?;
            let mut reader = BufReader::with_capacity(buffer_size(segment.len()), file);
            read_segment(&mut reader, segment, &abort)
        }),
        Backend::Mapped => {
            if file_size == 0 {
                // nothing to map
                return Ok(Ingestion { segments: segments.len(), ..Ingestion::default() });
            }
            let mmap = unsafe { Mmap::map(&file)? };
            run_segments(&segments, options.fail_fast, &abort, |segment| Ok(scan_segment(&mmap, segment)))
        }
    };

    Ok(ingestion)
}

/// Run one reader per segment on scoped threads and gather results as readers finish.
fn run_segments<F>(segments: &[Segment], fail_fast: bool, abort: &AtomicBool, read: F) -> Ingestion
where
    F: Fn(&Segment) -> io::Result<SegmentTickets> + Sync,
{
    let mut ingestion = Ingestion { segments: segments.len(), ..Ingestion::default() };

    thread::scope(|s| {
        let mut threads = AHashMap::with_capacity(segments.len());

        let (tx, rx) = channel::<u8>();

        for segment in segments {
            let h = s.spawn({
                let tx = tx.clone();
                let read = &read;
                move || {
                    let result = read(segment);
                    if result.is_err() && fail_fast {
                        abort.store(true, Ordering::Relaxed);
                    }
                    // the receiver outlives every worker
                    let _ = tx.send(segment.ordinal);
                    result
                }
            });
            threads.insert(segment.ordinal, (segment, h));
        }
        drop(tx);

        let mut finish = |segment: &Segment, joined: thread::Result<io::Result<SegmentTickets>>| {
            let result = joined.unwrap_or_else(|_| Err(io::Error::other("segment reader panicked")));
            match result {
                Ok(out) => {
                    debug!(segment = segment.ordinal, tickets = out.tickets.len(), malformed = out.malformed, "segment done");
                    ingestion.aggregate(out);
                }
                Err(e) => {
                    error!(segment = segment.ordinal, start = segment.start, end = segment.end, "segment failed: {e}");
                    ingestion.failures.push(SegmentFailure { ordinal: segment.ordinal, range: segment.range(), error: e });
                }
            }
        };

        while !threads.is_empty() {
            let Ok(id) = rx.recv() else { break };
            if let Some((segment, h)) = threads.remove(&id) {
                finish(segment, h.join());
            }
        }

        // workers that panicked before reporting in
        for (_, (segment, h)) in threads.drain() {
            finish(segment, h.join());
        }
    });

    ingestion
}
