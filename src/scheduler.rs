use std::io::{Read, Seek};
use std::num::NonZeroUsize;

use rayon::ThreadPool;
use tracing::{debug, trace};

use crate::chunk::{Chunk, ChunkReader};
use crate::error::Error;
use crate::table::{merge, FrequencyTable};
use crate::tokenize::tokenize;

/// Drives the run: acquires up to W chunks per batch, forks one worker per
/// chunk onto a dedicated W-thread pool, and joins the whole batch before
/// reading the next one.
///
/// Slot `i` of a batch always maps to slot table `i`. The `scope` call is
/// the join barrier, so a slot's table is only ever mutated by one worker
/// at a time and mutations to it are totally ordered across batches.
pub struct BatchScheduler {
    pool: ThreadPool,
    slots: Vec<FrequencyTable>,
    chunks_processed: u64,
}

impl BatchScheduler {
    /// Build the worker pool and create one empty table per slot.
    ///
    /// Pool construction failure is fatal for the run; there is no retry.
    pub fn new(workers: NonZeroUsize) -> Result<Self, Error> {
        let pool: ThreadPool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("wordfreq-worker-{i}"))
            .build()?;
        Ok(Self {
            pool,
            slots: vec![FrequencyTable::new(); workers.get()],
            chunks_processed: 0,
        })
    }

    /// Process the whole stream, batch by batch, until it is exhausted.
    pub fn run<R: Read + Seek>(&mut self, reader: &mut ChunkReader<R>) -> Result<(), Error> {
        loop {
            let (batch, end_of_stream) = fill_batch(reader, self.slots.len())?;
            if !batch.is_empty() {
                debug!(
                    "batch of {} chunks ({} bytes)",
                    batch.len(),
                    batch.iter().map(|c| c.bytes.len()).sum::<usize>()
                );
                let slots = &mut self.slots;
                self.pool.scope(|scope| {
                    for (slot, (table, chunk)) in slots.iter_mut().zip(&batch).enumerate() {
                        scope.spawn(move |_| count_chunk(slot, table, chunk));
                    }
                });
                self.chunks_processed += batch.len() as u64;
            }
            if end_of_stream {
                break;
            }
        }
        debug!("all batches joined, {} chunks processed", self.chunks_processed);
        Ok(())
    }

    /// Total chunks handed to workers over the run so far.
    pub fn chunks_processed(&self) -> u64 {
        self.chunks_processed
    }

    /// Consume the per-slot tables into the global table. Call once, after
    /// `run` has returned.
    pub fn into_table(self) -> FrequencyTable {
        merge(self.slots)
    }
}

/// Worker body: tokenize one chunk and accumulate into its slot's table.
fn count_chunk(slot: usize, table: &mut FrequencyTable, chunk: &Chunk) {
    let mut tokens: u64 = 0;
    for word in tokenize(&chunk.bytes) {
        table.add(word);
        tokens += 1;
    }
    trace!(
        "slot {}: {} tokens from {} bytes",
        slot,
        tokens,
        chunk.bytes.len()
    );
}

/// Pull up to `capacity` chunks for one batch. The second return value is
/// true once the stream is exhausted (final chunk seen, or nothing left).
fn fill_batch<R: Read + Seek>(
    reader: &mut ChunkReader<R>,
    capacity: usize,
) -> Result<(Vec<Chunk>, bool), Error> {
    let mut batch: Vec<Chunk> = Vec::with_capacity(capacity);
    while batch.len() < capacity {
        match reader.next_chunk()? {
            Some(chunk) => {
                let is_final = chunk.is_final;
                batch.push(chunk);
                if is_final {
                    return Ok((batch, true));
                }
            }
            None => return Ok((batch, true)),
        }
    }
    Ok((batch, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn run_counter(input: &[u8], chunk_size: usize, workers: usize) -> BatchScheduler {
        let mut reader = ChunkReader::new(Cursor::new(input.to_vec()), nz(chunk_size));
        let mut scheduler = BatchScheduler::new(nz(workers)).unwrap();
        scheduler.run(&mut reader).unwrap();
        scheduler
    }

    #[test]
    fn single_batch_single_slot_scenario() {
        let scheduler = run_counter(b"the quick brown fox the", 64, 1);
        assert_eq!(scheduler.chunks_processed(), 1);
        let table = scheduler.into_table();
        assert_eq!(table.get(b"the"), 2);
        assert_eq!(table.get(b"quick"), 1);
        assert_eq!(table.get(b"brown"), 1);
        assert_eq!(table.get(b"fox"), 1);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn slot_table_accumulates_across_batches() {
        // One slot, tiny chunks: every chunk is its own batch, and the
        // single slot table must carry counts from all of them.
        let scheduler = run_counter(b"red blue red green red blue", 10, 1);
        assert!(scheduler.chunks_processed() > 1);
        let slot0 = &scheduler.slots[0];
        assert_eq!(slot0.get(b"red"), 3);
        assert_eq!(slot0.get(b"blue"), 2);
        assert_eq!(slot0.get(b"green"), 1);
    }

    #[test]
    fn short_final_batch_leaves_remaining_slots_untouched() {
        // 4 slots but only enough input for one chunk.
        let scheduler = run_counter(b"solo", 64, 4);
        assert_eq!(scheduler.chunks_processed(), 1);
        assert_eq!(scheduler.slots[0].get(b"solo"), 1);
        for slot in &scheduler.slots[1..] {
            assert!(slot.is_empty());
        }
    }

    #[test]
    fn parallel_run_matches_sequential_reference() {
        let input: Vec<u8> = b"alpha beta gamma delta epsilon "
            .iter()
            .copied()
            .cycle()
            .take(3_000)
            .collect();

        let mut reference = FrequencyTable::new();
        for word in tokenize(&input) {
            reference.add(word);
        }

        for workers in [1, 3, 8] {
            let table = run_counter(&input, 128, workers).into_table();
            assert_eq!(table.total(), reference.total(), "workers = {workers}");
            for (word, count) in reference.iter() {
                assert_eq!(table.get(word), count, "workers = {workers}");
            }
            assert_eq!(table.len(), reference.len());
        }
    }

    #[test]
    fn empty_stream_processes_no_chunks() {
        let scheduler = run_counter(b"", 32, 4);
        assert_eq!(scheduler.chunks_processed(), 0);
        assert!(scheduler.into_table().is_empty());
    }

    #[test]
    fn fill_batch_stops_at_capacity_and_at_final() {
        let mut reader = ChunkReader::new(Cursor::new(b"aa bb cc dd".to_vec()), nz(5));
        let (batch, done) = fill_batch(&mut reader, 2).unwrap();
        assert_eq!(batch.len(), 2);
        assert!(!done);
        let (rest, done) = fill_batch(&mut reader, 2).unwrap();
        assert!(done);
        assert!(rest.last().is_some_and(|c| c.is_final) || rest.is_empty());
    }
}
