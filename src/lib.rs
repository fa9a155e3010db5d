//! Batch-parallel word frequency counting over fixed-size byte chunks.
//!
//! The input stream is split into chunks that never end mid-word: each
//! chunk is trimmed back to the last space or tab in its read window and
//! the stream is repositioned just past that delimiter. Chunks are
//! processed in batches of up to `workers` at a time, one worker per
//! chunk, each accumulating into its own slot's [`FrequencyTable`]; a hard
//! join barrier separates batches, so no slot table is ever shared between
//! running workers. After the last batch the per-slot tables are merged by
//! summing counts into the single global table.
//!
//! Words are exact byte sequences separated by spaces: case-sensitive, no
//! normalization, and a tab inside a chunk counts as a word byte even
//! though the chunk reader trims at tabs.

pub mod chunk;
pub mod error;
pub mod scheduler;
pub mod table;
pub mod tokenize;

use std::io::{Read, Seek};
use std::num::NonZeroUsize;

pub use crate::chunk::{Chunk, ChunkReader};
pub use crate::error::Error;
pub use crate::scheduler::BatchScheduler;
pub use crate::table::{merge, FrequencyTable};
pub use crate::tokenize::tokenize;

const fn nonzero(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(v) => v,
        None => panic!("value must be non-zero"),
    }
}

/// Default number of bytes read per chunk.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = nonzero(300);

/// Default number of worker slots per batch.
pub const DEFAULT_WORKERS: NonZeroUsize = nonzero(30);

/// Tuning knobs for a counting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bytes read per chunk before boundary trimming.
    pub chunk_size: NonZeroUsize,
    /// Worker slots, i.e. chunks processed concurrently per batch.
    pub workers: NonZeroUsize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Count word frequencies across the whole of `input`.
///
/// Drives a [`ChunkReader`] and a [`BatchScheduler`] to completion and
/// merges the slot tables into the returned global table. An empty input
/// yields an empty table.
pub fn count<R: Read + Seek>(input: R, config: &Config) -> Result<FrequencyTable, Error> {
    let mut reader: ChunkReader<R> = ChunkReader::new(input, config.chunk_size);
    let mut scheduler = BatchScheduler::new(config.workers)?;
    scheduler.run(&mut reader)?;
    Ok(scheduler.into_table())
}
