use std::io::{self, Read, Seek, SeekFrom};
use std::num::NonZeroUsize;

use tracing::{debug, trace};

/// One bounded byte segment of the input, ready for a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub bytes: Vec<u8>,
    /// Set when the stream ended inside this read; no further chunks follow.
    pub is_final: bool,
}

/// Reads successive chunks of at most `chunk_size` bytes, trimmed so a
/// chunk never ends mid-word.
///
/// After a full read the chunk is cut back to the last space or tab in the
/// window and the stream is repositioned to one byte past that delimiter,
/// so the delimiter is consumed by neither chunk. A short read means the
/// stream is exhausted: those bytes ship untrimmed as the final chunk.
pub struct ChunkReader<R> {
    inner: R,
    chunk_size: usize,
    done: bool,
}

/// Bytes treated as safe trim points at chunk boundaries. The tokenizer
/// splits on space only; see `tokenize` for the asymmetry.
const DELIMITERS: [u8; 2] = [b' ', b'\t'];

impl<R: Read + Seek> ChunkReader<R> {
    pub fn new(inner: R, chunk_size: NonZeroUsize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.get(),
            done: false,
        }
    }

    /// Next chunk of the stream, or `None` once it is exhausted.
    pub fn next_chunk(&mut self) -> io::Result<Option<Chunk>> {
        if self.done {
            return Ok(None);
        }

        let mut buf: Vec<u8> = vec![0; self.chunk_size];
        let read = read_full(&mut self.inner, &mut buf)?;

        if read < self.chunk_size {
            // Short read: end of stream. Whatever is left is the final
            // chunk, untrimmed.
            self.done = true;
            if read == 0 {
                return Ok(None);
            }
            buf.truncate(read);
            debug!("final chunk: {} bytes", read);
            return Ok(Some(Chunk {
                bytes: buf,
                is_final: true,
            }));
        }

        match buf.iter().rposition(|b| DELIMITERS.contains(b)) {
            Some(pos) => {
                // Exclude the delimiter from this chunk and restart the
                // next read one byte past it.
                let rewind = (read - pos - 1) as i64;
                self.inner.seek(SeekFrom::Current(-rewind))?;
                buf.truncate(pos);
                trace!("chunk trimmed to {} bytes, rewound {}", pos, rewind);
            }
            None => {
                // No safe trim point in the whole window: ship it as-is and
                // keep going, splitting a word longer than the chunk size.
                debug!("no delimiter in {}-byte window, emitting untrimmed", read);
            }
        }

        Ok(Some(Chunk {
            bytes: buf,
            is_final: false,
        }))
    }
}

/// Read until `buf` is full or the stream ends, retrying short reads.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
