use std::io::{self, Read};

/// A pull-based character supply for [`Reader`](crate::Reader).
pub trait CharSource {
    /// Appends roughly `max` characters to `out` and returns how many were
    /// added. Zero means the source is exhausted.
    fn read_chars(&mut self, out: &mut Vec<char>, max: usize) -> io::Result<usize>;
}

/// A source with nothing left to give; used once the whole input is
/// already in the lookahead buffer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Exhausted;

impl CharSource for Exhausted {
    fn read_chars(&mut self, _out: &mut Vec<char>, _max: usize) -> io::Result<usize> {
        Ok(0)
    }
}

impl<I: Iterator<Item = char>> CharSource for std::iter::Fuse<I> {
    fn read_chars(&mut self, out: &mut Vec<char>, max: usize) -> io::Result<usize> {
        let before = out.len();
        out.extend(self.take(max));
        Ok(out.len() - before)
    }
}

const CHUNK: usize = 4096;

/// Decodes UTF-8 from any [`Read`] as characters are requested.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
    bytes: Vec<u8>,
    pending: usize,
    eof: bool,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            bytes: vec![0; CHUNK],
            pending: 0,
            eof: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self) -> io::Result<usize> {
        if self.pending == self.bytes.len() {
            self.bytes.resize(self.bytes.len() * 2, 0);
        }
        loop {
            match self.inner.read(&mut self.bytes[self.pending..]) {
                Ok(count) => return Ok(count),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: Read> CharSource for IoSource<R> {
    fn read_chars(&mut self, out: &mut Vec<char>, max: usize) -> io::Result<usize> {
        let before = out.len();
        while out.len() - before < max && !self.eof {
            let count = self.fill()?;
            if count == 0 {
                self.eof = true;
                if self.pending > 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "stream ended inside a UTF-8 sequence",
                    ));
                }
                break;
            }
            self.pending += count;

            let valid = match std::str::from_utf8(&self.bytes[..self.pending]) {
                Ok(text) => text.len(),
                Err(err) if err.error_len().is_none() => err.valid_up_to(),
                Err(err) => {
                    return Err(io::Error::new(io::ErrorKind::InvalidData, err));
                }
            };
            let text = std::str::from_utf8(&self.bytes[..valid])
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            out.extend(text.chars());

            self.bytes.copy_within(valid..self.pending, 0);
            self.pending -= valid;
        }
        Ok(out.len() - before)
    }
}
