use std::io::{self, BufReader, Cursor, Read};

/// A buffered byte reader supporting the pushback that greedy matching
/// needs.
///
/// Like `std`'s [`BufReader`], this coalesces many small reads into fewer
/// larger reads of the underlying data source. On top of that it keeps the
/// bytes it has already handed out, so a caller that speculatively consumed
/// past a match boundary can [`rewind`][Self::rewind] and make the stream
/// reproduce exactly the unconsumed suffix. A [`commit`][Self::commit] call
/// marks a confirmed match boundary; only bytes behind the most recent
/// commit may be discarded from the retention buffer, so pushback is
/// guaranteed up to that point.
///
/// IO errors are handled asynchronously: a failed read makes the source
/// look exhausted, and the stored error can be retrieved with
/// [`check_io_error`][Self::check_io_error] once the consuming logic has
/// run out of input.
pub struct ByteSource<'a> {
    read: Box<dyn Read + 'a>,
    buf: Vec<u8>,
    // `buf[..len]` is valid data, `buf[..pos]` is consumed history,
    // `fence <= pos` always holds.
    pos: usize,
    len: usize,
    fence: usize,
    complete: bool,
    io_error: Option<io::Error>,
    pos_of_buf: usize,
    chunk_size: usize,
}

impl<'a> ByteSource<'a> {
    const DEFAULT_CHUNK_SIZE: usize = 16 << 10;

    /// Creates a [`ByteSource`] for the data of a [`BufReader`].
    pub fn from_buf_reader(buf_reader: BufReader<impl Read + 'a>) -> Self {
        // Avoid double buffering without discarding any already buffered contents.
        let buf_data = buf_reader.buffer().to_vec();
        if buf_data.is_empty() {
            Self::from_read(buf_reader.into_inner())
        } else {
            Self::from_read(Cursor::new(buf_data).chain(buf_reader.into_inner()))
        }
    }

    /// Creates a [`ByteSource`] for the data of a [`Read`] instance.
    ///
    /// If the [`Read`] instance is a [`BufReader`], it is better to use
    /// [`from_buf_reader`][Self::from_buf_reader] to avoid unnecessary
    /// double buffering of the data.
    pub fn from_read(read: impl Read + 'a) -> Self {
        Self::from_boxed_dyn_read(Box::new(read))
    }

    /// Creates a [`ByteSource`] for the data of a boxed [`Read`] instance.
    #[inline(never)]
    pub fn from_boxed_dyn_read(read: Box<dyn Read + 'a>) -> Self {
        ByteSource {
            read,
            buf: vec![],
            pos: 0,
            len: 0,
            fence: 0,
            complete: false,
            io_error: None,
            pos_of_buf: 0,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the number of bytes that are read at once.
    ///
    /// This is just an upper bound on the size of the [`read`][Read::read]
    /// requests made; depending on the [`Read`] implementation, smaller
    /// amounts may be read at once.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Consumes and returns the next byte, or `None` at the end of the
    /// available data.
    ///
    /// "End of the available data" is the end of the input or the point
    /// where an IO error was encountered; use
    /// [`check_io_error`][Self::check_io_error] to tell the two apart.
    #[inline]
    pub fn read_byte(&mut self) -> Option<u8> {
        if self.pos < self.len {
            let byte = self.buf[self.pos];
            self.pos += 1;
            Some(byte)
        } else {
            self.read_byte_cold()
        }
    }

    #[cold]
    #[inline(never)]
    fn read_byte_cold(&mut self) -> Option<u8> {
        while self.pos >= self.len {
            if !self.refill() {
                return None;
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Some(byte)
    }

    /// Pushes the `n` most recently consumed bytes back onto the stream.
    ///
    /// The bytes are retained by the source, so subsequent reads reproduce
    /// them in their original order. This panics when `n` exceeds the
    /// number of bytes consumed since the last [`commit`][Self::commit].
    #[inline]
    pub fn rewind(&mut self, n: usize) {
        assert!(
            n <= self.pos - self.fence,
            "rewound past the last committed boundary"
        );
        self.pos -= n;
    }

    /// Declares the current position a confirmed boundary.
    ///
    /// Bytes before the boundary can no longer be rewound over and may be
    /// dropped from the retention buffer.
    #[inline]
    pub fn commit(&mut self) {
        self.fence = self.pos;
    }

    /// Returns whether the cursor is at the end of the available data.
    ///
    /// This may need to read ahead a single byte's worth of data.
    pub fn is_at_end(&mut self) -> bool {
        while self.pos >= self.len {
            if !self.refill() {
                return true;
            }
        }
        false
    }

    /// Total number of bytes consumed so far, not counting rewound bytes.
    ///
    /// This wraps around every `usize::MAX` bytes.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos_of_buf.wrapping_add(self.pos)
    }

    /// Returns an encountered IO error as `Err(io_err)`.
    ///
    /// This resets the stored IO error and returns `Ok(())` if no IO error
    /// is stored.
    #[inline]
    pub fn check_io_error(&mut self) -> io::Result<()> {
        if let Some(err) = self.io_error.take() {
            Err(err)
        } else {
            Ok(())
        }
    }

    /// Returns a reference to an encountered IO error.
    ///
    /// This does not reset the stored IO error and returns `None` if no IO
    /// error is stored.
    #[inline]
    pub fn io_error(&self) -> Option<&io::Error> {
        self.io_error.as_ref()
    }

    /// Tries to extend the buffer by reading more data. Returns `false`
    /// once the input is exhausted or an IO error was stored.
    #[cold]
    #[inline(never)]
    fn refill(&mut self) -> bool {
        if self.complete {
            return false;
        }

        // Drop committed history once it outgrows two chunks.
        if self.fence > self.chunk_size * 2 {
            self.buf.copy_within(self.fence..self.len, 0);
            self.pos_of_buf = self.pos_of_buf.wrapping_add(self.fence);
            self.pos -= self.fence;
            self.len -= self.fence;
            self.fence = 0;

            // If the buffer is four times as large as the retained data and
            // an additional chunk need, shrink it.
            if self.buf.len() > 4 * (self.len + self.chunk_size) {
                self.buf.truncate(self.buf.len() / 2);
                self.buf.shrink_to_fit();
            }
        }

        let target_end = self.len + self.chunk_size;

        if self.buf.len() < target_end {
            self.buf.resize(target_end, 0);
        }

        // Do only a single successful read (to make line buffered repls
        // usable), but do retry on `Interrupted`.
        loop {
            match self.read.read(&mut self.buf[self.len..target_end]) {
                Ok(0) => self.complete = true,
                Ok(n) => {
                    assert!(
                        n <= self.chunk_size,
                        "invariant of std::io::Read trait violated"
                    );
                    self.len += n;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.io_error = Some(err);
                    self.complete = true;
                }
            }
            break;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_order() {
        let mut src = ByteSource::from_read("abc".as_bytes());
        assert_eq!(src.read_byte(), Some(b'a'));
        assert_eq!(src.read_byte(), Some(b'b'));
        assert_eq!(src.read_byte(), Some(b'c'));
        assert_eq!(src.read_byte(), None);
        assert!(src.is_at_end());
    }

    #[test]
    fn rewind_reproduces_the_suffix() {
        let mut src = ByteSource::from_read("hello".as_bytes());
        for _ in 0..4 {
            src.read_byte();
        }
        src.rewind(3);
        assert_eq!(src.position(), 1);
        let rest: Vec<u8> = std::iter::from_fn(|| src.read_byte()).collect();
        assert_eq!(rest, b"ello");
    }

    #[test]
    fn rewind_works_across_refills() {
        let data: Vec<u8> = (0..100u8).collect();
        let mut src = ByteSource::from_read(&data[..]);
        src.set_chunk_size(7);
        for _ in 0..50 {
            src.read_byte();
        }
        src.rewind(50);
        let replayed: Vec<u8> = std::iter::from_fn(|| src.read_byte()).collect();
        assert_eq!(replayed, data);
    }

    #[test]
    fn committed_history_is_dropped() {
        let data = vec![b'x'; 1000];
        let mut src = ByteSource::from_read(&data[..]);
        src.set_chunk_size(8);
        for _ in 0..900 {
            src.read_byte();
            src.commit();
        }
        // The retention buffer stays bounded by a few chunks.
        assert!(src.buf.len() < 100);
        src.rewind(0);
        assert_eq!(src.position(), 900);
        assert_eq!(src.read_byte(), Some(b'x'));
    }

    #[test]
    #[should_panic(expected = "rewound past the last committed boundary")]
    fn rewind_past_commit_panics() {
        let mut src = ByteSource::from_read("ab".as_bytes());
        src.read_byte();
        src.commit();
        src.rewind(1);
    }

    #[test]
    fn from_buf_reader_keeps_buffered_data() {
        let mut buf_reader = BufReader::with_capacity(4, "abcdef".as_bytes());
        use std::io::BufRead;
        buf_reader.fill_buf().unwrap();
        let mut src = ByteSource::from_buf_reader(buf_reader);
        let all: Vec<u8> = std::iter::from_fn(|| src.read_byte()).collect();
        assert_eq!(all, b"abcdef");
    }

    #[test]
    fn io_errors_are_deferred() {
        struct FailAfter(usize);
        impl Read for FailAfter {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if self.0 == 0 {
                    Err(io::Error::new(io::ErrorKind::Other, "boom"))
                } else {
                    let n = buf.len().min(self.0);
                    buf[..n].fill(b'y');
                    self.0 -= n;
                    Ok(n)
                }
            }
        }

        let mut src = ByteSource::from_read(FailAfter(3));
        src.set_chunk_size(2);
        let read: Vec<u8> = std::iter::from_fn(|| src.read_byte()).collect();
        assert_eq!(read, b"yyy");
        assert!(src.io_error().is_some());
        assert!(src.check_io_error().is_err());
        assert!(src.check_io_error().is_ok());
    }
}
