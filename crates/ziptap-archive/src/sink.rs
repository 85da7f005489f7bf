use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkState {
    Open,
    Writing,
    Closed,
}

/// Write-only archive destination with an explicit lifecycle.
///
/// A sink starts `Open`, moves to `Writing` on the first accepted byte and
/// rejects every write or flush once `Closed`.
#[derive(Debug)]
pub struct Sink<W: Write> {
    inner: W,
    state: SinkState,
    bytes_written: u64,
}

impl<W: Write> Sink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            state: SinkState::Open,
            bytes_written: 0,
        }
    }

    pub fn state(&self) -> SinkState {
        self.state
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes and closes. Closing an already closed sink is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        if self.state == SinkState::Closed {
            return Ok(());
        }
        self.state = SinkState::Closed;
        self.inner.flush()
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn ensure_open(&self) -> io::Result<()> {
        if self.state == SinkState::Closed {
            return Err(io::Error::other("sink is closed"));
        }
        Ok(())
    }
}

impl<W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_open()?;
        let n = self.inner.write(buf)?;
        if n > 0 {
            self.state = SinkState::Writing;
            self.bytes_written += n as u64;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        self.inner.flush()
    }
}
