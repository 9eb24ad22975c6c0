//! Communication between the two parties of the membership protocol.
//!
//! [`Channel`] wraps a full-duplex byte stream (a `TcpStream`, or a
//! [`local::LocalSocket`] in tests) with read and write buffers, and knows how
//! to frame the values the protocol exchanges: fixed-width integers and
//! arbitrary precision integers.

#![deny(missing_docs)]

use std::io::{Read, Write};

use eyre::Context;
use num_bigint::{BigInt, BigUint, Sign};

pub mod local;

/// Largest big integer frame (in bytes) a [`Channel`] accepts. Protects the
/// reader from allocating whatever length a misbehaving peer announces.
pub const MAX_BIGINT_BYTES: usize = 1 << 20;

trait ReadWrite: Read + Write {}
impl<T: Read + Write + ?Sized> ReadWrite for T {}

/// A tag denoting that an error was caused by the network.
///
/// ```rust
/// use psmt_channel::NetworkError;
///
/// let e = eyre::eyre!("connection reset").wrap_err(NetworkError);
/// assert!(e.is::<NetworkError>());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkError;
impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
impl std::error::Error for NetworkError {}

/// Sizes (in bytes) of the read and write buffers of a [`Channel`].
#[derive(Clone, Copy, Debug)]
pub struct BufferSizes {
    /// Size of the read buffer.
    pub read: usize,
    /// Size of the write buffer.
    pub write: usize,
}
impl Default for BufferSizes {
    fn default() -> Self {
        BufferSizes {
            read: 64 * 1024,
            write: 16 * 1024,
        }
    }
}

/// A buffered channel to the peer.
///
/// Writes are buffered and flushed automatically before any read, so a party
/// never waits on a reply to a message that is still sitting in its own
/// buffer. On error the channel is left in an unknown state and should be
/// dropped.
pub struct Channel<'a> {
    inner: &'a mut dyn ReadWrite,
    read_buffer: Vec<u8>,
    // Unconsumed bytes are `read_buffer[read_pos..read_end]`.
    read_pos: usize,
    read_end: usize,
    write_buffer: Vec<u8>,
}

impl Channel<'_> {
    /// Run `thunk` with a [`Channel`] wrapping `inner`, using the default
    /// [`BufferSizes`].
    pub fn with<C, T, F>(inner: C, thunk: F) -> eyre::Result<T>
    where
        for<'a, 'b> F: FnOnce(&'a mut Channel<'b>) -> eyre::Result<T>,
        C: Read + Write,
    {
        Self::with_sizes(inner, BufferSizes::default(), thunk)
    }

    /// Run `thunk` with a [`Channel`] wrapping `inner`.
    ///
    /// Outstanding writes are flushed before returning. Since the channel does
    /// its own buffering, `inner` should be unbuffered.
    pub fn with_sizes<C, T, F>(mut inner: C, sizes: BufferSizes, thunk: F) -> eyre::Result<T>
    where
        for<'a, 'b> F: FnOnce(&'a mut Channel<'b>) -> eyre::Result<T>,
        C: Read + Write,
    {
        let mut channel = Channel {
            inner: &mut inner,
            read_buffer: vec![0; sizes.read.max(1)],
            read_pos: 0,
            read_end: 0,
            write_buffer: Vec::with_capacity(sizes.write.max(1)),
        };
        let out = thunk(&mut channel)?;
        channel.flush()?;
        Ok(out)
    }

    /// Write buffered bytes to the peer and flush the underlying stream.
    pub fn flush(&mut self) -> eyre::Result<()> {
        if self.write_buffer.is_empty() {
            return Ok(());
        }
        self.inner
            .write_all(&self.write_buffer)
            .wrap_err(NetworkError)?;
        self.write_buffer.clear();
        self.inner.flush().wrap_err(NetworkError)
    }

    /// Write all of `bytes` to the peer.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> eyre::Result<()> {
        let available = self.write_buffer.capacity() - self.write_buffer.len();
        if bytes.len() <= available {
            self.write_buffer.extend_from_slice(bytes);
            return Ok(());
        }
        self.flush()?;
        if bytes.len() <= self.write_buffer.capacity() {
            self.write_buffer.extend_from_slice(bytes);
        } else {
            // Too big to buffer. Flush right away, since an empty write buffer
            // is what tells `flush` there is nothing outstanding.
            self.inner.write_all(bytes).wrap_err(NetworkError)?;
            self.inner.flush().wrap_err(NetworkError)?;
        }
        Ok(())
    }

    /// Fill `dst` with bytes from the peer.
    pub fn read_bytes(&mut self, mut dst: &mut [u8]) -> eyre::Result<()> {
        self.flush()?;
        while !dst.is_empty() {
            if self.read_pos < self.read_end {
                let n = (self.read_end - self.read_pos).min(dst.len());
                let (head, tail) = dst.split_at_mut(n);
                head.copy_from_slice(&self.read_buffer[self.read_pos..self.read_pos + n]);
                self.read_pos += n;
                dst = tail;
            } else if dst.len() >= self.read_buffer.len() {
                return self.inner.read_exact(dst).wrap_err(NetworkError);
            } else {
                self.refill()?;
            }
        }
        Ok(())
    }

    fn refill(&mut self) -> eyre::Result<()> {
        loop {
            match self.inner.read(&mut self.read_buffer) {
                Ok(0) => {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "peer closed the channel",
                    ))
                    .wrap_err(NetworkError)
                }
                Ok(n) => {
                    self.read_pos = 0;
                    self.read_end = n;
                    return Ok(());
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).wrap_err(NetworkError),
            }
        }
    }

    /// Write a `u64` (little-endian).
    pub fn write_u64(&mut self, x: u64) -> eyre::Result<()> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Read a `u64` (little-endian).
    pub fn read_u64(&mut self) -> eyre::Result<u64> {
        let mut buf = [0u8; 8];
        self.read_bytes(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }

    /// Write a `usize`, as a `u64`.
    pub fn write_usize(&mut self, x: usize) -> eyre::Result<()> {
        self.write_u64(x as u64)
    }

    /// Read a `usize` written with [`Self::write_usize`].
    pub fn read_usize(&mut self) -> eyre::Result<usize> {
        let x = self.read_u64()?;
        usize::try_from(x).wrap_err_with(|| format!("{x} does not fit in a usize"))
    }

    /// Write a non-negative big integer: its byte length as a `u64`, then its
    /// little-endian magnitude.
    pub fn write_biguint(&mut self, x: &BigUint) -> eyre::Result<()> {
        let bytes = x.to_bytes_le();
        self.write_usize(bytes.len())?;
        self.write_bytes(&bytes)
    }

    /// Read a big integer written with [`Self::write_biguint`].
    pub fn read_biguint(&mut self) -> eyre::Result<BigUint> {
        let len = self.read_usize()?;
        if len > MAX_BIGINT_BYTES {
            eyre::bail!("big integer frame of {len} bytes exceeds {MAX_BIGINT_BYTES}");
        }
        let mut bytes = vec![0u8; len];
        self.read_bytes(&mut bytes)?;
        Ok(BigUint::from_bytes_le(&bytes))
    }

    /// Write a signed big integer: a sign byte (1 for negative) followed by
    /// the magnitude, framed as in [`Self::write_biguint`].
    pub fn write_bigint(&mut self, x: &BigInt) -> eyre::Result<()> {
        self.write_bytes(&[u8::from(x.sign() == Sign::Minus)])?;
        self.write_biguint(x.magnitude())
    }

    /// Read a signed big integer written with [`Self::write_bigint`].
    pub fn read_bigint(&mut self) -> eyre::Result<BigInt> {
        let mut sign = [0u8; 1];
        self.read_bytes(&mut sign)?;
        let sign = match sign[0] {
            0 => Sign::Plus,
            1 => Sign::Minus,
            b => eyre::bail!("invalid sign byte {b}"),
        };
        let magnitude = self.read_biguint()?;
        Ok(BigInt::from_biguint(sign, magnitude))
    }
}
