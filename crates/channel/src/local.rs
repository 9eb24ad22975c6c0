//! Intra-process sockets and channels, for tests and benchmarks.

use std::io::{Read, Write};

use eyre::Context;

use crate::Channel;

/// One end of an intra-process full-duplex socket.
pub struct LocalSocket {
    #[cfg(unix)]
    inner: std::os::unix::net::UnixStream,
    #[cfg(not(unix))]
    inner: std::net::TcpStream,
}

impl LocalSocket {
    /// Create a connected pair of sockets.
    pub fn pair() -> eyre::Result<(Self, Self)> {
        #[cfg(unix)]
        let (a, b) = std::os::unix::net::UnixStream::pair().context("creating LocalSocket pair")?;
        #[cfg(not(unix))]
        let (a, b) = tcp_socketpair().context("creating LocalSocket pair")?;
        Ok((LocalSocket { inner: a }, LocalSocket { inner: b }))
    }
}

#[cfg(not(unix))]
fn tcp_socketpair() -> eyre::Result<(std::net::TcpStream, std::net::TcpStream)> {
    // Port 0 lets the OS pick a free port.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").context("binding 127.0.0.1:0")?;
    let addr = listener.local_addr().context("reading local_addr()")?;
    let connecting = std::thread::spawn(move || std::net::TcpStream::connect(addr));
    let (accepted, _) = listener.accept().context("accept() failed")?;
    let connected = connecting
        .join()
        .map_err(|_| eyre::eyre!("connecting thread panicked"))?
        .context("connect() failed")?;
    Ok((accepted, connected))
}

impl Read for LocalSocket {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Write for LocalSocket {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.inner.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Run `side_f` on the current thread and `side_g` on a scoped thread, each
/// with its end of a fresh [`Channel`] pair, and return both results.
///
/// ```
/// let (a, ()) = psmt_channel::local::local_channel_pair(
///     |c| c.read_u64(),
///     |c| c.write_u64(42),
/// )
/// .unwrap();
/// assert_eq!(a, 42);
/// ```
pub fn local_channel_pair<T, U: Send, F, G>(side_f: F, side_g: G) -> eyre::Result<(T, U)>
where
    for<'a, 'b> F: FnOnce(&'b mut Channel<'a>) -> eyre::Result<T>,
    for<'a, 'b> G: Send + FnOnce(&'b mut Channel<'a>) -> eyre::Result<U>,
{
    let (f_sock, g_sock) = LocalSocket::pair()?;
    std::thread::scope(|scope| {
        let handle = scope.spawn(move || Channel::with(g_sock, side_g));
        let f_result = Channel::with(f_sock, side_f);
        let g_result = handle
            .join()
            .map_err(|_| eyre::eyre!("channel peer thread panicked"))?;
        match (f_result, g_result) {
            (Ok(f), Ok(g)) => Ok((f, g)),
            (Ok(_), Err(e)) | (Err(e), Ok(_)) => Err(e),
            (Err(f), Err(g)) => Err(f.wrap_err(g)),
        }
    })
}
