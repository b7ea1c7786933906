// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Input sources and the background pump that drains them.
//
// `Reader` is the capability the prompt reads keys through: open (enter raw
// mode), close (leave it), a non-blocking `read`, and the window size. The
// TTY implementation polls stdin with a zero timeout so `read` never blocks;
// "nothing yet" is reported as `ErrorKind::WouldBlock`.
//
// `InputPump` owns one named thread that keeps calling `read` and pushes
// every non-empty chunk into a bounded channel. When a read would block it
// sleeps a short idle backoff, so the consumer's `recv_timeout()` wakes up
// regularly and can notice resize and terminate signals. The pump never
// touches editor state; it only moves bytes.
//
// The consumer pauses the pump while a submitted line executes (the command
// may want stdin for itself), then resumes it. Pausing is a flag checked
// under the reader lock, so once `pause()` returns and the consumer holds
// that lock, no further read can happen.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::terminal::{Size, Terminal};

/// Byte chunk read from stdin.
///
/// Sized for typical terminal input: a single keypress is 1-6 bytes,
/// a paste can be kilobytes. 4 KB handles both without waste.
pub const READ_BUF_SIZE: usize = 4096;

/// Sleep between polls when no input is available.
pub const IDLE_BACKOFF: Duration = Duration::from_millis(10);

/// Capacity of the chunk channel between pump and consumer.
pub const QUEUE_CAPACITY: usize = 128;

// ─── Reader ──────────────────────────────────────────────────────────────────

/// A source of raw terminal input.
pub trait Reader {
    /// Prepare for reading (raw mode on).
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal mode cannot be changed.
    fn open(&mut self) -> io::Result<()>;

    /// Undo [`open`](Self::open) (raw mode off).
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal mode cannot be restored.
    fn close(&mut self) -> io::Result<()>;

    /// Read available bytes without blocking.
    ///
    /// `Ok(0)` means end of input. `ErrorKind::WouldBlock` means nothing is
    /// available right now.
    ///
    /// # Errors
    ///
    /// Returns `WouldBlock` / `Interrupted` for transient conditions, any
    /// other error is fatal for this source.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Current window size.
    fn window_size(&self) -> Size;
}

/// Whether a read error should be retried after the idle backoff.
#[must_use]
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
    )
}

// ─── TtyReader ───────────────────────────────────────────────────────────────

/// [`Reader`] over the process's stdin terminal.
#[derive(Default)]
pub struct TtyReader {
    terminal: Terminal,
}

impl TtyReader {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            terminal: Terminal::new(),
        }
    }
}

impl Reader for TtyReader {
    fn open(&mut self) -> io::Result<()> {
        self.terminal.enter()
    }

    fn close(&mut self) -> io::Result<()> {
        self.terminal.leave()
    }

    #[cfg(unix)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();

        // Zero-timeout poll: report readiness without waiting.
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, 0)
        };
        if ready < 0 {
            return Err(io::Error::last_os_error());
        }
        if ready == 0 {
            return Err(io::ErrorKind::WouldBlock.into());
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr().cast(), buf.len()) };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    /// Non-unix fallback: a blocking read.
    #[cfg(not(unix))]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use std::io::Read;
        io::stdin().lock().read(buf)
    }

    fn window_size(&self) -> Size {
        self.terminal.size()
    }
}

// ─── ScriptReader ────────────────────────────────────────────────────────────

/// In-memory [`Reader`] that replays a fixed list of chunks.
///
/// Each `read` returns exactly one chunk, as a terminal delivers one
/// keypress per read. Once the script is exhausted it reports end of input.
/// Used to drive the prompt headlessly.
#[derive(Debug, Clone)]
pub struct ScriptReader {
    chunks: VecDeque<Vec<u8>>,
    size: Size,
    opened: usize,
    closed: usize,
}

impl ScriptReader {
    pub fn new<I, C>(chunks: I, size: Size) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            size,
            opened: 0,
            closed: 0,
        }
    }

    /// Chunks not read yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chunks.len()
    }

    /// How many times `open` / `close` were called.
    #[must_use]
    pub const fn open_close_counts(&self) -> (usize, usize) {
        (self.opened, self.closed)
    }

    /// Change the reported window size.
    pub const fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}

impl Reader for ScriptReader {
    fn open(&mut self) -> io::Result<()> {
        self.opened += 1;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed += 1;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut chunk) = self.chunks.pop_front() else {
            return Ok(0);
        };
        if chunk.len() > buf.len() {
            let rest = chunk.split_off(buf.len());
            self.chunks.push_front(rest);
        }
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }

    fn window_size(&self) -> Size {
        self.size
    }
}

// ─── InputPump ───────────────────────────────────────────────────────────────

/// Background thread moving chunks from a shared [`Reader`] into a channel.
///
/// The channel closes when the reader hits end of input or a fatal error,
/// or after [`stop`](Self::stop). Dropping the pump stops it.
///
/// # Example
///
/// ```no_run
/// use std::sync::{Arc, Mutex};
/// use n_term::reader::{InputPump, TtyReader};
///
/// let reader = Arc::new(Mutex::new(TtyReader::new()));
/// let (pump, rx) = InputPump::spawn(Arc::clone(&reader))?;
/// while let Ok(bytes) = rx.recv() {
///     println!("got {} bytes", bytes.len());
/// }
/// drop(pump);
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct InputPump {
    /// The pump thread handle. `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl InputPump {
    /// Spawn the pump thread over `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS cannot spawn a thread.
    pub fn spawn<R>(reader: Arc<Mutex<R>>) -> io::Result<(Self, Receiver<Vec<u8>>)>
    where
        R: Reader + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let pause_flag = Arc::clone(&paused);

        let handle = thread::Builder::new()
            .name("input-pump".into())
            .spawn(move || pump_loop(&reader, &tx, &stop_flag, &pause_flag))?;

        Ok((
            Self {
                handle: Some(handle),
                stop,
                paused,
            },
            rx,
        ))
    }

    /// Stop reading until [`resume`](Self::resume). Chunks already queued
    /// stay in the channel.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Signal the thread to exit and wait for it.
    ///
    /// Idempotent: calling `stop()` after the thread has already
    /// exited is a no-op.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The pump thread's main loop.
fn pump_loop<R: Reader>(
    reader: &Mutex<R>,
    tx: &SyncSender<Vec<u8>>,
    stop: &AtomicBool,
    paused: &AtomicBool,
) {
    let mut buf = [0u8; READ_BUF_SIZE];

    while !stop.load(Ordering::SeqCst) {
        let result = {
            let Ok(mut guard) = reader.lock() else {
                tracing::warn!(target: "input", "reader lock poisoned, stopping pump");
                break;
            };
            // Re-checked under the lock: the consumer pauses, then locks.
            if paused.load(Ordering::SeqCst) {
                None
            } else {
                Some(guard.read(&mut buf))
            }
        };

        match result {
            None => thread::sleep(IDLE_BACKOFF),
            Some(Ok(0)) => {
                tracing::debug!(target: "input", "end of input");
                break;
            }
            Some(Ok(n)) => {
                tracing::trace!(target: "input", bytes = n, "chunk");
                if !deliver(tx, buf[..n].to_vec(), stop) {
                    break;
                }
            }
            Some(Err(ref e)) if is_transient(e) => thread::sleep(IDLE_BACKOFF),
            Some(Err(e)) => {
                tracing::warn!(target: "input", error = %e, "read failed, stopping pump");
                break;
            }
        }
    }
}

/// Queue `chunk`, waiting while the channel is full. Returns `false` once
/// the receiver is gone or the pump has been told to stop, so a consumer
/// that quits with a backlog never leaves the thread blocked in a send.
fn deliver(tx: &SyncSender<Vec<u8>>, mut chunk: Vec<u8>, stop: &AtomicBool) -> bool {
    loop {
        match tx.try_send(chunk) {
            Ok(()) => return true,
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(back)) => {
                if stop.load(Ordering::SeqCst) {
                    tracing::debug!(target: "input", "stopped with a full queue");
                    return false;
                }
                chunk = back;
                thread::sleep(IDLE_BACKOFF);
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Size = Size { cols: 40, rows: 10 };

    /// Reader that always reports "nothing yet".
    struct Idle;

    impl Reader for Idle {
        fn open(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::WouldBlock.into())
        }
        fn window_size(&self) -> Size {
            SIZE
        }
    }

    /// Reader that fails permanently.
    struct Broken;

    impl Reader for Broken {
        fn open(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn close(&mut self) -> io::Result<()> {
            Ok(())
        }
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
        fn window_size(&self) -> Size {
            SIZE
        }
    }

    // ── Constants ───────────────────────────────────────────────────────

    #[test]
    fn read_buf_size_reasonable() {
        assert!(READ_BUF_SIZE >= 1024);
        assert!(READ_BUF_SIZE <= 65536);
    }

    #[test]
    fn idle_backoff_is_short() {
        assert!(IDLE_BACKOFF <= Duration::from_millis(50));
    }

    #[test]
    fn transient_errors() {
        assert!(is_transient(&io::ErrorKind::WouldBlock.into()));
        assert!(is_transient(&io::ErrorKind::Interrupted.into()));
        assert!(!is_transient(&io::ErrorKind::BrokenPipe.into()));
    }

    // ── ScriptReader ────────────────────────────────────────────────────

    #[test]
    fn script_returns_one_chunk_per_read() {
        let mut r = ScriptReader::new(["ab", "\x1b[A"], SIZE);
        let mut buf = [0u8; 16];
        assert_eq!(r.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ab");
        assert_eq!(r.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], b"\x1b[A");
        assert_eq!(r.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn script_splits_oversized_chunk() {
        let mut r = ScriptReader::new(["abcdef"], SIZE);
        let mut buf = [0u8; 4];
        assert_eq!(r.read(&mut buf).unwrap(), 4);
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.read(&mut buf).unwrap(), 2);
        assert_eq!(&buf[..2], b"ef");
    }

    #[test]
    fn script_counts_open_close() {
        let mut r = ScriptReader::new(Vec::<Vec<u8>>::new(), SIZE);
        r.open().unwrap();
        r.close().unwrap();
        r.open().unwrap();
        assert_eq!(r.open_close_counts(), (2, 1));
        assert_eq!(r.window_size(), SIZE);
    }

    // ── InputPump ───────────────────────────────────────────────────────

    #[test]
    fn pump_forwards_chunks_then_closes() {
        let reader = Arc::new(Mutex::new(ScriptReader::new(["x", "yz"], SIZE)));
        let (_pump, rx) = InputPump::spawn(reader).unwrap();
        let got: Vec<Vec<u8>> = rx.iter().collect();
        assert_eq!(got, vec![b"x".to_vec(), b"yz".to_vec()]);
    }

    #[test]
    fn pump_stops_on_fatal_error() {
        let reader = Arc::new(Mutex::new(Broken));
        let (_pump, rx) = InputPump::spawn(reader).unwrap();
        assert!(rx.recv_timeout(Duration::from_secs(1)).is_err());
    }

    #[test]
    fn idle_pump_stays_open_until_stopped() {
        let reader = Arc::new(Mutex::new(Idle));
        let (mut pump, rx) = InputPump::spawn(reader).unwrap();
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(30)),
            Err(mpsc::RecvTimeoutError::Timeout)
        );
        pump.stop();
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(30)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn paused_pump_does_not_read() {
        let reader = Arc::new(Mutex::new(ScriptReader::new(["a"], SIZE)));
        let (pump, rx) = InputPump::spawn(Arc::clone(&reader)).unwrap();
        pump.pause();
        // Whatever slipped through before the pause is drained; after that,
        // nothing new arrives while paused.
        let lock = reader.lock().unwrap();
        let before = lock.remaining();
        drop(lock);
        thread::sleep(Duration::from_millis(30));
        assert_eq!(reader.lock().unwrap().remaining(), before);
        assert!(pump.is_paused());
        pump.resume();
        if before == 1 {
            assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), b"a");
        }
    }

    #[test]
    fn stop_returns_with_a_full_queue() {
        let chunks = vec![b"x".to_vec(); QUEUE_CAPACITY * 4];
        let reader = Arc::new(Mutex::new(ScriptReader::new(chunks, SIZE)));
        let (mut pump, rx) = InputPump::spawn(reader).unwrap();
        // One delivered chunk means the thread is running; give it time to
        // fill the channel. `rx` stays alive and undrained.
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), b"x");
        thread::sleep(Duration::from_millis(50));

        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            pump.stop();
            let _ = done_tx.send(());
        });
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).is_ok());
        drop(rx);
    }

    #[test]
    fn stop_is_idempotent() {
        let reader = Arc::new(Mutex::new(Idle));
        let (mut pump, _rx) = InputPump::spawn(reader).unwrap();
        pump.stop();
        pump.stop();
    }
}
