//! Readiness polling over many sockets in one native wait.
//!
//! Each [`PollEntry`] pairs a socket with the events it is interested in
//! and the events last observed for it. Entries marked `ignore` are left
//! out of the native wait set but keep their last-observed flags, so a
//! caller can hold one stable array and poll a subset of it each round.

use crate::error::{OsError, SocketError};
use crate::socket::Socket;
use crate::{runtime, sys};

bitflags::bitflags! {
	/// Readiness flags. Only `IN`, `PRI` and `OUT` may be requested; the
	/// rest are only ever reported.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct PollFlags: u16 {
		/// Readable (or, on a listener, a connection is pending).
		const IN = 0x01;
		/// Priority / out-of-band data.
		const PRI = 0x02;
		/// Writable (or a non-blocking connect finished).
		const OUT = 0x04;
		const ERR = 0x08;
		/// The peer hung up.
		const HUP = 0x10;
		/// The descriptor is not open.
		const NVAL = 0x20;
	}
}

impl PollFlags {
	/// The flags a caller may ask for.
	pub const REQUESTABLE: PollFlags = PollFlags::IN.union(PollFlags::PRI).union(PollFlags::OUT);
}

/// One socket's slot in a poll request.
#[derive(Debug, Clone, Copy)]
pub struct PollEntry<'a> {
	pub socket: &'a Socket,
	/// Events to wait for.
	pub events: PollFlags,
	/// Events observed by the last poll that included this entry.
	pub revents: PollFlags,
	/// Skip this entry in the native wait, keeping `revents` as is.
	pub ignore: bool,
}

impl<'a> PollEntry<'a> {
	pub fn new(socket: &'a Socket, events: PollFlags) -> Self {
		Self {
			socket,
			events,
			revents: PollFlags::empty(),
			ignore: false,
		}
	}

	pub fn ignored(mut self, ignore: bool) -> Self {
		self.ignore = ignore;
		self
	}

	/// True if the last poll reported anything for this entry.
	pub fn is_ready(&self) -> bool {
		!self.revents.is_empty()
	}
}

/// Waits until at least one non-ignored entry is ready or `timeout`
/// expires, and returns the updated entries.
///
/// `timeout` is in milliseconds: negative blocks indefinitely, zero
/// returns immediately. The result has the same length and order as
/// `entries`. Only `revents` changes, and only for entries that were not
/// ignored; it may contain ERR, HUP or NVAL even though those cannot be
/// requested.
///
/// If every entry is ignored nothing is waited on and the entries come
/// back unchanged.
pub fn poll<'a>(entries: &[PollEntry<'a>], timeout: i32) -> Result<Vec<PollEntry<'a>>, SocketError> {
	let mut out = entries.to_vec();
	wait(&mut out, timeout)?;
	Ok(out)
}

/// Runs one native wait over `entries` in place; returns how many
/// polled descriptors reported events.
fn wait(entries: &mut [PollEntry<'_>], timeout: i32) -> Result<usize, SocketError> {
	runtime::ensure_active()?;

	let mut fds: Vec<sys::PollFd> = Vec::with_capacity(entries.len());
	let mut slots: Vec<usize> = Vec::with_capacity(entries.len());
	for (i, entry) in entries.iter().enumerate() {
		if entry.ignore {
			continue;
		}
		fds.push(sys::poll_fd(entry.socket.raw(), entry.events & PollFlags::REQUESTABLE));
		slots.push(i);
	}

	if fds.is_empty() {
		return Ok(0);
	}

	let ready = sys::poll(&mut fds, timeout)
		.map_err(|code| SocketError::Poll { source: OsError::new(code) })?;
	log::trace!("poll over {} sockets (timeout {timeout}ms): {ready} ready", fds.len());

	for (fd, &slot) in fds.iter().zip(&slots) {
		entries[slot].revents = sys::poll_revents(fd);
	}
	Ok(ready)
}

/// A reusable set of poll entries.
///
/// ```ignore
/// let mut set = PollSet::new();
/// let listener_slot = set.push(&listener, PollFlags::IN);
/// let client_slot = set.push(&client, PollFlags::OUT);
/// set.poll(1000)?;
/// if set.entry(listener_slot).revents.contains(PollFlags::IN) {
///     let (peer, conn) = listener.accept()?;
/// }
/// ```
#[derive(Debug, Default)]
pub struct PollSet<'a> {
	entries: Vec<PollEntry<'a>>,
}

impl<'a> PollSet<'a> {
	pub fn new() -> Self {
		Self { entries: Vec::new() }
	}

	/// Adds a socket and returns its slot index.
	pub fn push(&mut self, socket: &'a Socket, events: PollFlags) -> usize {
		self.entries.push(PollEntry::new(socket, events));
		self.entries.len() - 1
	}

	/// Panics if `slot` was not returned by `push`.
	pub fn entry(&self, slot: usize) -> &PollEntry<'a> {
		&self.entries[slot]
	}

	pub fn set_events(&mut self, slot: usize, events: PollFlags) {
		self.entries[slot].events = events;
	}

	pub fn set_ignore(&mut self, slot: usize, ignore: bool) {
		self.entries[slot].ignore = ignore;
	}

	pub fn entries(&self) -> &[PollEntry<'a>] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Slots whose last observed flags are non-empty.
	pub fn ready(&self) -> impl Iterator<Item = (usize, &PollEntry<'a>)> {
		self.entries.iter().enumerate().filter(|(_, e)| e.is_ready())
	}

	/// Polls in place. See [`poll`] for the timeout and ignore rules.
	pub fn poll(&mut self, timeout: i32) -> Result<usize, SocketError> {
		wait(&mut self.entries, timeout)
	}
}
