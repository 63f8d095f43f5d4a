use super::{ShutdownHow, SockType, Socket, check_recv_buf, received, sent};
use crate::addr::SocketAddress;
use crate::error::{OsError, SocketError};
use crate::sys;

impl Socket {
	/// Binds the socket to a local address.
	pub fn bind(&self, addr: &SocketAddress) -> Result<(), SocketError> {
		let fd = self.live()?;
		let (storage, len) = addr.as_raw();
		sys::bind(fd, storage, len).map_err(|code| SocketError::Bind {
			addr: addr.to_string(),
			source: OsError::new(code),
		})?;
		log::debug!("socket {fd:?} bound to {addr}");
		Ok(())
	}

	/// Connects to a remote address.
	///
	/// Blocks until the connection is established unless the socket is
	/// non-blocking. In non-blocking mode a connection still in progress
	/// returns `Ok(())`; wait for [`PollFlags::OUT`](crate::PollFlags::OUT)
	/// and then check [`Socket::take_error`].
	pub fn connect(&self, addr: &SocketAddress) -> Result<(), SocketError> {
		let fd = self.live()?;
		let (storage, len) = addr.as_raw();
		match sys::connect(fd, storage, len) {
			Ok(()) => {
				log::debug!("socket {fd:?} connected to {addr}");
				Ok(())
			}
			Err(code) if sys::is_in_progress(code) => {
				log::debug!("socket {fd:?} connecting to {addr}");
				Ok(())
			}
			Err(code) => Err(SocketError::Connect {
				addr: addr.to_string(),
				source: OsError::new(code),
			}),
		}
	}

	/// Starts listening for connections. The OS clamps `backlog` to its
	/// own maximum.
	pub fn listen(&self, backlog: u8) -> Result<(), SocketError> {
		let fd = self.live()?;
		sys::listen(fd, backlog as i32)
			.map_err(|code| SocketError::Listen { backlog, source: OsError::new(code) })
	}

	/// Accepts a pending connection, returning the peer's address and a
	/// newly owned socket.
	///
	/// On a non-blocking listener with nothing pending this fails with an
	/// error for which [`SocketError::is_would_block`] is true; see
	/// [`Socket::try_accept`] for the `Option` form.
	pub fn accept(&self) -> Result<(SocketAddress, Socket), SocketError> {
		let fd = self.live()?;
		let (mut storage, mut len) = SocketAddress::empty_for_native();
		let new_fd = sys::accept(fd, &mut storage, &mut len)
			.map_err(|code| SocketError::Accept { source: OsError::new(code) })?;

		// SAFETY: accept returned a fresh descriptor owned by nobody else.
		let socket = unsafe { Socket::from_parts(new_fd, self.family, SockType::Stream) };
		let peer = SocketAddress::from_raw_parts(storage, len);
		log::debug!("socket {fd:?} accepted {peer} as {new_fd:?}");
		Ok((peer, socket))
	}

	/// Accepts without treating "nothing pending" as an error.
	///
	/// Returns `Ok(None)` when a non-blocking listener has no pending
	/// connection.
	pub fn try_accept(&self) -> Result<Option<(SocketAddress, Socket)>, SocketError> {
		match self.accept() {
			Ok(pair) => Ok(Some(pair)),
			Err(e) if e.is_would_block() => Ok(None),
			Err(e) => Err(e),
		}
	}

	/// Sends on a connected socket.
	///
	/// Returns how many bytes the kernel took, which may be fewer than
	/// `buf.len()`. Returns `0` when a non-blocking socket would block.
	pub fn send(&self, buf: &[u8]) -> Result<usize, SocketError> {
		let fd = self.live()?;
		let n = sent(sys::send(fd, buf))?;
		log::trace!("socket {fd:?} sent {n}/{} bytes", buf.len());
		Ok(n)
	}

	/// Receives up to `max_len` bytes.
	///
	/// - `Ok(None)`: non-blocking socket, nothing available yet
	/// - `Ok(Some(empty))`: the peer shut down its write side (EOF)
	/// - `Ok(Some(bytes))`: data
	///
	/// `max_len` must be non-zero; an empty request fails with
	/// [`SocketError::InvalidInput`] instead of reading as EOF.
	pub fn recv(&self, max_len: usize) -> Result<Option<Vec<u8>>, SocketError> {
		let mut buf = vec![0u8; max_len];
		Ok(self.recv_into(&mut buf)?.map(|n| {
			buf.truncate(n);
			buf
		}))
	}

	/// [`Socket::recv`] into a caller-provided buffer; `Some(0)` is EOF.
	pub fn recv_into(&self, buf: &mut [u8]) -> Result<Option<usize>, SocketError> {
		let fd = self.live()?;
		check_recv_buf(buf)?;
		let n = received(sys::recv(fd, buf))?;
		if let Some(n) = n {
			log::trace!("socket {fd:?} received {n} bytes");
		}
		Ok(n)
	}

	/// Address of the connected remote endpoint.
	pub fn peer(&self) -> Result<SocketAddress, SocketError> {
		let fd = self.live()?;
		let (mut storage, mut len) = SocketAddress::empty_for_native();
		sys::getpeername(fd, &mut storage, &mut len)
			.map_err(|code| SocketError::Peer { source: OsError::new(code) })?;
		Ok(SocketAddress::from_raw_parts(storage, len))
	}

	/// Address this socket is bound to, including an OS-assigned port.
	pub fn local_addr(&self) -> Result<SocketAddress, SocketError> {
		let fd = self.live()?;
		let (mut storage, mut len) = SocketAddress::empty_for_native();
		sys::getsockname(fd, &mut storage, &mut len)
			.map_err(|code| SocketError::LocalAddr { source: OsError::new(code) })?;
		Ok(SocketAddress::from_raw_parts(storage, len))
	}

	/// Disables further receives, sends, or both. The descriptor stays
	/// open until [`Socket::close`].
	pub fn shutdown(&self, how: ShutdownHow) -> Result<(), SocketError> {
		let fd = self.live()?;
		sys::shutdown(fd, how.raw())
			.map_err(|code| SocketError::Shutdown { source: OsError::new(code) })?;
		log::debug!("socket {fd:?} shut down ({how:?})");
		Ok(())
	}

	/// Reads and clears the pending socket error (`SO_ERROR`).
	///
	/// After a non-blocking connect, call this once poll reports OUT:
	/// `None` means the connection succeeded. Reading clears the error.
	pub fn take_error(&self) -> Result<Option<OsError>, SocketError> {
		let fd = self.live()?;
		let error = sys::getsockopt_int(fd, sys::SOL_SOCKET, sys::SO_ERROR)
			.map_err(|code| SocketError::GetOption { option: "SO_ERROR", source: OsError::new(code) })?;
		if error == 0 {
			Ok(None)
		} else {
			Ok(Some(OsError::new(error)))
		}
	}
}
