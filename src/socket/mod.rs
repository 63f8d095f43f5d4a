mod builder;
mod datagram;
mod options;
mod raw;
mod stream;

pub use self::builder::{BufferConfig, ConnectorBuilder, DatagramBuilder, ListenerBuilder, ReuseConfig, TcpConfig};

use std::fmt;

use crate::addr::AddressFamily;
use crate::error::{OsError, SocketError};
use crate::{runtime, sys};
use self::raw::Handle;

/// Socket transport discipline.
///
/// - `Stream`: reliable, ordered byte stream (TCP)
/// - `Datagram`: unreliable, discrete messages (UDP)
/// - `Unspecified`: only meaningful as a resolver hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SockType {
	#[default]
	Unspecified,
	Stream,
	Datagram,
}

impl SockType {
	/// Returns the native `SOCK_*` constant (0 for unspecified).
	#[inline]
	pub fn raw(self) -> i32 {
		match self {
			SockType::Unspecified => 0,
			SockType::Stream => sys::SOCK_STREAM,
			SockType::Datagram => sys::SOCK_DGRAM,
		}
	}
}

/// Which half of a connection `shutdown` disables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownHow {
	Read,
	Write,
	Both,
}

impl ShutdownHow {
	#[inline]
	fn raw(self) -> i32 {
		match self {
			ShutdownHow::Read => sys::SHUT_RD,
			ShutdownHow::Write => sys::SHUT_WR,
			ShutdownHow::Both => sys::SHUT_RDWR,
		}
	}
}

/// An owned OS socket.
///
/// Each `Socket` owns exactly one native descriptor. Prefer [`Socket::close`],
/// which reports native errors; dropping an unclosed socket closes it as a
/// last resort and only logs failures. Because `close` consumes the socket,
/// use-after-close and double-close cannot be expressed.
///
/// All methods take `&self`; concurrent use of one socket from several
/// threads is left to the caller to serialize.
pub struct Socket {
	handle: Handle,
	family: AddressFamily,
	sock_type: SockType,
}

impl Socket {
	/// Opens a new native socket.
	pub fn new(family: AddressFamily, sock_type: SockType) -> Result<Self, SocketError> {
		runtime::ensure_active()?;
		let raw = sys::socket(family.raw(), sock_type.raw())
			.map_err(|code| SocketError::Create { source: OsError::new(code) })?;
		log::debug!("created {family:?}/{sock_type:?} socket {raw:?}");
		// SAFETY: freshly created and owned by nobody else.
		Ok(unsafe { Self::from_parts(raw, family, sock_type) })
	}

	/// Wraps a descriptor this crate just obtained from the OS.
	///
	/// # Safety
	/// `raw` must be open and not owned elsewhere.
	pub(crate) unsafe fn from_parts(raw: sys::RawSocket, family: AddressFamily, sock_type: SockType) -> Self {
		Self {
			handle: unsafe { Handle::from_raw(raw) },
			family,
			sock_type,
		}
	}

	/// Releases the native descriptor.
	///
	/// The descriptor is gone afterwards even if the OS reports an error.
	pub fn close(mut self) -> Result<(), SocketError> {
		let raw = self.handle.raw();
		log::debug!("closing socket {raw:?}");
		self.handle
			.close()
			.map_err(|code| SocketError::Close { source: OsError::new(code) })
	}

	/// The family this socket was created with.
	pub fn family(&self) -> AddressFamily {
		self.family
	}

	pub fn sock_type(&self) -> SockType {
		self.sock_type
	}

	/// Creates a second socket referring to the same endpoint through a
	/// distinct native descriptor.
	pub fn try_clone(&self) -> Result<Self, SocketError> {
		let raw = sys::duplicate(self.live()?)
			.map_err(|code| SocketError::Create { source: OsError::new(code) })?;
		// SAFETY: the duplicate is a new descriptor owned only by us.
		Ok(unsafe { Self::from_parts(raw, self.family, self.sock_type) })
	}

	/// Raw descriptor for native calls, after checking the runtime.
	#[inline]
	pub(crate) fn live(&self) -> Result<sys::RawSocket, SocketError> {
		runtime::ensure_active()?;
		Ok(self.handle.raw())
	}

	#[inline]
	pub(crate) fn raw(&self) -> sys::RawSocket {
		self.handle.raw()
	}
}

/// A send that would block reports zero bytes taken.
fn sent(result: Result<usize, i32>) -> Result<usize, SocketError> {
	match result {
		Ok(n) => Ok(n),
		Err(code) if sys::is_would_block(code) => Ok(0),
		Err(code) => Err(SocketError::Send { source: OsError::new(code) }),
	}
}

/// A receive that would block reports `None`.
fn received<T>(result: Result<T, i32>) -> Result<Option<T>, SocketError> {
	match result {
		Ok(value) => Ok(Some(value)),
		Err(code) if sys::is_would_block(code) => Ok(None),
		Err(code) => Err(SocketError::Recv { source: OsError::new(code) }),
	}
}

/// A zero-byte read is end-of-stream, so an empty buffer is refused
/// before it can produce one.
fn check_recv_buf(buf: &[u8]) -> Result<(), SocketError> {
	if buf.is_empty() {
		return Err(SocketError::InvalidInput { reason: "receive buffer is empty" });
	}
	Ok(())
}

impl fmt::Debug for Socket {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Socket")
			.field("raw", &self.handle.raw())
			.field("family", &self.family)
			.field("sock_type", &self.sock_type)
			.finish()
	}
}

#[cfg(unix)]
mod unix_impls {
	use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, IntoRawFd, RawFd};

	use super::{AddressFamily, SockType, Socket};
	use crate::sys;

	impl AsRawFd for Socket {
		fn as_raw_fd(&self) -> RawFd {
			self.raw()
		}
	}

	impl AsFd for Socket {
		fn as_fd(&self) -> BorrowedFd<'_> {
			// SAFETY: the descriptor stays open for as long as `self` is borrowed.
			unsafe { BorrowedFd::borrow_raw(self.raw()) }
		}
	}

	impl IntoRawFd for Socket {
		fn into_raw_fd(self) -> RawFd {
			self.handle.into_raw()
		}
	}

	impl FromRawFd for Socket {
		/// Family and type are read back from the descriptor when the OS
		/// allows it; otherwise they are recorded as unspecified.
		unsafe fn from_raw_fd(fd: RawFd) -> Self {
			let family = local_family(fd).unwrap_or_default();
			let sock_type = match sys::getsockopt_int(fd, sys::SOL_SOCKET, libc::SO_TYPE) {
				Ok(t) if t == sys::SOCK_STREAM => SockType::Stream,
				Ok(t) if t == sys::SOCK_DGRAM => SockType::Datagram,
				_ => SockType::Unspecified,
			};
			unsafe { Socket::from_parts(fd, family, sock_type) }
		}
	}

	fn local_family(fd: RawFd) -> Option<AddressFamily> {
		let (mut storage, mut len) = sys::empty_storage();
		sys::getsockname(fd, &mut storage, &mut len).ok()?;
		AddressFamily::from_raw(sys::storage_family(&storage))
	}
}

#[cfg(windows)]
mod windows_impls {
	use std::os::windows::io::{AsRawSocket, IntoRawSocket, RawSocket};

	use super::Socket;

	impl AsRawSocket for Socket {
		fn as_raw_socket(&self) -> RawSocket {
			self.raw() as RawSocket
		}
	}

	impl IntoRawSocket for Socket {
		fn into_raw_socket(self) -> RawSocket {
			self.handle.into_raw() as RawSocket
		}
	}
}
