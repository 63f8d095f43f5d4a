use super::Socket;
use crate::error::{OsError, SocketError};
use crate::sys;

impl Socket {
	/// Switches between blocking and non-blocking mode.
	///
	/// Uses `O_NONBLOCK` through `fcntl` on POSIX and `FIONBIO` on Windows.
	pub fn set_blocking(&self, blocking: bool) -> Result<(), SocketError> {
		let fd = self.live()?;
		sys::set_nonblocking(fd, !blocking)
			.map_err(|code| SocketError::SetOption { option: "O_NONBLOCK", source: OsError::new(code) })
	}

	/// Reports the current blocking mode, read live from the descriptor.
	#[cfg(unix)]
	pub fn is_blocking(&self) -> Result<bool, SocketError> {
		let fd = self.live()?;
		let nonblocking = sys::is_nonblocking(fd)
			.map_err(|code| SocketError::GetOption { option: "O_NONBLOCK", source: OsError::new(code) })?;
		Ok(!nonblocking)
	}

	/// Windows has no call that reads the blocking mode back.
	#[cfg(windows)]
	pub fn is_blocking(&self) -> Result<bool, SocketError> {
		self.live()?;
		Err(SocketError::Unsupported { op: "is_blocking" })
	}

	/// Sets SO_REUSEADDR.
	///
	/// Lets a server rebind an address still in TIME_WAIT.
	pub fn set_reuse_addr(&self, enable: bool) -> Result<(), SocketError> {
		self.set_int(sys::SOL_SOCKET, sys::SO_REUSEADDR, enable as i32, "SO_REUSEADDR")
	}

	/// Sets TCP_NODELAY (disables Nagle's algorithm).
	pub fn set_nodelay(&self, enable: bool) -> Result<(), SocketError> {
		self.set_int(sys::IPPROTO_TCP, sys::TCP_NODELAY, enable as i32, "TCP_NODELAY")
	}

	/// Sets SO_KEEPALIVE.
	pub fn set_keepalive(&self, enable: bool) -> Result<(), SocketError> {
		self.set_int(sys::SOL_SOCKET, sys::SO_KEEPALIVE, enable as i32, "SO_KEEPALIVE")
	}

	/// Sets IPV6_V6ONLY on an IPv6 socket.
	pub fn set_only_v6(&self, enable: bool) -> Result<(), SocketError> {
		self.set_int(sys::IPPROTO_IPV6, sys::IPV6_V6ONLY, enable as i32, "IPV6_V6ONLY")
	}

	/// Sets SO_RCVBUF. Linux doubles the value internally.
	pub fn set_recv_buffer_size(&self, size: usize) -> Result<(), SocketError> {
		self.set_int(sys::SOL_SOCKET, sys::SO_RCVBUF, clamp(size), "SO_RCVBUF")
	}

	/// Sets SO_SNDBUF.
	pub fn set_send_buffer_size(&self, size: usize) -> Result<(), SocketError> {
		self.set_int(sys::SOL_SOCKET, sys::SO_SNDBUF, clamp(size), "SO_SNDBUF")
	}

	pub fn recv_buffer_size(&self) -> Result<usize, SocketError> {
		let fd = self.live()?;
		let size = sys::getsockopt_int(fd, sys::SOL_SOCKET, sys::SO_RCVBUF)
			.map_err(|code| SocketError::GetOption { option: "SO_RCVBUF", source: OsError::new(code) })?;
		Ok(size.max(0) as usize)
	}

	fn set_int(&self, level: i32, name: i32, value: i32, option: &'static str) -> Result<(), SocketError> {
		let fd = self.live()?;
		sys::setsockopt_int(fd, level, name, value)
			.map_err(|code| SocketError::SetOption { option, source: OsError::new(code) })
	}
}

fn clamp(size: usize) -> i32 {
	size.min(i32::MAX as usize) as i32
}
