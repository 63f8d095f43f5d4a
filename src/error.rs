use crate::sys;

/// A native error captured at the point of failure.
///
/// The message is rendered immediately, so it describes the failing call
/// even if the thread's last-error slot is overwritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct OsError {
	code: i32,
	message: String,
}

impl OsError {
	/// Wraps an already-read platform error code.
	pub fn new(code: i32) -> Self {
		Self { code, message: sys::error_message(code) }
	}

	/// Returns the raw platform code (errno or WSA error).
	pub fn code(&self) -> i32 {
		self.code
	}

	pub fn message(&self) -> &str {
		&self.message
	}

	pub fn is_would_block(&self) -> bool {
		sys::is_would_block(self.code)
	}
}

/// Socket lifecycle, poll and runtime errors.
#[derive(Debug, thiserror::Error)]
pub enum SocketError {
	#[error("socket() failed: {source}")]
	Create { source: OsError },

	#[error("close() failed: {source}")]
	Close { source: OsError },

	#[error("bind({addr}) failed: {source}")]
	Bind { addr: String, source: OsError },

	#[error("connect({addr}) failed: {source}")]
	Connect { addr: String, source: OsError },

	#[error("listen(backlog={backlog}) failed: {source}")]
	Listen { backlog: u8, source: OsError },

	#[error("accept() failed: {source}")]
	Accept { source: OsError },

	#[error("send() failed: {source}")]
	Send { source: OsError },

	#[error("recv() failed: {source}")]
	Recv { source: OsError },

	#[error("getpeername() failed: {source}")]
	Peer { source: OsError },

	#[error("getsockname() failed: {source}")]
	LocalAddr { source: OsError },

	#[error("shutdown() failed: {source}")]
	Shutdown { source: OsError },

	#[error("setsockopt({option}) failed: {source}")]
	SetOption { option: &'static str, source: OsError },

	#[error("getsockopt({option}) failed: {source}")]
	GetOption { option: &'static str, source: OsError },

	#[error("poll() failed: {source}")]
	Poll { source: OsError },

	#[error("socket subsystem startup failed: {source}")]
	Startup { source: OsError },

	#[error("socket subsystem cleanup failed: {source}")]
	Cleanup { source: OsError },

	#[error("{op} is not supported on this platform")]
	Unsupported { op: &'static str },

	#[error("invalid address: {reason}")]
	InvalidAddress { reason: &'static str },

	#[error("invalid argument: {reason}")]
	InvalidInput { reason: &'static str },

	#[error("socket runtime is not initialized")]
	NotInitialized,

	#[error("socket runtime is already initialized")]
	AlreadyInitialized,

	#[error("socket runtime has been torn down")]
	TornDown,
}

impl SocketError {
	/// Returns the native error behind this failure, if there is one.
	pub fn os_error(&self) -> Option<&OsError> {
		match self {
			SocketError::Create { source }
			| SocketError::Close { source }
			| SocketError::Bind { source, .. }
			| SocketError::Connect { source, .. }
			| SocketError::Listen { source, .. }
			| SocketError::Accept { source }
			| SocketError::Send { source }
			| SocketError::Recv { source }
			| SocketError::Peer { source }
			| SocketError::LocalAddr { source }
			| SocketError::Shutdown { source }
			| SocketError::SetOption { source, .. }
			| SocketError::GetOption { source, .. }
			| SocketError::Poll { source }
			| SocketError::Startup { source }
			| SocketError::Cleanup { source } => Some(source),
			SocketError::Unsupported { .. }
			| SocketError::InvalidAddress { .. }
			| SocketError::InvalidInput { .. }
			| SocketError::NotInitialized
			| SocketError::AlreadyInitialized
			| SocketError::TornDown => None,
		}
	}

	/// Returns the raw platform code, if any.
	pub fn code(&self) -> Option<i32> {
		self.os_error().map(OsError::code)
	}

	/// True when the native call failed only because it would have blocked.
	pub fn is_would_block(&self) -> bool {
		self.os_error().is_some_and(OsError::is_would_block)
	}
}

/// Name-resolution errors. Resolver codes are not socket error codes.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
	#[error("getaddrinfo({host}, {port}) failed: {message}")]
	Lookup { host: String, port: String, code: i32, message: String },

	#[error("getaddrinfo({host}, {port}) returned no addresses")]
	NoAddress { host: String, port: String },

	#[error("invalid resolver input: {reason}")]
	InvalidInput { reason: &'static str },

	#[error(transparent)]
	Runtime(#[from] SocketError),
}

/// Returns the platform's current last-error code.
#[inline]
pub fn errno() -> i32 {
	sys::last_error()
}

impl From<SocketError> for std::io::Error {
	fn from(err: SocketError) -> Self {
		let kind = match &err {
			SocketError::Unsupported { .. } => std::io::ErrorKind::Unsupported,
			SocketError::InvalidAddress { .. } | SocketError::InvalidInput { .. } => {
				std::io::ErrorKind::InvalidInput
			}
			SocketError::NotInitialized
			| SocketError::AlreadyInitialized
			| SocketError::TornDown => std::io::ErrorKind::Other,
			other => match other.code() {
				Some(code) => std::io::Error::from_raw_os_error(code).kind(),
				None => std::io::ErrorKind::Other,
			},
		};
		std::io::Error::new(kind, err)
	}
}

impl From<ResolutionError> for std::io::Error {
	fn from(err: ResolutionError) -> Self {
		let kind = match &err {
			ResolutionError::InvalidInput { .. } => std::io::ErrorKind::InvalidInput,
			ResolutionError::NoAddress { .. } => std::io::ErrorKind::NotFound,
			_ => std::io::ErrorKind::Other,
		};
		std::io::Error::new(kind, err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn os_error_renders_platform_text() {
		let err = OsError::new(sys_codes::REFUSED);
		assert_eq!(err.code(), sys_codes::REFUSED);
		assert!(!err.message().is_empty());
	}

	#[test]
	fn socket_error_carries_op_and_code() {
		let err = SocketError::Connect {
			addr: "127.0.0.1:1".into(),
			source: OsError::new(sys_codes::REFUSED),
		};
		assert_eq!(err.code(), Some(sys_codes::REFUSED));
		assert!(err.to_string().starts_with("connect(127.0.0.1:1) failed: "));
		assert!(!err.is_would_block());

		let io: std::io::Error = err.into();
		assert_eq!(io.kind(), std::io::ErrorKind::ConnectionRefused);
	}

	#[test]
	fn would_block_is_detected() {
		let err = SocketError::Accept { source: OsError::new(sys_codes::WOULD_BLOCK) };
		assert!(err.is_would_block());
		assert_eq!(std::io::Error::from(err).kind(), std::io::ErrorKind::WouldBlock);
	}

	#[test]
	fn runtime_errors_have_no_code() {
		assert_eq!(SocketError::NotInitialized.code(), None);
		let err = SocketError::Unsupported { op: "is_blocking" };
		assert_eq!(std::io::Error::from(err).kind(), std::io::ErrorKind::Unsupported);
		let err = SocketError::InvalidInput { reason: "receive buffer is empty" };
		assert_eq!(err.code(), None);
		assert_eq!(std::io::Error::from(err).kind(), std::io::ErrorKind::InvalidInput);
	}

	#[cfg(unix)]
	mod sys_codes {
		pub const REFUSED: i32 = libc::ECONNREFUSED;
		pub const WOULD_BLOCK: i32 = libc::EWOULDBLOCK;
	}

	#[cfg(windows)]
	mod sys_codes {
		pub const REFUSED: i32 = windows_sys::Win32::Networking::WinSock::WSAECONNREFUSED;
		pub const WOULD_BLOCK: i32 = windows_sys::Win32::Networking::WinSock::WSAEWOULDBLOCK;
	}
}
