use super::{SockType, Socket};
use crate::addr::{AddressFamily, SocketAddress};
use crate::error::SocketError;

// ============================================================================
// Shared Configuration Structs
// ============================================================================

/// Buffer size configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferConfig {
	pub recv: Option<usize>,
	pub send: Option<usize>,
}

impl BufferConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn recv(mut self, size: usize) -> Self {
		self.recv = Some(size);
		self
	}

	pub fn send(mut self, size: usize) -> Self {
		self.send = Some(size);
		self
	}

	pub fn both(mut self, size: usize) -> Self {
		self.recv = Some(size);
		self.send = Some(size);
		self
	}

	fn apply(&self, socket: &Socket) -> Result<(), SocketError> {
		if let Some(size) = self.recv {
			socket.set_recv_buffer_size(size)?;
		}
		if let Some(size) = self.send {
			socket.set_send_buffer_size(size)?;
		}
		Ok(())
	}
}

/// Address reuse configuration.
#[derive(Debug, Clone, Copy)]
pub struct ReuseConfig {
	pub addr: bool,
}

impl Default for ReuseConfig {
	fn default() -> Self {
		Self {
			addr: true,  // servers almost always want this
		}
	}
}

impl ReuseConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn addr(mut self, enable: bool) -> Self {
		self.addr = enable;
		self
	}

	fn apply(&self, socket: &Socket) -> Result<(), SocketError> {
		if self.addr {
			socket.set_reuse_addr(true)?;
		}
		Ok(())
	}
}

/// TCP-specific configuration.
#[derive(Debug, Clone, Copy)]
pub struct TcpConfig {
	pub nodelay: bool,
	pub keepalive: bool,
}

impl Default for TcpConfig {
	fn default() -> Self {
		Self {
			nodelay: true,
			keepalive: false,
		}
	}
}

impl TcpConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodelay(mut self, enable: bool) -> Self {
		self.nodelay = enable;
		self
	}

	pub fn keepalive(mut self, enable: bool) -> Self {
		self.keepalive = enable;
		self
	}

	fn apply(&self, socket: &Socket) -> Result<(), SocketError> {
		if self.nodelay {
			socket.set_nodelay(true)?;
		}
		if self.keepalive {
			socket.set_keepalive(true)?;
		}
		Ok(())
	}
}

/// Opens a socket whose family matches `addr`.
fn open_for(addr: &SocketAddress, sock_type: SockType) -> Result<Socket, SocketError> {
	match addr.family() {
		Some(family @ (AddressFamily::Ipv4 | AddressFamily::Ipv6)) => Socket::new(family, sock_type),
		_ => Err(SocketError::InvalidAddress { reason: "address family must be IPv4 or IPv6" }),
	}
}

// ============================================================================
// Listener Builder
// ============================================================================

/// Builder for listening stream sockets.
///
/// # Example
/// ```ignore
/// use socklane::{ListenerBuilder, SocketAddress, AddressFamily, SockType, TcpConfig};
///
/// let addr = SocketAddress::resolve("0.0.0.0", "8080", AddressFamily::Ipv4, SockType::Stream)?;
/// let listener = ListenerBuilder::new()
///     .tcp(TcpConfig::new().nodelay(true))
///     .backlog(64)
///     .nonblocking(true)
///     .bind(&addr)?;
/// ```
#[derive(Debug, Clone)]
pub struct ListenerBuilder {
	reuse: ReuseConfig,
	tcp: TcpConfig,
	buffers: BufferConfig,
	backlog: u8,
	nonblocking: bool,
}

impl Default for ListenerBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl ListenerBuilder {
	pub fn new() -> Self {
		Self {
			reuse: ReuseConfig::default(),
			tcp: TcpConfig::default(),
			buffers: BufferConfig::default(),
			backlog: 128,
			nonblocking: false,
		}
	}

	/// Set address reuse options.
	pub fn reuse(mut self, config: ReuseConfig) -> Self {
		self.reuse = config;
		self
	}

	/// Set TCP options.
	pub fn tcp(mut self, config: TcpConfig) -> Self {
		self.tcp = config;
		self
	}

	/// Set buffer sizes.
	pub fn buffers(mut self, config: BufferConfig) -> Self {
		self.buffers = config;
		self
	}

	/// Set listen backlog. Default: 128.
	pub fn backlog(mut self, backlog: u8) -> Self {
		self.backlog = backlog;
		self
	}

	/// Set non-blocking mode.
	pub fn nonblocking(mut self, enable: bool) -> Self {
		self.nonblocking = enable;
		self
	}

	/// Creates, configures, binds and starts listening.
	///
	/// A socket that fails any step is dropped, which releases it.
	pub fn bind(self, addr: &SocketAddress) -> Result<Socket, SocketError> {
		let socket = open_for(addr, SockType::Stream)?;

		self.reuse.apply(&socket)?;
		self.tcp.apply(&socket)?;
		self.buffers.apply(&socket)?;
		if self.nonblocking {
			socket.set_blocking(false)?;
		}

		socket.bind(addr)?;
		socket.listen(self.backlog)?;
		Ok(socket)
	}
}

// ============================================================================
// Connector Builder
// ============================================================================

/// Builder for outgoing stream connections.
///
/// With `nonblocking(true)` the connect may still be in progress when
/// `connect` returns; poll for OUT and check `take_error`.
#[derive(Debug, Clone, Default)]
pub struct ConnectorBuilder {
	tcp: TcpConfig,
	buffers: BufferConfig,
	nonblocking: bool,
}

impl ConnectorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set TCP options.
	pub fn tcp(mut self, config: TcpConfig) -> Self {
		self.tcp = config;
		self
	}

	/// Set buffer sizes.
	pub fn buffers(mut self, config: BufferConfig) -> Self {
		self.buffers = config;
		self
	}

	pub fn nonblocking(mut self, enable: bool) -> Self {
		self.nonblocking = enable;
		self
	}

	/// Connects to the remote address.
	pub fn connect(self, addr: &SocketAddress) -> Result<Socket, SocketError> {
		let socket = open_for(addr, SockType::Stream)?;

		self.tcp.apply(&socket)?;
		self.buffers.apply(&socket)?;
		if self.nonblocking {
			socket.set_blocking(false)?;
		}

		socket.connect(addr)?;
		Ok(socket)
	}
}

// ============================================================================
// Datagram Builder
// ============================================================================

/// Builder for datagram sockets.
#[derive(Debug, Clone)]
pub struct DatagramBuilder {
	reuse: ReuseConfig,
	buffers: BufferConfig,
	nonblocking: bool,
}

impl Default for DatagramBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl DatagramBuilder {
	pub fn new() -> Self {
		Self {
			reuse: ReuseConfig { addr: false },
			buffers: BufferConfig::default(),
			nonblocking: false,
		}
	}

	/// Set address reuse options.
	pub fn reuse(mut self, config: ReuseConfig) -> Self {
		self.reuse = config;
		self
	}

	/// Set buffer sizes.
	pub fn buffers(mut self, config: BufferConfig) -> Self {
		self.buffers = config;
		self
	}

	pub fn nonblocking(mut self, enable: bool) -> Self {
		self.nonblocking = enable;
		self
	}

	/// Binds to an address.
	pub fn bind(self, addr: &SocketAddress) -> Result<Socket, SocketError> {
		let socket = open_for(addr, SockType::Datagram)?;

		self.reuse.apply(&socket)?;
		self.buffers.apply(&socket)?;
		if self.nonblocking {
			socket.set_blocking(false)?;
		}

		socket.bind(addr)?;
		Ok(socket)
	}
}
