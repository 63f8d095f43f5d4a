//! Cross-platform BSD-style sockets.
//!
//! One [`Socket`] type wraps a native descriptor on POSIX and a `SOCKET`
//! on Windows, with the same error reporting, non-blocking conventions
//! and readiness polling on both. Call [`initialize`] once before any
//! other operation.
//!
//! Non-blocking conventions: a send that would block returns `Ok(0)`, a
//! receive that would block returns `Ok(None)`, and an orderly peer
//! shutdown reads as `Ok(Some(empty))`.

mod addr;
mod error;
mod poll;
mod runtime;
mod socket;
mod sys;

pub use self::addr::{AddressFamily, SocketAddress};
pub use self::error::{OsError, ResolutionError, SocketError, errno};
pub use self::poll::{PollEntry, PollFlags, PollSet, poll};
pub use self::runtime::{initialize, is_initialized, teardown};
pub use self::socket::{ShutdownHow, SockType, Socket,
					   ListenerBuilder, ConnectorBuilder, DatagramBuilder,
					   BufferConfig, ReuseConfig, TcpConfig};
