//! Process-wide socket subsystem lifecycle.
//!
//! The lifecycle runs once: `initialize` before the first socket
//! operation, `teardown` at most once afterwards. Every socket, poll and
//! resolution call checks the state and fails with
//! [`SocketError::NotInitialized`] or [`SocketError::TornDown`] outside
//! the active window. On Windows this brackets `WSAStartup`/`WSACleanup`;
//! POSIX has no native step.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{OsError, SocketError};
use crate::sys;

const UNINIT: u8 = 0;
const STARTING: u8 = 1;
const ACTIVE: u8 = 2;
const TORN_DOWN: u8 = 3;

static STATE: AtomicU8 = AtomicU8::new(UNINIT);

/// Starts the native socket subsystem.
///
/// Fails with `AlreadyInitialized` on a second call (including one racing
/// the first), `TornDown` after teardown, and `Startup` if the native
/// subsystem refuses to start. A failed startup leaves the runtime
/// uninitialized so it can be retried.
pub fn initialize() -> Result<(), SocketError> {
	match STATE.compare_exchange(UNINIT, STARTING, Ordering::AcqRel, Ordering::Acquire) {
		Ok(_) => {}
		Err(TORN_DOWN) => return Err(SocketError::TornDown),
		Err(_) => return Err(SocketError::AlreadyInitialized),
	}

	if let Err(code) = sys::startup() {
		STATE.store(UNINIT, Ordering::Release);
		return Err(SocketError::Startup { source: OsError::new(code) });
	}

	STATE.store(ACTIVE, Ordering::Release);
	log::info!("socket runtime initialized");
	Ok(())
}

/// Stops the native socket subsystem. No socket operation may follow.
///
/// Sockets still alive at this point are released by their owners as
/// usual; on Windows their close will fail and is only logged.
pub fn teardown() -> Result<(), SocketError> {
	match STATE.compare_exchange(ACTIVE, TORN_DOWN, Ordering::AcqRel, Ordering::Acquire) {
		Ok(_) => {}
		Err(TORN_DOWN) => return Err(SocketError::TornDown),
		Err(_) => return Err(SocketError::NotInitialized),
	}

	log::info!("socket runtime torn down");
	sys::cleanup().map_err(|code| SocketError::Cleanup { source: OsError::new(code) })
}

/// True between a successful `initialize` and `teardown`.
pub fn is_initialized() -> bool {
	STATE.load(Ordering::Acquire) == ACTIVE
}

#[inline]
pub(crate) fn ensure_active() -> Result<(), SocketError> {
	match STATE.load(Ordering::Acquire) {
		ACTIVE => Ok(()),
		TORN_DOWN => Err(SocketError::TornDown),
		_ => Err(SocketError::NotInitialized),
	}
}

/// Initializes once for the unit-test binary, tolerating other tests
/// having done it first.
#[cfg(test)]
pub(crate) fn init_for_tests() {
	static ONCE: std::sync::Once = std::sync::Once::new();
	ONCE.call_once(|| {
		if let Err(e) = initialize() {
			panic!("socket runtime failed to start: {e}");
		}
	});
}
