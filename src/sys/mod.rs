//! Native socket backends.
//!
//! Exactly one backend is compiled in. Both expose the same crate-private
//! surface: a handle type with an invalid sentinel, address storage, the
//! native constants the public enums map onto, and one thin wrapper per
//! native call. Every wrapper returns the platform's last-error code,
//! read immediately after the failing call.

cfg_if::cfg_if! {
	if #[cfg(unix)] {
		mod unix;
		pub(crate) use self::unix::*;
	} else if #[cfg(windows)] {
		mod windows;
		pub(crate) use self::windows::*;
	} else {
		compile_error!("socklane supports unix and windows targets only");
	}
}

/// Returns a zeroed address buffer together with its full capacity,
/// ready to be filled in by accept/recvfrom/getpeername.
pub(crate) fn empty_storage() -> (Storage, SockLen) {
	// SAFETY: sockaddr_storage is plain old data; all-zero is AF_UNSPEC.
	let storage: Storage = unsafe { std::mem::zeroed() };
	(storage, std::mem::size_of::<Storage>() as SockLen)
}

/// Views the storage as a generic `sockaddr` pointer.
#[inline]
pub(crate) fn storage_ptr(storage: &Storage) -> *const SockAddr {
	storage as *const Storage as *const SockAddr
}

#[inline]
pub(crate) fn storage_mut_ptr(storage: &mut Storage) -> *mut SockAddr {
	storage as *mut Storage as *mut SockAddr
}
