use crate::sys;

/// Sole owner of one native socket descriptor.
///
/// Holds either a live descriptor or `sys::INVALID_SOCKET`. Closing
/// swaps the sentinel in before the native close, so a descriptor is
/// released at most once whether that happens through [`Handle::close`]
/// or through `Drop`. There is no `Clone`: duplication goes through
/// `sys::duplicate`, which yields a distinct descriptor.
pub(crate) struct Handle {
	raw: sys::RawSocket,
}

impl Handle {
	/// Takes ownership of `raw`.
	///
	/// # Safety
	/// `raw` must be an open socket that nothing else will close.
	pub(crate) unsafe fn from_raw(raw: sys::RawSocket) -> Self {
		Self { raw }
	}

	#[inline]
	pub(crate) fn raw(&self) -> sys::RawSocket {
		self.raw
	}

	#[inline]
	pub(crate) fn is_valid(&self) -> bool {
		self.raw != sys::INVALID_SOCKET
	}

	/// Releases the descriptor. The handle is invalid afterwards even if
	/// the native close reports an error.
	pub(crate) fn close(&mut self) -> Result<(), i32> {
		let raw = std::mem::replace(&mut self.raw, sys::INVALID_SOCKET);
		if raw == sys::INVALID_SOCKET {
			return Ok(());
		}
		sys::close(raw)
	}

	/// Gives up ownership without closing.
	pub(crate) fn into_raw(mut self) -> sys::RawSocket {
		std::mem::replace(&mut self.raw, sys::INVALID_SOCKET)
	}
}

impl Drop for Handle {
	fn drop(&mut self) {
		if !self.is_valid() {
			return;
		}
		let raw = self.raw;
		log::warn!("socket {raw:?} reclaimed without an explicit close");
		if let Err(code) = self.close() {
			log::warn!("closing socket {raw:?} on drop failed: {}", sys::error_message(code));
		}
	}
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;

	#[test]
	fn close_invalidates_and_is_not_repeated() {
		let fd = sys::socket(sys::AF_INET, sys::SOCK_STREAM).unwrap();
		let mut handle = unsafe { Handle::from_raw(fd) };
		assert!(handle.is_valid());
		handle.close().unwrap();
		assert!(!handle.is_valid());
		// second close is a no-op rather than a second native close
		handle.close().unwrap();
	}

	#[test]
	fn into_raw_skips_drop_close() {
		let fd = sys::socket(sys::AF_INET, sys::SOCK_DGRAM).unwrap();
		let handle = unsafe { Handle::from_raw(fd) };
		let raw = handle.into_raw();
		assert_eq!(raw, fd);
		// still open: closing it ourselves succeeds
		assert!(sys::close(raw).is_ok());
	}
}
