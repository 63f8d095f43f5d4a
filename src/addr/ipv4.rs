use std::net::SocketAddrV4;

use super::SocketAddress;
use crate::sys;

pub(super) fn encode(addr: &SocketAddrV4) -> SocketAddress {
	let (storage, len) = sys::encode_v4(addr);
	SocketAddress::from_raw_parts(storage, len)
}

/// Reads the `sockaddr_in` record.
///
/// Returns `None` if fewer bytes are valid than the record needs; the
/// caller has already checked the family tag.
pub(super) fn view(addr: &SocketAddress) -> Option<SocketAddrV4> {
	let (storage, len) = addr.as_raw();
	if (len as usize) < std::mem::size_of::<sys::SockAddrIn>() {
		return None;
	}
	// SAFETY: storage is aligned for any sockaddr and at least this long.
	let raw = unsafe { &*(storage as *const sys::Storage as *const sys::SockAddrIn) };
	Some(sys::decode_v4(raw))
}

/// Same address bytes and port.
pub(super) fn same_endpoint(a: &SocketAddress, b: &SocketAddress) -> bool {
	match (view(a), view(b)) {
		(Some(a), Some(b)) => a.ip().octets() == b.ip().octets() && a.port() == b.port(),
		_ => false,
	}
}
