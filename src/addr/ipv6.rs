use std::net::SocketAddrV6;

use super::SocketAddress;
use crate::sys;

pub(super) fn encode(addr: &SocketAddrV6) -> SocketAddress {
	let (storage, len) = sys::encode_v6(addr);
	SocketAddress::from_raw_parts(storage, len)
}

/// Reads the `sockaddr_in6` record, including scope and flow info.
pub(super) fn view(addr: &SocketAddress) -> Option<SocketAddrV6> {
	let (storage, len) = addr.as_raw();
	if (len as usize) < std::mem::size_of::<sys::SockAddrIn6>() {
		return None;
	}
	// SAFETY: storage is aligned for any sockaddr and at least this long.
	let raw = unsafe { &*(storage as *const sys::Storage as *const sys::SockAddrIn6) };
	Some(sys::decode_v6(raw))
}

/// Same 16 address bytes and port. Scope id and flow info are not part
/// of the comparison.
pub(super) fn same_endpoint(a: &SocketAddress, b: &SocketAddress) -> bool {
	match (view(a), view(b)) {
		(Some(a), Some(b)) => a.ip().octets() == b.ip().octets() && a.port() == b.port(),
		_ => false,
	}
}
