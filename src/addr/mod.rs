//! Address families and native socket addresses.
//!
//! [`SocketAddress`] owns a buffer sized for the widest supported family
//! plus the number of bytes that are actually valid. It is produced by
//! resolution, `accept`, `recvfrom`, peer/local lookups, or from a
//! `std::net::SocketAddr`, and never changes afterwards.

mod ipv4;
mod ipv6;

use std::ffi::CString;
use std::fmt;
use std::net::SocketAddr;

use crate::error::ResolutionError;
use crate::socket::SockType;
use crate::{runtime, sys};

/// Address protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressFamily {
	#[default]
	Unspecified,
	Ipv4,
	Ipv6,
}

impl AddressFamily {
	/// Returns the native `AF_*` constant.
	#[inline]
	pub fn raw(self) -> i32 {
		match self {
			AddressFamily::Unspecified => sys::AF_UNSPEC,
			AddressFamily::Ipv4 => sys::AF_INET,
			AddressFamily::Ipv6 => sys::AF_INET6,
		}
	}

	/// Maps a native family value back; `None` for anything else.
	pub fn from_raw(raw: i32) -> Option<Self> {
		match raw {
			r if r == sys::AF_UNSPEC => Some(AddressFamily::Unspecified),
			r if r == sys::AF_INET => Some(AddressFamily::Ipv4),
			r if r == sys::AF_INET6 => Some(AddressFamily::Ipv6),
			_ => None,
		}
	}
}

/// A native socket address: storage for the widest family plus its valid
/// length.
///
/// Equality is only defined between two IPv4 or two IPv6 addresses (raw
/// address bytes and port). Any other pairing compares unequal, including
/// an unspecified address with itself, so this type is `PartialEq` only.
#[derive(Clone)]
pub struct SocketAddress {
	storage: sys::Storage,
	len: sys::SockLen,
}

impl SocketAddress {
	/// Resolves `host`/`port` and keeps the first candidate.
	///
	/// `host` is a hostname or literal IP, `port` a service name or
	/// numeric string. `family` and `ty` are passed to the resolver as
	/// hints; `Unspecified` leaves them open.
	pub fn resolve(host: &str, port: &str, family: AddressFamily, ty: SockType) -> Result<Self, ResolutionError> {
		runtime::ensure_active()?;

		let c_host = CString::new(host)
			.map_err(|_| ResolutionError::InvalidInput { reason: "host contains a NUL byte" })?;
		let c_port = CString::new(port)
			.map_err(|_| ResolutionError::InvalidInput { reason: "port contains a NUL byte" })?;

		match sys::resolve(&c_host, &c_port, family.raw(), ty.raw()) {
			Ok(Some((storage, len))) => {
				let addr = Self { storage, len };
				log::debug!("resolved {host}:{port} to {addr}");
				Ok(addr)
			}
			Ok(None) => Err(ResolutionError::NoAddress { host: host.into(), port: port.into() }),
			Err((code, message)) => Err(ResolutionError::Lookup {
				host: host.into(),
				port: port.into(),
				code,
				message,
			}),
		}
	}

	/// An address of unspecified family with no valid bytes.
	pub fn unspecified() -> Self {
		let (storage, _) = sys::empty_storage();
		Self { storage, len: 0 }
	}

	pub(crate) fn from_raw_parts(storage: sys::Storage, len: sys::SockLen) -> Self {
		Self { storage, len }
	}

	/// Returns an empty buffer for native calls that fill in an address.
	pub(crate) fn empty_for_native() -> (sys::Storage, sys::SockLen) {
		sys::empty_storage()
	}

	pub(crate) fn as_raw(&self) -> (&sys::Storage, sys::SockLen) {
		(&self.storage, self.len)
	}

	/// Number of valid bytes in the native record.
	pub fn length(&self) -> u32 {
		self.len as u32
	}

	/// `None` if the stored family is not unspecified, IPv4 or IPv6.
	pub fn family(&self) -> Option<AddressFamily> {
		AddressFamily::from_raw(self.raw_family())
	}

	/// Textual IP; `None` unless the family is IPv4 or IPv6.
	pub fn host(&self) -> Option<String> {
		self.to_socket_addr().map(|addr| addr.ip().to_string())
	}

	/// Port in host byte order; `None` unless the family is IPv4 or IPv6.
	pub fn port(&self) -> Option<u16> {
		self.to_socket_addr().map(|addr| addr.port())
	}

	/// Converts to the standard library representation.
	pub fn to_socket_addr(&self) -> Option<SocketAddr> {
		match self.family()? {
			AddressFamily::Ipv4 => ipv4::view(self).map(SocketAddr::V4),
			AddressFamily::Ipv6 => ipv6::view(self).map(SocketAddr::V6),
			AddressFamily::Unspecified => None,
		}
	}

	#[inline]
	fn raw_family(&self) -> i32 {
		sys::storage_family(&self.storage)
	}
}

impl From<SocketAddr> for SocketAddress {
	fn from(addr: SocketAddr) -> Self {
		match addr {
			SocketAddr::V4(v4) => ipv4::encode(&v4),
			SocketAddr::V6(v6) => ipv6::encode(&v6),
		}
	}
}

impl PartialEq for SocketAddress {
	fn eq(&self, other: &Self) -> bool {
		match (self.family(), other.family()) {
			(Some(AddressFamily::Ipv4), Some(AddressFamily::Ipv4)) => ipv4::same_endpoint(self, other),
			(Some(AddressFamily::Ipv6), Some(AddressFamily::Ipv6)) => ipv6::same_endpoint(self, other),
			_ => false,
		}
	}
}

impl fmt::Display for SocketAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.to_socket_addr() {
			Some(addr) => write!(f, "{addr}"),
			None => write!(f, "<family {}>", self.raw_family()),
		}
	}
}

impl fmt::Debug for SocketAddress {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SocketAddress")
			.field("family", &self.family())
			.field("addr", &self.to_socket_addr())
			.field("len", &self.len)
			.finish()
	}
}
