use std::ffi::CString;

use windows_sys::Win32::Networking::WinSock as ws;
use windows_sys::Win32::System::Threading::GetCurrentProcessId;

use crate::poll::PollFlags;

pub(crate) type RawSocket = ws::SOCKET;
pub(crate) type SockLen = i32;
pub(crate) type SockAddr = ws::SOCKADDR;
pub(crate) type Storage = ws::SOCKADDR_STORAGE;
pub(crate) type SockAddrIn = ws::SOCKADDR_IN;
pub(crate) type SockAddrIn6 = ws::SOCKADDR_IN6;
pub(crate) type PollFd = ws::WSAPOLLFD;

pub(crate) const INVALID_SOCKET: RawSocket = ws::INVALID_SOCKET;

pub(crate) const AF_UNSPEC: i32 = ws::AF_UNSPEC as i32;
pub(crate) const AF_INET: i32 = ws::AF_INET as i32;
pub(crate) const AF_INET6: i32 = ws::AF_INET6 as i32;

pub(crate) const SOCK_STREAM: i32 = ws::SOCK_STREAM as i32;
pub(crate) const SOCK_DGRAM: i32 = ws::SOCK_DGRAM as i32;

pub(crate) const SHUT_RD: i32 = ws::SD_RECEIVE as i32;
pub(crate) const SHUT_WR: i32 = ws::SD_SEND as i32;
pub(crate) const SHUT_RDWR: i32 = ws::SD_BOTH as i32;

pub(crate) const SOL_SOCKET: i32 = ws::SOL_SOCKET as i32;
pub(crate) const SO_REUSEADDR: i32 = ws::SO_REUSEADDR as i32;
pub(crate) const SO_KEEPALIVE: i32 = ws::SO_KEEPALIVE as i32;
pub(crate) const SO_RCVBUF: i32 = ws::SO_RCVBUF as i32;
pub(crate) const SO_SNDBUF: i32 = ws::SO_SNDBUF as i32;
pub(crate) const SO_ERROR: i32 = ws::SO_ERROR as i32;
pub(crate) const IPPROTO_TCP: i32 = ws::IPPROTO_TCP as i32;
pub(crate) const TCP_NODELAY: i32 = ws::TCP_NODELAY as i32;
pub(crate) const IPPROTO_IPV6: i32 = ws::IPPROTO_IPV6 as i32;
pub(crate) const IPV6_V6ONLY: i32 = ws::IPV6_V6ONLY as i32;

const SOCKET_ERROR: i32 = ws::SOCKET_ERROR;

#[cfg(test)]
pub(crate) const EWOULDBLOCK: i32 = ws::WSAEWOULDBLOCK;
#[cfg(test)]
pub(crate) const ECONNRESET: i32 = ws::WSAECONNRESET;

/// Returns `WSAGetLastError()` for the calling thread.
#[inline]
pub(crate) fn last_error() -> i32 {
	unsafe { ws::WSAGetLastError() }
}

/// Renders through `FormatMessageW`, which std already wraps.
pub(crate) fn error_message(code: i32) -> String {
	std::io::Error::from_raw_os_error(code).to_string()
}

#[inline]
pub(crate) fn is_would_block(code: i32) -> bool {
	code == ws::WSAEWOULDBLOCK
}

/// A non-blocking connect reports WSAEWOULDBLOCK rather than EINPROGRESS.
#[inline]
pub(crate) fn is_in_progress(code: i32) -> bool {
	code == ws::WSAEWOULDBLOCK || code == ws::WSAEINPROGRESS
}

/// `WSAStartup` reports its error as the return value, not through
/// `WSAGetLastError`.
pub(crate) fn startup() -> Result<(), i32> {
	let mut data: ws::WSADATA = unsafe { std::mem::zeroed() };
	let rc = unsafe { ws::WSAStartup(0x202, &mut data) }; // MAKEWORD(2,2)
	if rc != 0 { Err(rc) } else { Ok(()) }
}

pub(crate) fn cleanup() -> Result<(), i32> {
	cvt(unsafe { ws::WSACleanup() }).map(drop)
}

#[inline]
fn cvt(ret: i32) -> Result<i32, i32> {
	if ret == SOCKET_ERROR { Err(last_error()) } else { Ok(ret) }
}

#[inline]
fn cvt_socket(s: RawSocket) -> Result<RawSocket, i32> {
	if s == INVALID_SOCKET { Err(last_error()) } else { Ok(s) }
}

#[inline]
fn clamp_len(len: usize) -> i32 {
	len.min(i32::MAX as usize) as i32
}

pub(crate) fn socket(family: i32, ty: i32) -> Result<RawSocket, i32> {
	cvt_socket(unsafe {
		ws::WSASocketW(
			family,
			ty as _,
			0,
			std::ptr::null(),
			0,
			ws::WSA_FLAG_OVERLAPPED | ws::WSA_FLAG_NO_HANDLE_INHERIT,
		)
	})
}

pub(crate) fn close(s: RawSocket) -> Result<(), i32> {
	cvt(unsafe { ws::closesocket(s) }).map(drop)
}

pub(crate) fn bind(s: RawSocket, addr: &Storage, len: SockLen) -> Result<(), i32> {
	cvt(unsafe { ws::bind(s, super::storage_ptr(addr), len) }).map(drop)
}

pub(crate) fn connect(s: RawSocket, addr: &Storage, len: SockLen) -> Result<(), i32> {
	cvt(unsafe { ws::connect(s, super::storage_ptr(addr), len) }).map(drop)
}

pub(crate) fn listen(s: RawSocket, backlog: i32) -> Result<(), i32> {
	cvt(unsafe { ws::listen(s, backlog) }).map(drop)
}

pub(crate) fn accept(s: RawSocket, addr: &mut Storage, len: &mut SockLen) -> Result<RawSocket, i32> {
	cvt_socket(unsafe { ws::accept(s, super::storage_mut_ptr(addr), len) })
}

pub(crate) fn send(s: RawSocket, buf: &[u8]) -> Result<usize, i32> {
	let n = cvt(unsafe { ws::send(s, buf.as_ptr(), clamp_len(buf.len()), 0) })?;
	Ok(n as usize)
}

pub(crate) fn sendto(s: RawSocket, buf: &[u8], addr: &Storage, len: SockLen) -> Result<usize, i32> {
	let n = cvt(unsafe {
		ws::sendto(s, buf.as_ptr(), clamp_len(buf.len()), 0, super::storage_ptr(addr), len)
	})?;
	Ok(n as usize)
}

pub(crate) fn recv(s: RawSocket, buf: &mut [u8]) -> Result<usize, i32> {
	let n = cvt(unsafe { ws::recv(s, buf.as_mut_ptr(), clamp_len(buf.len()), 0) })?;
	Ok(n as usize)
}

pub(crate) fn recvfrom(s: RawSocket, buf: &mut [u8], addr: &mut Storage, len: &mut SockLen) -> Result<usize, i32> {
	let n = cvt(unsafe {
		ws::recvfrom(
			s,
			buf.as_mut_ptr(),
			clamp_len(buf.len()),
			0,
			super::storage_mut_ptr(addr),
			len,
		)
	})?;
	Ok(n as usize)
}

pub(crate) fn getpeername(s: RawSocket, addr: &mut Storage, len: &mut SockLen) -> Result<(), i32> {
	cvt(unsafe { ws::getpeername(s, super::storage_mut_ptr(addr), len) }).map(drop)
}

pub(crate) fn getsockname(s: RawSocket, addr: &mut Storage, len: &mut SockLen) -> Result<(), i32> {
	cvt(unsafe { ws::getsockname(s, super::storage_mut_ptr(addr), len) }).map(drop)
}

pub(crate) fn shutdown(s: RawSocket, how: i32) -> Result<(), i32> {
	cvt(unsafe { ws::shutdown(s, how as _) }).map(drop)
}

pub(crate) fn setsockopt_int(s: RawSocket, level: i32, name: i32, value: i32) -> Result<(), i32> {
	let val: i32 = value;
	cvt(unsafe {
		ws::setsockopt(
			s,
			level,
			name,
			&val as *const i32 as *const u8,
			std::mem::size_of::<i32>() as i32,
		)
	})
	.map(drop)
}

pub(crate) fn getsockopt_int(s: RawSocket, level: i32, name: i32) -> Result<i32, i32> {
	let mut val: i32 = 0;
	let mut len = std::mem::size_of::<i32>() as i32;
	cvt(unsafe { ws::getsockopt(s, level, name, &mut val as *mut i32 as *mut u8, &mut len) })?;
	Ok(val)
}

pub(crate) fn set_nonblocking(s: RawSocket, nonblocking: bool) -> Result<(), i32> {
	let mut arg: u32 = if nonblocking { 1 } else { 0 };
	cvt(unsafe { ws::ioctlsocket(s, ws::FIONBIO, &mut arg) }).map(drop)
}

/// Duplicates through a protocol-info round trip; the result is a new
/// handle, not an alias.
pub(crate) fn duplicate(s: RawSocket) -> Result<RawSocket, i32> {
	let mut info: ws::WSAPROTOCOL_INFOW = unsafe { std::mem::zeroed() };
	cvt(unsafe { ws::WSADuplicateSocketW(s, GetCurrentProcessId(), &mut info) })?;
	cvt_socket(unsafe {
		ws::WSASocketW(
			info.iAddressFamily,
			info.iSocketType,
			info.iProtocol,
			&info,
			0,
			ws::WSA_FLAG_OVERLAPPED | ws::WSA_FLAG_NO_HANDLE_INHERIT,
		)
	})
}

/// WSAPoll rejects POLLPRI in `events`, so priority maps onto POLLRDBAND.
pub(crate) fn poll_fd(s: RawSocket, events: PollFlags) -> PollFd {
	let mut native: i16 = 0;
	if events.contains(PollFlags::IN) {
		native |= ws::POLLRDNORM as i16;
	}
	if events.contains(PollFlags::PRI) {
		native |= ws::POLLRDBAND as i16;
	}
	if events.contains(PollFlags::OUT) {
		native |= ws::POLLWRNORM as i16;
	}
	ws::WSAPOLLFD { fd: s, events: native as _, revents: 0 }
}

pub(crate) fn poll_revents(fd: &PollFd) -> PollFlags {
	let native = fd.revents as i16;
	let mut flags = PollFlags::empty();
	for (bit, flag) in [
		(ws::POLLRDNORM as i16, PollFlags::IN),
		(ws::POLLRDBAND as i16, PollFlags::PRI),
		(ws::POLLWRNORM as i16, PollFlags::OUT),
		(ws::POLLERR as i16, PollFlags::ERR),
		(ws::POLLHUP as i16, PollFlags::HUP),
		(ws::POLLNVAL as i16, PollFlags::NVAL),
	] {
		if native & bit != 0 {
			flags |= flag;
		}
	}
	flags
}

pub(crate) fn poll(fds: &mut [PollFd], timeout: i32) -> Result<usize, i32> {
	let timeout = if timeout < 0 { -1 } else { timeout };
	let n = cvt(unsafe { ws::WSAPoll(fds.as_mut_ptr(), fds.len() as u32, timeout) })?;
	Ok(n as usize)
}

/// Resolves through `getaddrinfo`; on Windows the resolver codes are
/// WSA error codes, so they render like any other socket error.
pub(crate) fn resolve(host: &CString, port: &CString, family: i32, ty: i32) -> Result<Option<(Storage, SockLen)>, (i32, String)> {
	let mut hints: ws::ADDRINFOA = unsafe { std::mem::zeroed() };
	hints.ai_family = family;
	hints.ai_socktype = ty;
	let mut res: *mut ws::ADDRINFOA = std::ptr::null_mut();

	let status = unsafe {
		ws::getaddrinfo(host.as_ptr() as *const u8, port.as_ptr() as *const u8, &hints, &mut res)
	};
	if status != 0 {
		return Err((status, error_message(status)));
	}
	if res.is_null() {
		return Ok(None);
	}

	let (mut storage, capacity) = super::empty_storage();
	let first = unsafe { &*res };
	let len = (first.ai_addrlen as usize).min(capacity as usize);
	unsafe {
		std::ptr::copy_nonoverlapping(
			first.ai_addr as *const u8,
			&mut storage as *mut Storage as *mut u8,
			len,
		);
		ws::freeaddrinfo(res);
	}
	Ok(Some((storage, len as SockLen)))
}

#[inline]
pub(crate) fn storage_family(storage: &Storage) -> i32 {
	storage.ss_family as i32
}

pub(crate) fn encode_v4(addr: &std::net::SocketAddrV4) -> (Storage, SockLen) {
	let (mut storage, _) = super::empty_storage();
	let raw = unsafe { &mut *(&mut storage as *mut Storage as *mut SockAddrIn) };
	raw.sin_family = ws::AF_INET;
	raw.sin_port = addr.port().to_be();
	raw.sin_addr.S_un.S_addr = u32::from_ne_bytes(addr.ip().octets());
	(storage, std::mem::size_of::<SockAddrIn>() as SockLen)
}

pub(crate) fn decode_v4(raw: &SockAddrIn) -> std::net::SocketAddrV4 {
	let s_addr = unsafe { raw.sin_addr.S_un.S_addr };
	std::net::SocketAddrV4::new(s_addr.to_ne_bytes().into(), u16::from_be(raw.sin_port))
}

pub(crate) fn encode_v6(addr: &std::net::SocketAddrV6) -> (Storage, SockLen) {
	let (mut storage, _) = super::empty_storage();
	let raw = unsafe { &mut *(&mut storage as *mut Storage as *mut SockAddrIn6) };
	raw.sin6_family = ws::AF_INET6;
	raw.sin6_port = addr.port().to_be();
	raw.sin6_flowinfo = addr.flowinfo();
	raw.sin6_addr.u.Byte = addr.ip().octets();
	raw.Anonymous.sin6_scope_id = addr.scope_id();
	(storage, std::mem::size_of::<SockAddrIn6>() as SockLen)
}

pub(crate) fn decode_v6(raw: &SockAddrIn6) -> std::net::SocketAddrV6 {
	let (octets, scope_id) = unsafe { (raw.sin6_addr.u.Byte, raw.Anonymous.sin6_scope_id) };
	std::net::SocketAddrV6::new(
		octets.into(),
		u16::from_be(raw.sin6_port),
		raw.sin6_flowinfo,
		scope_id,
	)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn priority_maps_onto_rdband() {
		let fd = poll_fd(INVALID_SOCKET, PollFlags::PRI);
		assert_eq!(fd.events as i16, ws::POLLRDBAND as i16);

		let mut fd = poll_fd(INVALID_SOCKET, PollFlags::IN | PollFlags::PRI | PollFlags::OUT);
		assert_eq!(fd.events as i16, (ws::POLLRDNORM | ws::POLLRDBAND | ws::POLLWRNORM) as i16);

		fd.revents = (ws::POLLRDBAND | ws::POLLHUP) as _;
		assert_eq!(poll_revents(&fd), PollFlags::PRI | PollFlags::HUP);
	}
}
