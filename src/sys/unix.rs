use std::ffi::{CStr, CString};

use crate::poll::PollFlags;

pub(crate) type RawSocket = libc::c_int;
pub(crate) type SockLen = libc::socklen_t;
pub(crate) type SockAddr = libc::sockaddr;
pub(crate) type Storage = libc::sockaddr_storage;
pub(crate) type SockAddrIn = libc::sockaddr_in;
pub(crate) type SockAddrIn6 = libc::sockaddr_in6;
pub(crate) type PollFd = libc::pollfd;

pub(crate) const INVALID_SOCKET: RawSocket = -1;

pub(crate) const AF_UNSPEC: i32 = libc::AF_UNSPEC;
pub(crate) const AF_INET: i32 = libc::AF_INET;
pub(crate) const AF_INET6: i32 = libc::AF_INET6;

pub(crate) const SOCK_STREAM: i32 = libc::SOCK_STREAM;
pub(crate) const SOCK_DGRAM: i32 = libc::SOCK_DGRAM;

pub(crate) const SHUT_RD: i32 = libc::SHUT_RD;
pub(crate) const SHUT_WR: i32 = libc::SHUT_WR;
pub(crate) const SHUT_RDWR: i32 = libc::SHUT_RDWR;

pub(crate) const SOL_SOCKET: i32 = libc::SOL_SOCKET;
pub(crate) const SO_REUSEADDR: i32 = libc::SO_REUSEADDR;
pub(crate) const SO_KEEPALIVE: i32 = libc::SO_KEEPALIVE;
pub(crate) const SO_RCVBUF: i32 = libc::SO_RCVBUF;
pub(crate) const SO_SNDBUF: i32 = libc::SO_SNDBUF;
pub(crate) const SO_ERROR: i32 = libc::SO_ERROR;
pub(crate) const IPPROTO_TCP: i32 = libc::IPPROTO_TCP;
pub(crate) const TCP_NODELAY: i32 = libc::TCP_NODELAY;
pub(crate) const IPPROTO_IPV6: i32 = libc::IPPROTO_IPV6;
pub(crate) const IPV6_V6ONLY: i32 = libc::IPV6_V6ONLY;

#[cfg(test)]
pub(crate) const EWOULDBLOCK: i32 = libc::EWOULDBLOCK;
#[cfg(test)]
pub(crate) const ECONNRESET: i32 = libc::ECONNRESET;

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd"))]
const SEND_FLAGS: libc::c_int = libc::MSG_NOSIGNAL;
#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd", target_os = "netbsd", target_os = "openbsd")))]
const SEND_FLAGS: libc::c_int = 0;

/// Returns the calling thread's errno.
#[inline]
pub(crate) fn last_error() -> i32 {
	std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

pub(crate) fn error_message(code: i32) -> String {
	std::io::Error::from_raw_os_error(code).to_string()
}

#[inline]
pub(crate) fn is_would_block(code: i32) -> bool {
	code == libc::EAGAIN || code == libc::EWOULDBLOCK
}

#[inline]
pub(crate) fn is_in_progress(code: i32) -> bool {
	code == libc::EINPROGRESS
}

/// POSIX needs no subsystem startup.
pub(crate) fn startup() -> Result<(), i32> {
	Ok(())
}

pub(crate) fn cleanup() -> Result<(), i32> {
	Ok(())
}

#[inline]
fn cvt(ret: libc::c_int) -> Result<libc::c_int, i32> {
	if ret == -1 { Err(last_error()) } else { Ok(ret) }
}

#[inline]
fn cvt_size(ret: libc::ssize_t) -> Result<usize, i32> {
	if ret == -1 { Err(last_error()) } else { Ok(ret as usize) }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) fn socket(family: i32, ty: i32) -> Result<RawSocket, i32> {
	cvt(unsafe { libc::socket(family, ty | libc::SOCK_CLOEXEC, 0) })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub(crate) fn socket(family: i32, ty: i32) -> Result<RawSocket, i32> {
	let fd = cvt(unsafe { libc::socket(family, ty, 0) })?;
	if let Err(code) = prepare(fd) {
		unsafe { libc::close(fd) };
		return Err(code);
	}
	Ok(fd)
}

/// Applies what Linux gets from `SOCK_CLOEXEC` and `MSG_NOSIGNAL`.
#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn prepare(fd: RawSocket) -> Result<(), i32> {
	cvt(unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) })?;
	#[cfg(any(target_os = "macos", target_os = "ios", target_os = "tvos", target_os = "watchos"))]
	setsockopt_int(fd, SOL_SOCKET, libc::SO_NOSIGPIPE, 1)?;
	Ok(())
}

pub(crate) fn close(fd: RawSocket) -> Result<(), i32> {
	cvt(unsafe { libc::close(fd) }).map(drop)
}

pub(crate) fn bind(fd: RawSocket, addr: &Storage, len: SockLen) -> Result<(), i32> {
	cvt(unsafe { libc::bind(fd, super::storage_ptr(addr), len) }).map(drop)
}

pub(crate) fn connect(fd: RawSocket, addr: &Storage, len: SockLen) -> Result<(), i32> {
	cvt(unsafe { libc::connect(fd, super::storage_ptr(addr), len) }).map(drop)
}

pub(crate) fn listen(fd: RawSocket, backlog: i32) -> Result<(), i32> {
	cvt(unsafe { libc::listen(fd, backlog) }).map(drop)
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub(crate) fn accept(fd: RawSocket, addr: &mut Storage, len: &mut SockLen) -> Result<RawSocket, i32> {
	cvt(unsafe { libc::accept4(fd, super::storage_mut_ptr(addr), len, libc::SOCK_CLOEXEC) })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub(crate) fn accept(fd: RawSocket, addr: &mut Storage, len: &mut SockLen) -> Result<RawSocket, i32> {
	let new_fd = cvt(unsafe { libc::accept(fd, super::storage_mut_ptr(addr), len) })?;
	if let Err(code) = prepare(new_fd) {
		unsafe { libc::close(new_fd) };
		return Err(code);
	}
	Ok(new_fd)
}

pub(crate) fn send(fd: RawSocket, buf: &[u8]) -> Result<usize, i32> {
	cvt_size(unsafe {
		libc::send(fd, buf.as_ptr() as *const libc::c_void, buf.len(), SEND_FLAGS)
	})
}

pub(crate) fn sendto(fd: RawSocket, buf: &[u8], addr: &Storage, len: SockLen) -> Result<usize, i32> {
	cvt_size(unsafe {
		libc::sendto(
			fd,
			buf.as_ptr() as *const libc::c_void,
			buf.len(),
			SEND_FLAGS,
			super::storage_ptr(addr),
			len,
		)
	})
}

pub(crate) fn recv(fd: RawSocket, buf: &mut [u8]) -> Result<usize, i32> {
	cvt_size(unsafe {
		libc::recv(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0)
	})
}

pub(crate) fn recvfrom(fd: RawSocket, buf: &mut [u8], addr: &mut Storage, len: &mut SockLen) -> Result<usize, i32> {
	cvt_size(unsafe {
		libc::recvfrom(
			fd,
			buf.as_mut_ptr() as *mut libc::c_void,
			buf.len(),
			0,
			super::storage_mut_ptr(addr),
			len,
		)
	})
}

pub(crate) fn getpeername(fd: RawSocket, addr: &mut Storage, len: &mut SockLen) -> Result<(), i32> {
	cvt(unsafe { libc::getpeername(fd, super::storage_mut_ptr(addr), len) }).map(drop)
}

pub(crate) fn getsockname(fd: RawSocket, addr: &mut Storage, len: &mut SockLen) -> Result<(), i32> {
	cvt(unsafe { libc::getsockname(fd, super::storage_mut_ptr(addr), len) }).map(drop)
}

pub(crate) fn shutdown(fd: RawSocket, how: i32) -> Result<(), i32> {
	cvt(unsafe { libc::shutdown(fd, how) }).map(drop)
}

pub(crate) fn setsockopt_int(fd: RawSocket, level: i32, name: i32, value: i32) -> Result<(), i32> {
	let val: libc::c_int = value;
	cvt(unsafe {
		libc::setsockopt(
			fd,
			level,
			name,
			&val as *const _ as *const libc::c_void,
			std::mem::size_of::<libc::c_int>() as libc::socklen_t,
		)
	})
	.map(drop)
}

pub(crate) fn getsockopt_int(fd: RawSocket, level: i32, name: i32) -> Result<i32, i32> {
	let mut val: libc::c_int = 0;
	let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
	cvt(unsafe {
		libc::getsockopt(fd, level, name, &mut val as *mut _ as *mut libc::c_void, &mut len)
	})?;
	Ok(val)
}

pub(crate) fn set_nonblocking(fd: RawSocket, nonblocking: bool) -> Result<(), i32> {
	let flags = cvt(unsafe { libc::fcntl(fd, libc::F_GETFL) })?;
	let new_flags = if nonblocking {
		flags | libc::O_NONBLOCK
	} else {
		flags & !libc::O_NONBLOCK
	};
	if new_flags != flags {
		cvt(unsafe { libc::fcntl(fd, libc::F_SETFL, new_flags) })?;
	}
	Ok(())
}

pub(crate) fn is_nonblocking(fd: RawSocket) -> Result<bool, i32> {
	let flags = cvt(unsafe { libc::fcntl(fd, libc::F_GETFL) })?;
	Ok(flags & libc::O_NONBLOCK != 0)
}

pub(crate) fn duplicate(fd: RawSocket) -> Result<RawSocket, i32> {
	cvt(unsafe { libc::fcntl(fd, libc::F_DUPFD_CLOEXEC, 0) })
}

pub(crate) fn poll_fd(fd: RawSocket, events: PollFlags) -> PollFd {
	let mut native: libc::c_short = 0;
	if events.contains(PollFlags::IN) {
		native |= libc::POLLIN;
	}
	if events.contains(PollFlags::PRI) {
		native |= libc::POLLPRI;
	}
	if events.contains(PollFlags::OUT) {
		native |= libc::POLLOUT;
	}
	libc::pollfd { fd, events: native, revents: 0 }
}

pub(crate) fn poll_revents(fd: &PollFd) -> PollFlags {
	let native = fd.revents;
	let mut flags = PollFlags::empty();
	for (bit, flag) in [
		(libc::POLLIN, PollFlags::IN),
		(libc::POLLPRI, PollFlags::PRI),
		(libc::POLLOUT, PollFlags::OUT),
		(libc::POLLERR, PollFlags::ERR),
		(libc::POLLHUP, PollFlags::HUP),
		(libc::POLLNVAL, PollFlags::NVAL),
	] {
		if native & bit != 0 {
			flags |= flag;
		}
	}
	flags
}

/// Negative timeouts block indefinitely.
pub(crate) fn poll(fds: &mut [PollFd], timeout: i32) -> Result<usize, i32> {
	let timeout = if timeout < 0 { -1 } else { timeout };
	let n = cvt(unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout) })?;
	Ok(n as usize)
}

/// Resolves through `getaddrinfo` and copies the first candidate.
///
/// Errors carry the resolver code and its text; `EAI_SYSTEM` is rendered
/// from errno instead.
pub(crate) fn resolve(host: &CString, port: &CString, family: i32, ty: i32) -> Result<Option<(Storage, SockLen)>, (i32, String)> {
	let mut hints: libc::addrinfo = unsafe { std::mem::zeroed() };
	hints.ai_family = family;
	hints.ai_socktype = ty;
	let mut res: *mut libc::addrinfo = std::ptr::null_mut();

	let status = unsafe { libc::getaddrinfo(host.as_ptr(), port.as_ptr(), &hints, &mut res) };
	if status != 0 {
		let message = if status == libc::EAI_SYSTEM {
			error_message(last_error())
		} else {
			unsafe { CStr::from_ptr(libc::gai_strerror(status)) }
				.to_string_lossy()
				.into_owned()
		};
		return Err((status, message));
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
		libc::freeaddrinfo(res);
	}
	Ok(Some((storage, len as SockLen)))
}

#[inline]
pub(crate) fn storage_family(storage: &Storage) -> i32 {
	storage.ss_family as i32
}

pub(crate) fn encode_v4(addr: &std::net::SocketAddrV4) -> (Storage, SockLen) {
	let (mut storage, _) = super::empty_storage();
	let raw = unsafe { &mut *(&mut storage as *mut Storage as *mut libc::sockaddr_in) };
	raw.sin_family = libc::AF_INET as libc::sa_family_t;
	raw.sin_port = addr.port().to_be();
	raw.sin_addr.s_addr = u32::from_ne_bytes(addr.ip().octets());
	(storage, std::mem::size_of::<SockAddrIn>() as SockLen)
}

pub(crate) fn decode_v4(raw: &SockAddrIn) -> std::net::SocketAddrV4 {
	std::net::SocketAddrV4::new(
		raw.sin_addr.s_addr.to_ne_bytes().into(),
		u16::from_be(raw.sin_port),
	)
}

pub(crate) fn encode_v6(addr: &std::net::SocketAddrV6) -> (Storage, SockLen) {
	let (mut storage, _) = super::empty_storage();
	let raw = unsafe { &mut *(&mut storage as *mut Storage as *mut libc::sockaddr_in6) };
	raw.sin6_family = libc::AF_INET6 as libc::sa_family_t;
	raw.sin6_port = addr.port().to_be();
	raw.sin6_flowinfo = addr.flowinfo();
	raw.sin6_addr.s6_addr = addr.ip().octets();
	raw.sin6_scope_id = addr.scope_id();
	(storage, std::mem::size_of::<SockAddrIn6>() as SockLen)
}

pub(crate) fn decode_v6(raw: &SockAddrIn6) -> std::net::SocketAddrV6 {
	std::net::SocketAddrV6::new(
		raw.sin6_addr.s6_addr.into(),
		u16::from_be(raw.sin6_port),
		raw.sin6_flowinfo,
		raw.sin6_scope_id,
	)
}
