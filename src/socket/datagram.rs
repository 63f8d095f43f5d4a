use super::{Socket, check_recv_buf, received, sent};
use crate::addr::SocketAddress;
use crate::error::SocketError;
use crate::sys;

impl Socket {
	/// Sends `buf` to `addr`.
	///
	/// Same conventions as [`Socket::send`]: the count may be short, and
	/// `0` means a non-blocking socket would block.
	pub fn sendto(&self, buf: &[u8], addr: &SocketAddress) -> Result<usize, SocketError> {
		let fd = self.live()?;
		let (storage, len) = addr.as_raw();
		let n = sent(sys::sendto(fd, buf, storage, len))?;
		log::trace!("socket {fd:?} sent {n}/{} bytes to {addr}", buf.len());
		Ok(n)
	}

	/// Receives one message of at most `max_len` bytes with its sender.
	///
	/// `Ok(None)` means a non-blocking socket has nothing queued. Longer
	/// datagrams are truncated to `max_len`, which must be non-zero.
	pub fn recvfrom(&self, max_len: usize) -> Result<Option<(SocketAddress, Vec<u8>)>, SocketError> {
		let mut buf = vec![0u8; max_len];
		Ok(self.recvfrom_into(&mut buf)?.map(|(addr, n)| {
			buf.truncate(n);
			(addr, buf)
		}))
	}

	/// [`Socket::recvfrom`] into a caller-provided buffer.
	pub fn recvfrom_into(&self, buf: &mut [u8]) -> Result<Option<(SocketAddress, usize)>, SocketError> {
		let fd = self.live()?;
		check_recv_buf(buf)?;
		let (mut storage, mut len) = SocketAddress::empty_for_native();
		let Some(n) = received(sys::recvfrom(fd, buf, &mut storage, &mut len))? else {
			return Ok(None);
		};
		let from = SocketAddress::from_raw_parts(storage, len);
		log::trace!("socket {fd:?} received {n} bytes from {from}");
		Ok(Some((from, n)))
	}
}

#[cfg(test)]
mod tests {
	use crate::runtime::init_for_tests;
	use crate::{AddressFamily, SockType, Socket, SocketAddress, SocketError};
	use std::net::SocketAddr;

	fn bound_udp() -> (Socket, SocketAddress) {
		let socket = Socket::new(AddressFamily::Ipv4, SockType::Datagram).unwrap();
		socket.bind(&SocketAddress::from(SocketAddr::from(([127, 0, 0, 1], 0)))).unwrap();
		let addr = socket.local_addr().unwrap();
		(socket, addr)
	}

	// Windows reports WSAEMSGSIZE instead of truncating silently.
	#[cfg(unix)]
	#[test]
	fn oversized_datagram_is_truncated() {
		init_for_tests();
		let (a, a_addr) = bound_udp();
		let (b, b_addr) = bound_udp();

		assert_eq!(a.sendto(b"0123456789", &b_addr).unwrap(), 10);
		b.set_blocking(true).unwrap();
		let (from, data) = b.recvfrom(4).unwrap().unwrap();
		assert_eq!(data, b"0123");
		assert!(from == a_addr);

		a.close().unwrap();
		b.close().unwrap();
	}

	#[test]
	fn nonblocking_recvfrom_on_empty_queue_is_none() {
		init_for_tests();
		let (socket, _) = bound_udp();
		socket.set_blocking(false).unwrap();
		assert!(socket.recvfrom(64).unwrap().is_none());
		let mut buf = [0u8; 8];
		assert!(socket.recvfrom_into(&mut buf).unwrap().is_none());
		socket.close().unwrap();
	}

	#[test]
	fn empty_recvfrom_leaves_datagram_queued() {
		init_for_tests();
		let (a, a_addr) = bound_udp();
		let (b, b_addr) = bound_udp();

		a.sendto(b"keep", &b_addr).unwrap();
		assert!(matches!(b.recvfrom(0), Err(SocketError::InvalidInput { .. })));
		assert!(matches!(b.recvfrom_into(&mut []), Err(SocketError::InvalidInput { .. })));

		let (from, data) = b.recvfrom(16).unwrap().unwrap();
		assert_eq!(data, b"keep");
		assert!(from == a_addr);

		a.close().unwrap();
		b.close().unwrap();
	}

	#[test]
	fn nonblocking_sendto_reports_all_or_nothing() {
		init_for_tests();
		let (a, _) = bound_udp();
		let (b, b_addr) = bound_udp();
		a.set_send_buffer_size(4096).unwrap();
		b.set_recv_buffer_size(4096).unwrap();
		a.set_blocking(false).unwrap();

		// b never reads; every send either goes out whole or would block
		let payload = [0x42u8; 1024];
		for _ in 0..2000 {
			let n = a.sendto(&payload, &b_addr).unwrap();
			assert!(n == payload.len() || n == 0, "unexpected partial datagram send of {n}");
		}

		a.close().unwrap();
		b.close().unwrap();
	}
}
