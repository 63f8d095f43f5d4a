#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Once;

use socklane::{AddressFamily, SockType, Socket, SocketAddress};

/// Installs the test logger and starts the socket runtime once per binary.
pub fn init() {
	static ONCE: Once = Once::new();
	ONCE.call_once(|| {
		let _ = env_logger::builder().is_test(true).try_init();
		socklane::initialize().expect("socket runtime failed to start");
	});
}

pub fn loopback_v4() -> SocketAddress {
	SocketAddress::from(SocketAddr::from(([127, 0, 0, 1], 0)))
}

/// A listening IPv4 stream socket on an ephemeral loopback port.
pub fn listener(backlog: u8) -> (Socket, SocketAddress) {
	let server = Socket::new(AddressFamily::Ipv4, SockType::Stream).unwrap();
	server.set_reuse_addr(true).unwrap();
	server.bind(&loopback_v4()).unwrap();
	server.listen(backlog).unwrap();
	let addr = server.local_addr().unwrap();
	(server, addr)
}

/// A connected pair: (server listener, client, accepted server side).
pub fn connected_pair() -> (Socket, Socket, Socket) {
	let (server, addr) = listener(1);
	let client = Socket::new(AddressFamily::Ipv4, SockType::Stream).unwrap();
	client.connect(&addr).unwrap();
	let (_, conn) = server.accept().unwrap();
	(server, client, conn)
}
