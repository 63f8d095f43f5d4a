mod common;

use std::net::SocketAddr;

use socklane::{
	AddressFamily, ConnectorBuilder, DatagramBuilder, ListenerBuilder, PollEntry, PollFlags, ShutdownHow, SockType,
	Socket, SocketAddress, SocketError, poll,
};

#[test]
fn stream_ping_end_to_end() {
	common::init();
	let server = Socket::new(AddressFamily::Ipv4, SockType::Stream).unwrap();
	server.set_reuse_addr(true).unwrap();
	let any_port = SocketAddress::resolve("127.0.0.1", "0", AddressFamily::Ipv4, SockType::Stream).unwrap();
	server.bind(&any_port).unwrap();
	server.listen(1).unwrap();
	let server_addr = server.local_addr().unwrap();
	assert_ne!(server_addr.port(), Some(0));

	let client = Socket::new(AddressFamily::Ipv4, SockType::Stream).unwrap();
	client.connect(&server_addr).unwrap();
	assert!(client.peer().unwrap() == server_addr);

	let (peer, conn) = server.accept().unwrap();
	assert_eq!(peer.host(), client.local_addr().unwrap().host());
	assert!(peer == client.local_addr().unwrap());
	assert_eq!(conn.sock_type(), SockType::Stream);
	assert_eq!(conn.family(), AddressFamily::Ipv4);

	assert_eq!(client.send(b"ping").unwrap(), 4);
	assert_eq!(conn.recv(4096).unwrap().as_deref(), Some(&b"ping"[..]));

	assert_eq!(conn.send(b"pong").unwrap(), 4);
	let mut buf = [0u8; 16];
	let n = client.recv_into(&mut buf).unwrap().unwrap();
	assert_eq!(&buf[..n], b"pong");

	conn.close().unwrap();
	client.close().unwrap();
	server.close().unwrap();
}

#[test]
fn stream_ping_over_ipv6_loopback() {
	common::init();
	let loopback = SocketAddress::from(SocketAddr::from((std::net::Ipv6Addr::LOCALHOST, 0)));
	let server = match ListenerBuilder::new().backlog(1).bind(&loopback) {
		Ok(server) => server,
		// hosts without an IPv6 loopback
		Err(err) => {
			eprintln!("skipping: {err}");
			return;
		}
	};
	let addr = server.local_addr().unwrap();
	assert_eq!(addr.family(), Some(AddressFamily::Ipv6));

	let client = ConnectorBuilder::new().connect(&addr).unwrap();
	let (peer, conn) = server.accept().unwrap();
	assert_eq!(peer.host().as_deref(), Some("::1"));

	client.send(b"six").unwrap();
	assert_eq!(conn.recv(16).unwrap().as_deref(), Some(&b"six"[..]));
}

#[test]
fn datagram_round_trip() {
	common::init();
	let a = DatagramBuilder::new().bind(&common::loopback_v4()).unwrap();
	let b = DatagramBuilder::new().bind(&common::loopback_v4()).unwrap();
	let a_addr = a.local_addr().unwrap();
	let b_addr = b.local_addr().unwrap();

	assert_eq!(a.sendto(b"hello", &b_addr).unwrap(), 5);
	let (from, data) = b.recvfrom(64).unwrap().unwrap();
	assert_eq!(data, b"hello");
	assert!(from == a_addr);

	assert_eq!(b.sendto(b"back", &from).unwrap(), 4);
	let (from, data) = a.recvfrom(64).unwrap().unwrap();
	assert_eq!(data, b"back");
	assert!(from == b_addr);

	a.close().unwrap();
	b.close().unwrap();
}

#[test]
fn end_of_stream_differs_from_would_block() {
	common::init();
	let (server, client, conn) = common::connected_pair();
	conn.set_blocking(false).unwrap();

	// nothing sent yet
	assert_eq!(conn.recv(64).unwrap(), None);

	client.close().unwrap();
	let out = poll(&[PollEntry::new(&conn, PollFlags::IN)], 2000).unwrap();
	assert!(out[0].revents.contains(PollFlags::IN));
	assert_eq!(conn.recv(64).unwrap(), Some(Vec::new()));

	conn.close().unwrap();
	server.close().unwrap();
}

#[test]
fn shutdown_write_is_seen_as_end_of_stream() {
	common::init();
	let (_server, client, conn) = common::connected_pair();
	client.send(b"last").unwrap();
	client.shutdown(ShutdownHow::Write).unwrap();

	let mut received = Vec::new();
	loop {
		match conn.recv(64).unwrap() {
			Some(chunk) if chunk.is_empty() => break,
			Some(chunk) => received.extend(chunk),
			None => unreachable!("blocking socket reported would-block"),
		}
	}
	assert_eq!(received, b"last");

	// the read side of the client is still open
	conn.send(b"ack").unwrap();
	assert_eq!(client.recv(16).unwrap().as_deref(), Some(&b"ack"[..]));
}

#[test]
fn send_that_would_block_returns_zero() {
	common::init();
	let (_server, client, conn) = common::connected_pair();
	client.set_send_buffer_size(4096).unwrap();
	conn.set_recv_buffer_size(4096).unwrap();
	client.set_blocking(false).unwrap();

	let chunk = vec![0x5au8; 64 * 1024];
	let mut saw_zero = false;
	for _ in 0..10_000 {
		if client.send(&chunk).unwrap() == 0 {
			saw_zero = true;
			break;
		}
	}
	assert!(saw_zero, "peer never stopped reading");
}

#[test]
fn nonblocking_connect_completes_through_poll() {
	common::init();
	let (server, addr) = common::listener(4);

	let client = Socket::new(AddressFamily::Ipv4, SockType::Stream).unwrap();
	client.set_blocking(false).unwrap();
	client.connect(&addr).unwrap();

	let out = poll(&[PollEntry::new(&client, PollFlags::OUT)], 2000).unwrap();
	assert!(out[0].revents.contains(PollFlags::OUT));
	assert!(client.take_error().unwrap().is_none());
	assert!(client.peer().unwrap() == addr);

	let (_, conn) = server.accept().unwrap();
	conn.close().unwrap();
	client.close().unwrap();
	server.close().unwrap();
}

#[test]
fn connect_to_closed_port_is_refused() {
	common::init();
	// bind then drop a listener so the port is very likely free
	let (server, addr) = common::listener(1);
	server.close().unwrap();

	let client = Socket::new(AddressFamily::Ipv4, SockType::Stream).unwrap();
	let err = client.connect(&addr).unwrap_err();
	assert!(matches!(err, SocketError::Connect { .. }));
	let os = err.os_error().unwrap();
	assert_ne!(os.code(), 0);
	assert!(!os.message().is_empty());
}

#[test]
fn cloned_socket_shares_the_connection() {
	common::init();
	let (_server, client, conn) = common::connected_pair();
	let clone = client.try_clone().unwrap();
	assert_eq!(clone.family(), client.family());
	assert_eq!(clone.sock_type(), client.sock_type());

	client.close().unwrap();
	clone.send(b"via clone").unwrap();
	assert_eq!(conn.recv(64).unwrap().as_deref(), Some(&b"via clone"[..]));
	clone.close().unwrap();
}

#[test]
fn operations_on_wrong_socket_kind_report_errors() {
	common::init();
	let udp = Socket::new(AddressFamily::Ipv4, SockType::Datagram).unwrap();
	assert!(matches!(udp.listen(1), Err(SocketError::Listen { backlog: 1, .. })));
	assert!(matches!(udp.accept(), Err(SocketError::Accept { .. })));
	udp.close().unwrap();
}
