//! Runs in its own process so the lifecycle starts uninitialized.

use std::net::SocketAddr;

use socklane::{AddressFamily, PollEntry, PollFlags, ResolutionError, SockType, Socket, SocketAddress, SocketError};

#[test]
fn lifecycle_gates_every_operation() {
	let _ = env_logger::builder().is_test(true).try_init();

	assert!(!socklane::is_initialized());
	assert!(matches!(
		Socket::new(AddressFamily::Ipv4, SockType::Stream),
		Err(SocketError::NotInitialized)
	));
	assert!(matches!(
		SocketAddress::resolve("127.0.0.1", "80", AddressFamily::Ipv4, SockType::Stream),
		Err(ResolutionError::Runtime(SocketError::NotInitialized))
	));
	assert!(matches!(socklane::teardown(), Err(SocketError::NotInitialized)));

	socklane::initialize().unwrap();
	assert!(socklane::is_initialized());
	assert!(matches!(socklane::initialize(), Err(SocketError::AlreadyInitialized)));

	let survivor = Socket::new(AddressFamily::Ipv4, SockType::Datagram).unwrap();
	survivor.bind(&SocketAddress::from(SocketAddr::from(([127, 0, 0, 1], 0)))).unwrap();
	let closed_cleanly = Socket::new(AddressFamily::Ipv4, SockType::Stream).unwrap();
	closed_cleanly.close().unwrap();

	socklane::teardown().unwrap();
	assert!(!socklane::is_initialized());

	assert!(matches!(
		Socket::new(AddressFamily::Ipv4, SockType::Stream),
		Err(SocketError::TornDown)
	));
	assert!(matches!(survivor.local_addr(), Err(SocketError::TornDown)));
	assert!(matches!(
		socklane::poll(&[PollEntry::new(&survivor, PollFlags::IN)], 0),
		Err(SocketError::TornDown)
	));
	assert!(matches!(socklane::initialize(), Err(SocketError::TornDown)));
	assert!(matches!(socklane::teardown(), Err(SocketError::TornDown)));

	// dropped after teardown: released without an explicit close
	drop(survivor);
}
