mod common;

use socklane::{AddressFamily, ResolutionError, SockType, SocketAddress};

#[test]
fn resolve_ipv4_literal() {
	common::init();
	let addr = SocketAddress::resolve("127.0.0.1", "9000", AddressFamily::Ipv4, SockType::Stream).unwrap();
	assert_eq!(addr.host().as_deref(), Some("127.0.0.1"));
	assert_eq!(addr.port(), Some(9000));
	assert_eq!(addr.family(), Some(AddressFamily::Ipv4));
	// sockaddr_in is 16 bytes on every supported platform
	assert_eq!(addr.length(), 16);
}

#[test]
fn resolve_ipv6_literal() {
	common::init();
	let addr = SocketAddress::resolve("::1", "443", AddressFamily::Ipv6, SockType::Stream).unwrap();
	assert_eq!(addr.host().as_deref(), Some("::1"));
	assert_eq!(addr.port(), Some(443));
	assert_eq!(addr.family(), Some(AddressFamily::Ipv6));
	assert_eq!(addr.length(), 28);
}

#[test]
fn unspecified_hints_follow_the_literal() {
	common::init();
	let addr = SocketAddress::resolve("10.0.0.7", "53", AddressFamily::Unspecified, SockType::Unspecified).unwrap();
	assert_eq!(addr.family(), Some(AddressFamily::Ipv4));
	assert_eq!(addr.to_string(), "10.0.0.7:53");
}

#[test]
fn same_inputs_compare_equal() {
	common::init();
	let a = SocketAddress::resolve("127.0.0.1", "8080", AddressFamily::Ipv4, SockType::Stream).unwrap();
	let b = SocketAddress::resolve("127.0.0.1", "8080", AddressFamily::Ipv4, SockType::Stream).unwrap();
	assert!(a == b);

	let c = SocketAddress::resolve("::1", "8080", AddressFamily::Ipv6, SockType::Stream).unwrap();
	let d = SocketAddress::resolve("::1", "8080", AddressFamily::Ipv6, SockType::Datagram).unwrap();
	assert!(c == d);

	let other_port = SocketAddress::resolve("127.0.0.1", "8081", AddressFamily::Ipv4, SockType::Stream).unwrap();
	assert!(a != other_port);
}

#[test]
fn ipv4_never_equals_ipv6() {
	common::init();
	let v4 = SocketAddress::resolve("0.0.0.1", "1", AddressFamily::Ipv4, SockType::Stream).unwrap();
	let v6 = SocketAddress::resolve("::1", "1", AddressFamily::Ipv6, SockType::Stream).unwrap();
	assert!(v4 != v6);
	assert!(v6 != v4);
}

#[test]
fn unspecified_address_equals_nothing() {
	let unspec = SocketAddress::unspecified();
	let v4 = SocketAddress::from(std::net::SocketAddr::from(([127, 0, 0, 1], 1)));
	assert!(unspec != unspec.clone());
	assert!(unspec != v4);
	assert!(v4 != unspec);
}

#[test]
fn unknown_service_is_a_resolution_error() {
	common::init();
	let err = SocketAddress::resolve("127.0.0.1", "no-such-service-here", AddressFamily::Ipv4, SockType::Stream)
		.unwrap_err();
	match err {
		ResolutionError::Lookup { code, message, .. } => {
			assert_ne!(code, 0);
			assert!(!message.is_empty());
		}
		other => panic!("expected a lookup error, got {other:?}"),
	}
}

#[test]
fn nul_in_host_is_rejected_before_lookup() {
	common::init();
	let err = SocketAddress::resolve("127.0.0.1\0", "80", AddressFamily::Ipv4, SockType::Stream).unwrap_err();
	assert!(matches!(err, ResolutionError::InvalidInput { .. }));
}

#[test]
fn std_round_trip() {
	let std_addr: std::net::SocketAddr = "[fe80::1]:5000".parse().unwrap();
	let addr = SocketAddress::from(std_addr);
	assert_eq!(addr.to_socket_addr(), Some(std_addr));
	assert_eq!(addr.host().as_deref(), Some("fe80::1"));
}
