//! `ordered.idl` and `swapped.idl` declare the same interface with its two
//! methods in opposite order. Calls are routed by position, so the two builds
//! share an interface id yet disagree on what each ordinal means.

use e2e::generated::{ordered, swapped};
use pretty_assertions::assert_eq;
use rpcidl::runtime::{Dispatch, Loopback, ObjectId, Status};

struct Fixed;

impl ordered::IPair for Fixed {
    fn first(&self, value: &mut i32) -> Status {
        *value = 1;
        Status::OK
    }

    fn second(&self, value: &mut i32) -> Status {
        *value = 2;
        Status::OK
    }
}

impl swapped::IPair for Fixed {
    fn second(&self, value: &mut i32) -> Status {
        *value = 2;
        Status::OK
    }

    fn first(&self, value: &mut i32) -> Status {
        *value = 1;
        Status::OK
    }
}

fn value_at(stub: &impl Dispatch, ordinal: u16) -> Vec<u8> {
    let mut response = [0; 16];
    let len = stub.dispatch(ordinal, &[], &mut response);
    response[..len].to_vec()
}

fn reply_with(value: i32) -> Vec<u8> {
    [0i32, value].iter().flat_map(|v| v.to_le_bytes()).collect()
}

#[test]
fn test_interface_id_ignores_method_order() {
    assert_eq!(ordered::pair::INTERFACE_ID, swapped::pair::INTERFACE_ID);
}

#[test]
fn test_dispatch_routes_by_position() {
    let ordered = ordered::PairStub::new(Fixed);
    let swapped = swapped::PairStub::new(Fixed);
    assert_eq!(value_at(&ordered, 0), reply_with(1));
    assert_eq!(value_at(&swapped, 0), reply_with(2));
    assert_eq!(value_at(&ordered, 1), reply_with(2));
    assert_eq!(value_at(&swapped, 1), reply_with(1));
}

#[test]
fn test_mismatched_builds_call_the_wrong_method() {
    use ordered::PairClient;

    let stub = swapped::PairStub::new(Fixed);
    let proxy = ordered::PairProxy::remote(Loopback::new(stub), &ObjectId(1));
    let mut value = 0;
    assert_eq!(proxy.first(&mut value), Status::OK);
    assert_eq!(value, 2);
}
