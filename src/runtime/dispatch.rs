use super::{Reply, RequestHeader, Status, Transport};

/// One row of a generated method table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MethodMetadata {
    pub ordinal: u16,
    pub name: &'static str,
    /// Diagnostic hash of `<Interface>::<Method>`; never used for routing.
    pub hash: u32,
}

/// The server side of an interface, implemented by generated stubs.
pub trait Dispatch {
    fn interface_id(&self) -> u32;

    fn method_table(&self) -> &'static [MethodMetadata];

    /// Handles the request addressed to `ordinal`, writing as much of the
    /// response as fits into `response`.
    ///
    /// Returns the full response length, which exceeds `response.len()` when
    /// the response was truncated. Zero means the request was rejected.
    fn dispatch(&self, ordinal: u16, request: &[u8], response: &mut [u8]) -> usize;
}

/// Copies as much of `encoded` as fits into `response` and returns the full
/// encoded length.
pub fn copy_response(encoded: &[u8], response: &mut [u8]) -> usize {
    let n = encoded.len().min(response.len());
    response[..n].copy_from_slice(&encoded[..n]);
    encoded.len()
}

/// A transport which hands requests to an in-process dispatcher. Useful to
/// exercise the full encode and decode path without any IPC.
#[derive(Debug)]
pub struct Loopback<D> {
    dispatcher: D,
    capacity: usize,
}

impl<D: Dispatch> Loopback<D> {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(dispatcher: D) -> Loopback<D> {
        Loopback::with_capacity(dispatcher, Loopback::<D>::DEFAULT_CAPACITY)
    }

    /// Uses an initial response buffer of `capacity` bytes. Truncated
    /// responses are retried once with a buffer of the reported length.
    pub fn with_capacity(dispatcher: D, capacity: usize) -> Loopback<D> {
        Loopback {
            dispatcher,
            capacity,
        }
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }
}

impl<D: Dispatch> Transport for Loopback<D> {
    fn send(&self, header: &RequestHeader, request: &[u8]) -> Reply {
        if header.interface_id != self.dispatcher.interface_id() {
            return Reply::failed(Status::NO_IMPLEMENTATION);
        }
        let mut body = vec![0; self.capacity];
        let mut len = self.dispatcher.dispatch(header.method, request, &mut body);
        if len > body.len() {
            body = vec![0; len];
            len = self.dispatcher.dispatch(header.method, request, &mut body);
            if len > body.len() {
                return Reply::failed(Status::INVALID_SIZE);
            }
        }
        if len == 0 {
            return Reply::failed(Status::FAIL);
        }
        body.truncate(len);
        Reply {
            status: Status::OK,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::runtime::ObjectId;
    use pretty_assertions::assert_eq;

    /// Replies with `ordinal + 1` bytes of `0xAA`.
    #[derive(Default)]
    struct Echo {
        calls: Cell<usize>,
    }

    impl Dispatch for Echo {
        fn interface_id(&self) -> u32 {
            42
        }

        fn method_table(&self) -> &'static [MethodMetadata] {
            &[]
        }

        fn dispatch(&self, ordinal: u16, _: &[u8], response: &mut [u8]) -> usize {
            self.calls.set(self.calls.get() + 1);
            copy_response(&vec![0xAA; usize::from(ordinal) + 1], response)
        }
    }

    fn header(interface_id: u32, method: u16) -> RequestHeader {
        RequestHeader {
            target: ObjectId(0),
            interface_id,
            method,
            call_id: 0,
        }
    }

    #[test]
    fn test_copy_response_reports_true_length() {
        let mut small = [0; 2];
        assert_eq!(copy_response(&[1, 2, 3, 4], &mut small), 4);
        assert_eq!(small, [1, 2]);

        let mut large = [0; 6];
        assert_eq!(copy_response(&[1, 2, 3], &mut large), 3);
        assert_eq!(large, [1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn test_loopback_retries_truncated_response() {
        let loopback = Loopback::with_capacity(Echo::default(), 4);
        let reply = loopback.send(&header(42, 9), &[]);
        assert_eq!(reply.status, Status::OK);
        assert_eq!(reply.body, vec![0xAA; 10]);
        assert_eq!(loopback.dispatcher().calls.get(), 2);
    }

    #[test]
    fn test_loopback_rejects_other_interfaces() {
        let loopback = Loopback::new(Echo::default());
        assert_eq!(
            loopback.send(&header(7, 0), &[]),
            Reply::failed(Status::NO_IMPLEMENTATION)
        );
        assert_eq!(loopback.dispatcher().calls.get(), 0);
    }
}
