use std::{
    rc::Rc,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use super::{ObjectId, Status};

/// Addresses one call: the target object, the interface and the method
/// ordinal within it. `call_id` lets a transport correlate replies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RequestHeader {
    pub target: ObjectId,
    pub interface_id: u32,
    pub method: u16,
    pub call_id: u32,
}

/// The outcome of a round trip. `status` is the transport's own status;
/// `body` starts with the status of the call itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: Status,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn failed(status: Status) -> Reply {
        Reply {
            status,
            body: Vec::new(),
        }
    }
}

/// Sends a request and blocks until its reply arrives.
///
/// Cancellation and timeouts are the transport's business; it reports them
/// through [`Reply::status`].
pub trait Transport {
    fn send(&self, header: &RequestHeader, request: &[u8]) -> Reply;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, header: &RequestHeader, request: &[u8]) -> Reply {
        (**self).send(header, request)
    }
}

impl<T: Transport + ?Sized> Transport for Rc<T> {
    fn send(&self, header: &RequestHeader, request: &[u8]) -> Reply {
        (**self).send(header, request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(&self, header: &RequestHeader, request: &[u8]) -> Reply {
        (**self).send(header, request)
    }
}

/// Something that lives on the other side of a transport.
pub trait ObjectHandle {
    fn object_id(&self) -> ObjectId;
}

impl ObjectHandle for ObjectId {
    fn object_id(&self) -> ObjectId {
        *self
    }
}

/// Direct-call strategy: calls go straight to the held implementation.
#[derive(Clone, Debug, Default)]
pub struct Local<T> {
    implementation: T,
}

impl<T> Local<T> {
    pub fn new(implementation: T) -> Local<T> {
        Local { implementation }
    }

    pub fn get(&self) -> &T {
        &self.implementation
    }

    pub fn into_inner(self) -> T {
        self.implementation
    }
}

/// Serialize-call strategy: calls are encoded and handed to a transport.
#[derive(Debug)]
pub struct Remote<R> {
    transport: R,
    target: ObjectId,
    next_call_id: AtomicU32,
}

impl<R: Transport> Remote<R> {
    pub fn new(transport: R, target: &impl ObjectHandle) -> Remote<R> {
        Remote {
            transport,
            target: target.object_id(),
            next_call_id: AtomicU32::new(0),
        }
    }

    pub fn target(&self) -> ObjectId {
        self.target
    }

    pub fn transport(&self) -> &R {
        &self.transport
    }

    /// Sends one request, returning the reply body on transport success.
    ///
    /// The body still begins with the call status, which the caller must
    /// check before reading anything else.
    pub fn call(&self, interface_id: u32, method: u16, request: &[u8]) -> Result<Vec<u8>, Status> {
        let header = RequestHeader {
            target: self.target,
            interface_id,
            method,
            call_id: self.next_call_id.fetch_add(1, Ordering::Relaxed),
        };
        let reply = self.transport.send(&header, request);
        if reply.status.is_failure() {
            return Err(reply.status);
        }
        Ok(reply.body)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        headers: RefCell<Vec<RequestHeader>>,
        status: Status,
    }

    impl Transport for Recorder {
        fn send(&self, header: &RequestHeader, request: &[u8]) -> Reply {
            self.headers.borrow_mut().push(*header);
            Reply {
                status: self.status,
                body: request.to_vec(),
            }
        }
    }

    #[test]
    fn test_call_ids_increase() {
        let recorder = Recorder::default();
        let remote = Remote::new(&recorder, &ObjectId(9));
        assert_eq!(remote.call(7, 0, b"x"), Ok(b"x".to_vec()));
        assert_eq!(remote.call(7, 3, b""), Ok(Vec::new()));
        let headers = recorder.headers.borrow();
        let ids: Vec<_> = headers.iter().map(|h| (h.call_id, h.method)).collect();
        assert_eq!(ids, [(0, 0), (1, 3)]);
        assert!(headers
            .iter()
            .all(|h| h.target == ObjectId(9) && h.interface_id == 7));
    }

    #[test]
    fn test_transport_failure_is_returned() {
        let recorder = Recorder {
            status: Status::TIMEOUT,
            ..Recorder::default()
        };
        let remote = Remote::new(recorder, &ObjectId(1));
        assert_eq!(remote.call(1, 0, b"payload"), Err(Status::TIMEOUT));
    }
}
