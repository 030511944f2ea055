//! Support code used by generated proxies and stubs.
//!
//! Generated modules refer to this module as `rt`.

mod call;
mod dispatch;
mod status;
mod wire;

pub use call::{Local, ObjectHandle, Remote, Reply, RequestHeader, Transport};
pub use dispatch::{copy_response, Dispatch, Loopback, MethodMetadata};
pub use status::Status;
pub use wire::{Guid, ObjectId, Wire, WireError, WireReader, WireWriter};
