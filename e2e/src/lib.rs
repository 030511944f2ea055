//! Code generated from `idl/` at build time.

#[allow(clippy::all, clippy::pedantic, dead_code)]
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/bundle.rs"));
}
