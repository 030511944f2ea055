//! Stable 32-bit identifiers, derived with FNV-1a.
//!
//! Interface identifiers are part of the wire protocol. Method hashes are
//! only carried for diagnostics; calls are routed by method ordinal.

pub const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
pub const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a over the provided bytes.
pub const fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Derives the interface identifier from its unique id.
///
/// Braces are ignored and hex digits are case-insensitive, so
/// `{abcdef12-...}` and `ABCDEF12-...` yield the same identifier.
pub fn interface_id(uuid: &str) -> u32 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in uuid.bytes().filter(|b| !matches!(b, b'{' | b'}')) {
        hash ^= u32::from(byte.to_ascii_uppercase());
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// The diagnostic hash of `<interface>::<method>`.
pub fn method_hash(interface: &str, method: &str) -> u32 {
    fnv1a(format!("{interface}::{method}").as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_values() {
        assert_eq!(fnv1a(b""), 0x811c_9dc5);
        assert_eq!(fnv1a(b"a"), 0xe40c_292c);
        assert_eq!(fnv1a(b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn test_interface_id_ignores_case_and_braces() {
        let upper = interface_id("ABCDEF12-0000-0000-0000-000000000000");
        let lower = interface_id("abcdef12-0000-0000-0000-000000000000");
        let braced = interface_id("{abcdef12-0000-0000-0000-000000000000}");
        assert_eq!(upper, lower);
        assert_eq!(upper, braced);
        assert_eq!(upper, fnv1a(b"ABCDEF12-0000-0000-0000-000000000000"));
        assert_ne!(upper, interface_id("ABCDEF13-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_method_hash_is_over_qualified_name() {
        assert_eq!(method_hash("IExample", "Add"), fnv1a(b"IExample::Add"));
        assert_ne!(method_hash("IExample", "Add"), method_hash("IOther", "Add"));
    }
}
