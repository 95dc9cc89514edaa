//! Benchmarked element type.

use std::cmp::Ordering;

/// An element ordered by an `i32` key.
pub trait Keyed {
    /// Build an element from its key.
    fn from_key(key: i32) -> Self;

    /// The sort key.
    fn key(&self) -> i32;
}

/// A 4-byte key followed by `PAYLOAD` opaque bytes.
///
/// Equality and ordering look at the key only, so elements with equal keys
/// but different payloads compare equal; the payload lets tests observe
/// whether a sort kept equal keys in order.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct Element<const PAYLOAD: usize> {
    key: i32,
    payload: [u8; PAYLOAD],
}

impl<const PAYLOAD: usize> Element<PAYLOAD> {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Build an element with an explicit payload.
    pub fn with_payload(key: i32, payload: [u8; PAYLOAD]) -> Self {
        Self { key, payload }
    }

    /// The payload bytes.
    pub fn payload(&self) -> &[u8; PAYLOAD] {
        &self.payload
    }
}

impl<const PAYLOAD: usize> Keyed for Element<PAYLOAD> {
    #[inline]
    fn from_key(key: i32) -> Self {
        Self {
            key,
            payload: [0; PAYLOAD],
        }
    }

    #[inline]
    fn key(&self) -> i32 {
        self.key
    }
}

impl<const PAYLOAD: usize> PartialEq for Element<PAYLOAD> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<const PAYLOAD: usize> Eq for Element<PAYLOAD> {}

impl<const PAYLOAD: usize> PartialOrd for Element<PAYLOAD> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<const PAYLOAD: usize> Ord for Element<PAYLOAD> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(Element::<0>::SIZE, 4);
        assert_eq!(Element::<4>::SIZE, 8);
        assert_eq!(Element::<12>::SIZE, 16);
        assert_eq!(Element::<124>::SIZE, 128);
    }

    #[test]
    fn test_ordering_ignores_payload() {
        let a = Element::<2>::with_payload(7, [1, 2]);
        let b = Element::<2>::with_payload(7, [9, 9]);
        assert_eq!(a, b);
        assert!(Element::<2>::from_key(3) < a);
    }
}
