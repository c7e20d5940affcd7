//! Byte-class checks for Soroban `String` arguments.
//!
//! Soroban strings live in host memory; to inspect them the contract copies
//! the bytes into a fixed stack buffer. [`MAX_TEXT_LEN`] bounds that buffer.

use soroban_sdk::String;

/// Longest string any check in this module will inspect.
pub const MAX_TEXT_LEN: u32 = 256;

/// Returns `true` when `s` is `min..=max` bytes long and every byte satisfies
/// `allowed`. Lengths beyond [`MAX_TEXT_LEN`] are always rejected.
pub fn matches<F>(s: &String, min: u32, max: u32, allowed: F) -> bool
where
    F: Fn(u8) -> bool,
{
    let len = s.len();
    if len < min || len > max || len > MAX_TEXT_LEN {
        return false;
    }

    let mut buf = [0u8; MAX_TEXT_LEN as usize];
    s.copy_into_slice(&mut buf[..len as usize]);
    buf[..len as usize].iter().all(|&b| allowed(b))
}

/// Printable ASCII, space (`' '`) through tilde (`'~'`).
pub fn is_printable(b: u8) -> bool {
    (32..=126).contains(&b)
}

/// Printable ASCII without the space character.
pub fn is_visible(b: u8) -> bool {
    (33..=126).contains(&b)
}

/// Characters allowed in caller-assigned identifiers.
pub fn is_identifier(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':')
}

/// Hexadecimal digit, either case.
pub fn is_hex(b: u8) -> bool {
    b.is_ascii_hexdigit()
}
