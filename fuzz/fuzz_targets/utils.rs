use std::str;

pub const MAX_INPUT_SIZE: usize = 64 * 1024;

/// A UTF-8 view of `data` capped at `MAX_INPUT_SIZE`.
///
/// Up to 3 trailing bytes are dropped to recover from a cap that splits a
/// multibyte codepoint.
#[inline]
pub fn truncate_utf8(data: &[u8]) -> Option<&str> {
    let cap = data.len().min(MAX_INPUT_SIZE);
    (0..=cap.min(3)).find_map(|trim| str::from_utf8(&data[..cap - trim]).ok())
}
