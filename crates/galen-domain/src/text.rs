//! UTF-8 safe offset helpers for slicing document text

/// Largest char boundary in `s` that is `<= index`
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Smallest char boundary in `s` that is `>= index`, capped at `s.len()`
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}

/// Byte range `[start, end)` extended by `radius` on both sides, clamped to
/// `s` and widened to char boundaries
pub fn window_bounds(s: &str, start: usize, end: usize, radius: usize) -> (usize, usize) {
    let lo = floor_char_boundary(s, start.saturating_sub(radius));
    let hi = ceil_char_boundary(s, end.saturating_add(radius));
    (lo, hi.max(lo))
}
