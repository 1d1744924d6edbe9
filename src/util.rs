use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Truncates `text` to at most `max_chars` characters, appending an ellipsis
/// when anything was cut.
pub fn short_label(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Deterministic pseudo-random pair in `[-1, 1]²` derived from `id`.
pub fn stable_pair(id: &str) -> (f32, f32) {
    stable_pair_salted(id, 0)
}

/// Like [`stable_pair`] but varies with `salt`, e.g. a tick counter.
pub fn stable_pair_salted(id: &str, salt: u64) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    salt.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
