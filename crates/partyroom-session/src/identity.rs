//! Room codes and in-room display names.

use partyroom_protocol::RoomCode;
use rand::Rng;

/// Characters a room code is drawn from. No `0/O` or `1/I` to misread.
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const ROOM_CODE_LEN: usize = 6;

/// Draws a random room code.
///
/// Uniqueness is the caller's job: the registry re-rolls while the code
/// belongs to a live room.
pub fn generate_room_id<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..ROOM_CODE_LEN)
        .map(|_| {
            char::from(ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())])
        })
        .collect();
    RoomCode::new(code)
}

/// Returns `requested` if no existing name matches it, otherwise
/// `stem_{n}` where `n` is one past the highest suffix in use for the stem.
///
/// A numeric suffix is `_` followed only by ASCII digits; the bare stem
/// counts as suffix 0. With `{"a", "a_1", "a_2"}` taken, `"a"` and
/// `"a_1"` both resolve to `"a_3"`.
///
/// The result is at most `max_len` characters. A stem too long for its
/// suffix is cut short, and the suffix keeps counting up past any name the
/// cut collides with.
pub fn resolve_unique_name<I, S>(requested: &str, existing: I, max_len: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let existing: Vec<S> = existing.into_iter().collect();
    if !existing.iter().any(|n| n.as_ref() == requested) {
        return requested.to_string();
    }

    let (stem, _) = split_suffix(requested);
    let highest = existing
        .iter()
        .filter_map(|n| {
            let (s, suffix) = split_suffix(n.as_ref());
            (s == stem).then_some(suffix)
        })
        .max()
        .unwrap_or(0);

    let mut n = highest.saturating_add(1);
    loop {
        let suffix = format!("_{n}");
        let keep = max_len.saturating_sub(suffix.len());
        let candidate: String = stem.chars().take(keep).chain(suffix.chars()).collect();
        if !existing.iter().any(|e| e.as_ref() == candidate) {
            return candidate;
        }
        n = n.saturating_add(1);
    }
}

fn split_suffix(name: &str) -> (&str, u64) {
    if let Some((stem, digits)) = name.rsplit_once('_') {
        let numeric =
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
        if numeric && !stem.is_empty() {
            if let Ok(n) = digits.parse() {
                return (stem, n);
            }
        }
    }
    (name, 0)
}
