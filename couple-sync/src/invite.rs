//! Invite codes.
//!
//! A code is eight symbols from a 32-character alphabet without the easily
//! confused `0`, `O`, `1` and `I`, shown as `XXXX-XXXX`. Two codes name the
//! same shared record when their [`record_key`]s are equal, so typing the
//! code in lowercase or without the hyphen still works.

use rand::Rng;

/// Symbols used in invite codes.
pub const ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Symbols per half of a code.
const GROUP_LEN: usize = 4;

/// Generates a fresh `XXXX-XXXX` code.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut code = String::with_capacity(GROUP_LEN * 2 + 1);
    for i in 0..GROUP_LEN * 2 {
        if i == GROUP_LEN {
            code.push('-');
        }
        let idx = rng.gen_range(0..ALPHABET.len());
        code.push(char::from(ALPHABET[idx]));
    }
    code
}

/// Trims and uppercases user input. Does not validate.
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Key of the shared record for a code: normalized with hyphens removed.
pub fn record_key(code: &str) -> String {
    normalize(code).replace('-', "")
}

/// Returns true if the normalized code has the `XXXX-XXXX` shape over
/// [`ALPHABET`].
///
/// Only used for warnings; redeeming accepts anything non-empty.
pub fn is_well_formed(code: &str) -> bool {
    let normalized = normalize(code);
    let Some((left, right)) = normalized.split_once('-') else {
        return false;
    };
    [left, right].iter().all(|group| {
        group.len() == GROUP_LEN && group.bytes().all(|b| ALPHABET.contains(&b))
    })
}
