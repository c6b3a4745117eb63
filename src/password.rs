//! Random password suggestions for new entries.

use rand::seq::SliceRandom;
use rand::Rng;

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIALS: &[u8] = b"$&@!?";

/// Characters drawn from letters and digits.
const BODY_LEN: usize = 13;
/// Special characters appended before shuffling.
const SPECIAL_COUNT: usize = 2;

/// Generate a password with the thread-local RNG.
pub fn generate_password() -> String {
    generate_password_with(&mut rand::thread_rng())
}

/// 13 characters, each from a class (lowercase, uppercase, digit) picked
/// uniformly, plus two specials, shuffled together.
pub fn generate_password_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    const CLASSES: [&[u8]; 3] = [LOWERCASE, UPPERCASE, DIGITS];

    let mut chars: Vec<u8> = Vec::with_capacity(BODY_LEN + SPECIAL_COUNT);
    for _ in 0..BODY_LEN {
        let class = CLASSES[rng.gen_range(0..CLASSES.len())];
        chars.push(class[rng.gen_range(0..class.len())]);
    }
    for _ in 0..SPECIAL_COUNT {
        chars.push(SPECIALS[rng.gen_range(0..SPECIALS.len())]);
    }
    chars.shuffle(rng);

    chars.into_iter().map(char::from).collect()
}
