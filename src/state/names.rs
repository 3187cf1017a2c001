//! Generated nicknames for new sessions.
//!
//! New connections are greeted with a two-word petname (adjective + animal)
//! truncated to 9 characters, so a rename to a 10-character nickname is
//! always possible. Uniqueness is the caller's predicate; reserved names can
//! never be produced because the word lists are lowercase.

use rand::seq::SliceRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "able", "bold", "brave", "calm", "clever", "cold", "cool", "crisp", "deep", "dim", "dry",
    "fair", "fast", "fine", "firm", "fond", "free", "glad", "good", "gray", "great", "green",
    "happy", "keen", "kind", "late", "lazy", "light", "loud", "lucky", "mild", "neat", "new",
    "nice", "odd", "pale", "proud", "quick", "quiet", "rare", "red", "ripe", "safe", "sharp",
    "shy", "slow", "soft", "warm", "wild", "wise",
];

const ANIMALS: &[&str] = &[
    "ant", "bat", "bear", "bee", "bird", "boar", "carp", "cat", "crab", "crow", "deer", "dove",
    "duck", "eel", "elk", "fox", "frog", "gnat", "goat", "gull", "hare", "hawk", "hen", "ibis",
    "koi", "lark", "lion", "lynx", "mole", "moth", "mouse", "newt", "owl", "ox", "pike", "pony",
    "pug", "ram", "rat", "seal", "slug", "swan", "toad", "trout", "vole", "wasp", "wolf", "wren",
    "yak", "zebu",
];

/// Candidate attempts before falling back to numbered guests.
const MAX_ATTEMPTS: usize = 64;

/// Generate a nickname for which `taken` returns `false`.
///
/// The caller checks uniqueness under its own lock; this function only
/// produces candidates.
pub(crate) fn generate_nick<F>(taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut rng = rand::thread_rng();

    for _ in 0..MAX_ATTEMPTS {
        // The lists are non-empty, so `choose` cannot fail.
        let Some(adjective) = ADJECTIVES.choose(&mut rng) else {
            break;
        };
        let Some(animal) = ANIMALS.choose(&mut rng) else {
            break;
        };

        let mut candidate = format!("{adjective}{animal}");
        candidate.truncate(9);
        if !taken(&candidate) {
            return candidate;
        }
    }

    // Dense registry: fall back to numbered guests, still 10 chars max.
    let mut n: u32 = rng.gen_range(0..100_000);
    loop {
        let candidate = format!("guest{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n = (n + 1) % 100_000;
    }
}
