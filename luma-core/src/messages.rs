//! Friendly text: per-condition "cute" forecast messages and greetings.

use rand::RngExt;

use crate::codes::{ConditionKind, condition_kind};

/// Source of random choices, injectable so callers can pin results.
pub trait RandomSource {
    /// Index in `0..len`. Only called with `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Thread-local RNG backed source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

pub fn pick<'a>(pool: &[&'a str], rng: &mut dyn RandomSource) -> Option<&'a str> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.pick_index(pool.len()).min(pool.len() - 1);
    Some(pool[index])
}

const CLEAR: &[&str] = &[
    "Yay! It's super sunny and beautiful! ☀️",
    "Perfect weather for a little adventure.",
    "Don't forget your sunnies! 😎",
    "Soak up that sunshine!",
    "It's a happy blue sky day.",
];

const CLOUDY: &[&str] = &[
    "The clouds are giving the sun a hug. ☁️",
    "Cozy vibes only today.",
    "A perfect day for a warm cup of tea.",
    "Soft gray skies are kinda nice, right?",
    "Sweater weather is the best weather.",
];

const RAIN: &[&str] = &[
    "Pitter patter! Don't forget your umbrella. ☔",
    "Nature is taking a little shower.",
    "Perfect excuse to stay in and cuddle.",
    "Time to rock those rainboots!",
    "Stay dry and cozy inside! 🏠",
];

const SNOW: &[&str] = &[
    "It's a winter wonderland out there! ❄️",
    "Time for hot cocoa and fuzzy socks.",
    "Everything looks like a sugar cookie.",
    "Bundle up, little marshmallow!",
    "Stay warm and snuggly.",
];

const THUNDER: &[&str] = &[
    "Whoa, the sky is grumpy today! ⛈️",
    "Safe and sound inside is the place to be.",
    "Thunder buddies for life!",
    "Let's stay in and watch movies.",
];

const FOG: &[&str] = &[
    "It's a little mysterious out there... 🌫️",
    "The world is wearing a soft blanket.",
    "Be careful, it's a bit hard to see!",
];

pub const CLEAR_NIGHT_MESSAGE: &str = "Have a restful night.";
pub const FALLBACK_MESSAGE: &str = "Have a great day!";

/// Message pool for a condition family.
pub fn pool(kind: ConditionKind) -> &'static [&'static str] {
    match kind {
        ConditionKind::Clear => CLEAR,
        ConditionKind::Cloud => CLOUDY,
        ConditionKind::Fog => FOG,
        ConditionKind::Rain => RAIN,
        ConditionKind::Snow => SNOW,
        ConditionKind::Thunder => THUNDER,
    }
}

/// Random friendly message for a weather code. A clear night always gets
/// [`CLEAR_NIGHT_MESSAGE`]; unknown codes get [`FALLBACK_MESSAGE`].
pub fn cute_message(code: i32, is_night: bool, rng: &mut dyn RandomSource) -> &'static str {
    match condition_kind(code) {
        Some(ConditionKind::Clear) if is_night => CLEAR_NIGHT_MESSAGE,
        Some(kind) => pick(pool(kind), rng).unwrap_or(FALLBACK_MESSAGE),
        None => FALLBACK_MESSAGE,
    }
}

/// Greeting for the local hour (0-23).
pub fn greeting(user_name: &str, hour: u32) -> String {
    let name = match user_name.trim() {
        "" => "sunshine",
        name => name,
    };

    let salutation = match hour {
        0..=4 => "Sweet dreams",
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        17..=20 => "Good evening",
        _ => "Good night",
    };

    format!("{salutation}, {name}!")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Always picks the same index (clamped by `pick`).
    pub(crate) struct FixedIndex(pub usize);

    impl RandomSource for FixedIndex {
        fn pick_index(&mut self, _len: usize) -> usize {
            self.0
        }
    }

    #[test]
    fn clear_night_has_its_own_message() {
        let mut rng = FixedIndex(3);
        assert_eq!(cute_message(0, true, &mut rng), CLEAR_NIGHT_MESSAGE);
        assert_eq!(cute_message(1, false, &mut rng), CLEAR[3]);
    }

    #[test]
    fn messages_come_from_the_condition_pool() {
        let mut rng = FixedIndex(0);
        assert_eq!(cute_message(3, false, &mut rng), CLOUDY[0]);
        assert_eq!(cute_message(48, false, &mut rng), FOG[0]);
        assert_eq!(cute_message(55, false, &mut rng), RAIN[0]);
        assert_eq!(cute_message(81, true, &mut rng), RAIN[0]);
        assert_eq!(cute_message(86, false, &mut rng), SNOW[0]);
        assert_eq!(cute_message(95, false, &mut rng), THUNDER[0]);
    }

    #[test]
    fn unknown_codes_use_fallback() {
        let mut rng = FixedIndex(0);
        assert_eq!(cute_message(4, false, &mut rng), FALLBACK_MESSAGE);
        assert_eq!(cute_message(-7, true, &mut rng), FALLBACK_MESSAGE);
    }

    #[test]
    fn out_of_range_pick_is_clamped() {
        let mut rng = FixedIndex(99);
        assert_eq!(pick(THUNDER, &mut rng), Some(THUNDER[3]));
        assert_eq!(pick(&[], &mut rng), None);
    }

    #[test]
    fn thread_random_stays_in_bounds() {
        let mut rng = ThreadRandom;
        for _ in 0..100 {
            assert!(rng.pick_index(5) < 5);
        }
    }

    #[test]
    fn greeting_by_hour() {
        assert_eq!(greeting("Ana", 3), "Sweet dreams, Ana!");
        assert_eq!(greeting("Ana", 5), "Good morning, Ana!");
        assert_eq!(greeting("Ana", 12), "Good afternoon, Ana!");
        assert_eq!(greeting("Ana", 20), "Good evening, Ana!");
        assert_eq!(greeting("Ana", 21), "Good night, Ana!");
        assert_eq!(greeting("  ", 9), "Good morning, sunshine!");
    }
}
