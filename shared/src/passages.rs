use rand::seq::SliceRandom;
use rand::Rng;

/// Static sample texts offered by the typing test
pub const SAMPLE_TEXTS: &[&str] = &[
    "The quick brown fox jumps over the lazy dog. This pangram contains every letter of the alphabet and is commonly used for typing practice.",
    "In a hole in the ground there lived a hobbit. Not a nasty, dirty, wet hole, filled with the ends of worms and an oozy smell, nor yet a dry, bare, sandy hole with nothing in it to sit down on or to eat.",
    "It was the best of times, it was the worst of times, it was the age of wisdom, it was the age of foolishness, it was the epoch of belief, it was the epoch of incredulity.",
    "To be or not to be, that is the question. Whether 'tis nobler in the mind to suffer the slings and arrows of outrageous fortune, or to take arms against a sea of troubles.",
    "All human beings are born free and equal in dignity and rights. They are endowed with reason and conscience and should act towards one another in a spirit of brotherhood.",
];

/// Pick a passage uniformly at random from `passages`.
pub fn random_passage<R: Rng + ?Sized>(passages: &[&'static str], rng: &mut R) -> Option<&'static str> {
    passages.choose(rng).copied()
}
