//! Canned replies used whenever generation fails or times out.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Templates with a `{complaint}` placeholder for the case's chief complaint.
pub const FALLBACK_PHRASES: [&str; 5] = [
    "I'm sorry, doctor, it's hard to think straight. The {complaint} is all I can focus on.",
    "I don't really know how to answer that. I just know the {complaint} is getting to me.",
    "Can you ask me that again? The {complaint} is making it difficult to concentrate.",
    "I'm not sure, doctor. All I can tell you is that I came in because of {complaint}.",
    "Sorry, I'm feeling too unwell to explain properly. It's mostly the {complaint}.",
];

/// Seeded choice over [`FALLBACK_PHRASES`].
///
/// The same seed yields the same sequence of replies.
#[derive(Debug)]
pub struct FallbackReplies {
    rng: Mutex<StdRng>,
}

impl FallbackReplies {
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Next fallback reply for a patient presenting with `chief_complaint`.
    pub fn reply(&self, chief_complaint: &str) -> String {
        let index = {
            let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            rng.gen_range(0..FALLBACK_PHRASES.len())
        };
        let complaint = chief_complaint.trim().to_lowercase();
        let complaint = if complaint.is_empty() {
            "pain".to_string()
        } else {
            complaint
        };
        FALLBACK_PHRASES[index].replace("{complaint}", &complaint)
    }
}
