//! Yes/no intent detection for Hinglish replies.

/// Words and phrases read as agreement.
pub const POSITIVE: PhraseSet = PhraseSet(&[
    "haan", "yes", "tell me more", "batao", "kya hai", "ok", "sure", "ji", "haanji", "y", "h",
    "please", "go ahead", "continue", "chalo", "zarur", "bilkul", "proceed", "aage badho", "hmm",
    "haan na", "why not", "of course",
]);

/// Words and phrases read as refusal.
pub const NEGATIVE: PhraseSet = PhraseSet(&[
    "nahi",
    "no",
    "nahin",
    "n",
    "nope",
    "not interested",
    "leave",
    "stop",
    "don’t want",
    "donot want",
    "na",
    "never",
    "no thanks",
    "no thank you",
]);

/// A fixed vocabulary of single words and multi-word phrases.
#[derive(Debug, Clone, Copy)]
pub struct PhraseSet(&'static [&'static str]);

impl PhraseSet {
    /// Whether `message` contains one of the phrases.
    ///
    /// Multi-word phrases match anywhere in the normalized text; single words
    /// only match whole words.
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        let norm = normalize(message);
        let phrase_hit = self
            .0
            .iter()
            .filter(|p| p.contains(' '))
            .any(|p| norm.contains(p));
        phrase_hit || norm.split_whitespace().any(|w| self.0.contains(&w))
    }
}

/// Strip ASCII punctuation, trim and lowercase.
#[must_use]
pub fn normalize(message: &str) -> String {
    message
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .trim()
        .to_lowercase()
}

#[must_use]
pub fn is_positive(message: &str) -> bool {
    POSITIVE.matches(message)
}

#[must_use]
pub fn is_negative(message: &str) -> bool {
    NEGATIVE.matches(message)
}
