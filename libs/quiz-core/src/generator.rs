//! Fill-in-the-blank question generation from note text.
//!
//! # Heuristic
//! 1. Split the text on `.`, `!` and `?`; keep fragments longer than 20 characters.
//! 2. Draw up to N sentences without replacement.
//! 3. Keep words longer than 3 characters as blank candidates; skip the sentence
//!    when fewer than 3 remain.
//! 4. Blank the first occurrence of a random candidate (never one of the last two).
//! 5. Pick 3 distractors of similar length, padding with `Option N` labels.
//! 6. Shuffle the four options and record where the answer landed.
//!
//! Output is random; only the shape of each question is guaranteed.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CountError;
use crate::types::GeneratedQuestion;

/// Placeholder substituted for the blanked word.
pub const BLANK: &str = "_____";

/// Prefix placed in front of every question stem.
pub const QUESTION_PREFIX: &str = "Fill in the blank: ";

/// Number of options on every question.
pub const OPTION_COUNT: usize = 4;

const DISTRACTOR_COUNT: usize = OPTION_COUNT - 1;
const MIN_SENTENCE_CHARS: usize = 20;
const MIN_WORD_CHARS: usize = 3;
const MIN_CANDIDATES: usize = 3;
const LENGTH_TOLERANCE: usize = 2;
/// Trailing candidates that are never chosen as the answer.
const TAIL_EXCLUDED: usize = 2;

/// Requested number of questions, bounded to what the editor offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct QuestionCount(usize);

impl QuestionCount {
    pub const MIN: usize = 3;
    pub const MAX: usize = 20;
    pub const DEFAULT: usize = 5;

    pub fn new(requested: usize) -> Result<Self, CountError> {
        if (Self::MIN..=Self::MAX).contains(&requested) {
            Ok(Self(requested))
        } else {
            Err(CountError::OutOfRange {
                requested,
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<usize> for QuestionCount {
    type Error = CountError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<QuestionCount> for usize {
    fn from(count: QuestionCount) -> Self {
        count.0
    }
}

/// Generate up to `count` questions from `text` using the thread-local RNG.
pub fn generate_questions(text: &str, count: usize) -> Vec<GeneratedQuestion> {
    generate_questions_with(text, count, &mut rand::thread_rng())
}

/// Generate up to `count` questions from `text` with the given RNG.
///
/// Returns fewer questions (possibly none) when the text is short or its
/// sentences lack enough long words. Never fails.
pub fn generate_questions_with<R: Rng + ?Sized>(
    text: &str,
    count: usize,
    rng: &mut R,
) -> Vec<GeneratedQuestion> {
    let sentences = split_sentences(text);

    let mut indices: Vec<usize> = (0..sentences.len()).collect();
    indices.shuffle(rng);

    let mut questions = Vec::new();
    for idx in indices.into_iter().take(count) {
        // A skipped sentence still consumes its slot.
        if let Some(question) = question_from_sentence(sentences[idx], rng) {
            questions.push(question);
        }
    }
    questions
}

/// Split text into trimmed sentences long enough to quiz on.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(|c: char| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Words of `sentence` long enough to be blanked, in sentence order.
pub fn blank_candidates(sentence: &str) -> Vec<&str> {
    sentence
        .split_whitespace()
        .filter(|w| w.chars().count() > MIN_WORD_CHARS)
        .collect()
}

/// Pick three distractors for `answer` among `words`.
///
/// Prefers distinct words within two characters of the answer's length and
/// pads with `Option N` labels when too few qualify.
pub fn pick_distractors<R: Rng + ?Sized>(
    answer: &str,
    words: &[&str],
    rng: &mut R,
) -> Vec<String> {
    let answer_len = answer.chars().count();

    let mut candidates: Vec<&str> = Vec::new();
    for &word in words {
        let len = word.chars().count();
        let similar = len + LENGTH_TOLERANCE >= answer_len && len <= answer_len + LENGTH_TOLERANCE;
        if word != answer && similar && !candidates.contains(&word) {
            candidates.push(word);
        }
    }
    candidates.shuffle(rng);

    let mut distractors: Vec<String> = candidates
        .into_iter()
        .take(DISTRACTOR_COUNT)
        .map(str::to_string)
        .collect();
    while distractors.len() < DISTRACTOR_COUNT {
        distractors.push(format!("Option {}", distractors.len() + 1));
    }
    distractors
}

fn question_from_sentence<R: Rng + ?Sized>(sentence: &str, rng: &mut R) -> Option<GeneratedQuestion> {
    let words = blank_candidates(sentence);
    if words.len() < MIN_CANDIDATES {
        return None;
    }

    let answer = words[rng.gen_range(0..words.len() - TAIL_EXCLUDED)];
    let stem = sentence.replacen(answer, BLANK, 1);

    let mut slots: Vec<(bool, String)> = Vec::with_capacity(OPTION_COUNT);
    slots.push((true, answer.to_string()));
    slots.extend(
        pick_distractors(answer, &words, rng)
            .into_iter()
            .map(|d| (false, d)),
    );
    slots.shuffle(rng);

    let correct_answer = slots.iter().position(|(is_answer, _)| *is_answer)?;
    let options: [String; OPTION_COUNT] = slots
        .into_iter()
        .map(|(_, option)| option)
        .collect::<Vec<_>>()
        .try_into()
        .ok()?;

    Some(GeneratedQuestion {
        question: format!("{}{}", QUESTION_PREFIX, stem),
        options,
        correct_answer,
    })
}
