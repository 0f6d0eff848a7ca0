//! Display-order randomization.
//!
//! Produces a shuffled copy of an exam: the question order and, independently,
//! each question's choice order. The source exam is left untouched so a cached
//! copy can seed any number of attempts. Once shuffled, the original positions
//! are gone; answers are tracked against the shuffled order only.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::Exam;

/// Which permutations to apply when arranging an exam for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleOptions {
    pub questions: bool,
    pub choices: bool,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        Self {
            questions: true,
            choices: true,
        }
    }
}

impl ShuffleOptions {
    /// Keep document order.
    pub fn none() -> Self {
        Self {
            questions: false,
            choices: false,
        }
    }
}

/// Shuffle questions and choices with the thread-local RNG.
pub fn randomize(exam: &Exam) -> Exam {
    randomize_with(exam, &mut rand::thread_rng())
}

/// Shuffle questions and choices with the given RNG.
pub fn randomize_with<R: Rng + ?Sized>(exam: &Exam, rng: &mut R) -> Exam {
    arrange(exam, ShuffleOptions::default(), rng)
}

/// Apply the permutations selected in `options` to a copy of `exam`.
pub fn arrange<R: Rng + ?Sized>(exam: &Exam, options: ShuffleOptions, rng: &mut R) -> Exam {
    let mut arranged = exam.clone();

    if options.questions {
        arranged.questions.shuffle(rng);
    }

    if options.choices {
        for question in &mut arranged.questions {
            question.choices.shuffle(rng);
        }
    }

    arranged
}
