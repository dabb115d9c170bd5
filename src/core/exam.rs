use rand::Rng;
use rand::seq::SliceRandom;

use super::list::List;
use crate::error::{Error, Result};

/// One correct answer plus two distractors.
pub const MIN_EXAM_QUESTIONS: usize = 3;
const DISTRACTORS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub item_id: String,
    pub prompt: String,
    pub answer: String,
    /// Display order, correct answer included exactly once.
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamState {
    InProgress {
        index: usize,
        score: usize,
        /// Option chosen for the current question; input is locked once set.
        selected: Option<String>,
    },
    Finished {
        score: usize,
        total: usize,
    },
}

/// A running quiz over a shuffled copy of a question list.
#[derive(Debug, Clone)]
pub struct ExamSession {
    pub list_id: String,
    questions: Vec<Question>,
    state: ExamState,
}

/// Build the option set for one question: its own answer plus up to two distinct
/// answers drawn from `others`, shuffled.
pub fn options<R: Rng + ?Sized>(answer: &str, others: &[&str], rng: &mut R) -> Vec<String> {
    let mut pool: Vec<&str> = Vec::new();
    for other in others {
        if *other != answer && !pool.contains(other) {
            pool.push(other);
        }
    }

    let mut opts: Vec<String> = pool
        .choose_multiple(rng, DISTRACTORS)
        .map(|s| s.to_string())
        .collect();
    opts.push(answer.to_string());
    opts.shuffle(rng);
    opts
}

/// Shuffle every item of `list` into an exam. Picked state is ignored.
pub fn start_exam<R: Rng + ?Sized>(list: &List, rng: &mut R) -> Result<ExamSession> {
    if list.items.len() < MIN_EXAM_QUESTIONS {
        return Err(Error::NotEnoughQuestions {
            required: MIN_EXAM_QUESTIONS,
            found: list.items.len(),
        });
    }

    let mut order: Vec<usize> = (0..list.items.len()).collect();
    order.shuffle(rng);

    let questions = order
        .into_iter()
        .map(|idx| {
            let item = &list.items[idx];
            let others: Vec<&str> = list
                .items
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, other)| other.answer_or_default())
                .collect();
            Question {
                item_id: item.id.clone(),
                prompt: item.value.clone(),
                answer: item.answer_or_default().to_string(),
                options: options(item.answer_or_default(), &others, rng),
            }
        })
        .collect();

    log::debug!("Exam started on list {} with {} questions", list.id, list.items.len());

    Ok(ExamSession {
        list_id: list.id.clone(),
        questions,
        state: ExamState::InProgress {
            index: 0,
            score: 0,
            selected: None,
        },
    })
}

impl ExamSession {
    pub fn state(&self) -> &ExamState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> usize {
        match self.state {
            ExamState::InProgress { score, .. } | ExamState::Finished { score, .. } => score,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        match self.state {
            ExamState::InProgress { index, .. } => self.questions.get(index),
            ExamState::Finished { .. } => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, ExamState::Finished { .. })
    }

    /// Answer the current question. Returns whether it was correct, or `None`
    /// when the question is already locked or the exam is over.
    pub fn select(&mut self, option: &str) -> Option<bool> {
        let ExamState::InProgress {
            index,
            score,
            selected,
        } = &mut self.state
        else {
            return None;
        };
        if selected.is_some() {
            return None;
        }

        let correct = self.questions[*index].answer == option;
        if correct {
            *score += 1;
        }
        *selected = Some(option.to_string());
        Some(correct)
    }

    /// Move past an answered question. No-op until the current one is answered.
    pub fn advance(&mut self) {
        let (index, score) = match &self.state {
            ExamState::InProgress {
                index,
                score,
                selected: Some(_),
            } => (*index, *score),
            _ => return,
        };

        self.state = if index + 1 >= self.questions.len() {
            ExamState::Finished {
                score,
                total: self.questions.len(),
            }
        } else {
            ExamState::InProgress {
                index: index + 1,
                score,
                selected: None,
            }
        };
    }

    /// Final score as a rounded percentage.
    pub fn percentage(&self) -> u8 {
        if self.questions.is_empty() {
            return 0;
        }
        ((self.score() as f64 / self.questions.len() as f64) * 100.0).round() as u8
    }
}
