//! User decisions
//!
//! The pipeline never talks to a terminal directly. Every question goes
//! through a [`Prompter`], so the binary can ask interactively while tests
//! replay a fixed list of answers with [`ScriptedPrompter`].

use std::collections::VecDeque;

use crate::error::{Error, Result};

/// Source of user decisions
pub trait Prompter {
    /// Ask a yes/no question
    fn confirm(&mut self, question: &str) -> Result<bool>;

    /// Pick one of `choices`; `None` means the user made no selection
    fn select(&mut self, question: &str, choices: &[String]) -> Result<Option<usize>>;
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        (**self).confirm(question)
    }

    fn select(&mut self, question: &str, choices: &[String]) -> Result<Option<usize>> {
        (**self).select(question, choices)
    }
}

/// A recorded answer for [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Answer to [`Prompter::confirm`]
    Confirm(bool),
    /// Answer to [`Prompter::select`]
    Select(Option<usize>),
}

/// Replays prepared answers in order
///
/// Asking a question of the wrong kind, or more questions than answers were
/// prepared, yields [`Error::Prompt`]. Every question asked is kept in
/// [`ScriptedPrompter::asked`].
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    /// Create a prompter replaying `answers`
    pub fn new<I: IntoIterator<Item = Answer>>(answers: I) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }

    /// Questions asked so far
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// Answers that were never consumed
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, question: &str) -> Result<Answer> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no scripted answer for {question:?}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        match self.next(question)? {
            Answer::Confirm(yes) => Ok(yes),
            other => Err(Error::Prompt(format!(
                "expected a confirmation for {question:?}, got {other:?}"
            ))),
        }
    }

    fn select(&mut self, question: &str, choices: &[String]) -> Result<Option<usize>> {
        match self.next(question)? {
            Answer::Select(Some(index)) if index >= choices.len() => Err(Error::Prompt(format!(
                "choice {index} out of range for {question:?}"
            ))),
            Answer::Select(choice) => Ok(choice),
            other => Err(Error::Prompt(format!(
                "expected a selection for {question:?}, got {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_answers_in_order() {
        let mut prompter = ScriptedPrompter::new([
            Answer::Confirm(true),
            Answer::Select(Some(1)),
            Answer::Confirm(false),
        ]);
        let choices = vec!["a".to_string(), "b".to_string()];

        assert!(prompter.confirm("first?").unwrap());
        assert_eq!(prompter.select("pick", &choices).unwrap(), Some(1));
        assert!(!prompter.confirm("last?").unwrap());
        assert_eq!(prompter.asked(), ["first?", "pick", "last?"]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_exhausted_script_is_an_error() {
        let mut prompter = ScriptedPrompter::default();
        assert!(matches!(prompter.confirm("more?"), Err(Error::Prompt(_))));
    }

    #[test]
    fn test_mismatched_answer_kind_is_an_error() {
        let mut prompter = ScriptedPrompter::new([Answer::Select(None)]);
        assert!(matches!(prompter.confirm("yes?"), Err(Error::Prompt(_))));
    }

    #[test]
    fn test_out_of_range_selection_is_an_error() {
        let mut prompter = ScriptedPrompter::new([Answer::Select(Some(3))]);
        let choices = vec!["only".to_string()];
        assert!(matches!(
            prompter.select("pick", &choices),
            Err(Error::Prompt(_))
        ));
    }
}
