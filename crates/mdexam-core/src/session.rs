//! Attempt tracker: in-memory state for one attempt at an exam.
//!
//! A [`Session`] is a small state machine. While a question is on screen the
//! session is in [`SessionState::Viewing`]; submitting from the last question
//! or running out of time moves it to [`SessionState::Scored`], which is
//! terminal. Every transition away from a question first copies the on-screen
//! selection into the answers map (an untouched question is stored as all
//! `false`), so moving back and forth never loses an answer.
//!
//! Inputs arrive as [`Action`]s. [`Session::dispatch`] applies one in place and
//! reports what happened; [`Session::apply`] is the same step as a pure
//! `(Session, Action) -> Session` function.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::error::ExamError;
use crate::model::{AnswerMode, Exam, Question};
use crate::scoring::{score_answers, ScoreSummary};

/// Selected flags per question index, one flag per displayed choice.
pub type Answers = BTreeMap<usize, Vec<bool>>;

/// Where the session is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Question `i` is on screen.
    Viewing(usize),
    /// Answers are final.
    Scored,
}

/// How the attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Submitted,
    TimedOut,
}

/// A learner input or timer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Select (single-answer) or flip (multi-answer) the choice at this display position.
    Toggle(usize),
    /// Deselect every choice on the current question.
    Clear,
    Previous,
    Next,
    /// Go straight to a question.
    JumpTo(usize),
    /// Finish the attempt. Only accepted on the last question.
    Submit,
    /// The time limit ran out.
    Timeout,
}

/// What a dispatched action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Nothing changed.
    Ignored,
    /// The on-screen selection changed.
    Selected,
    /// Moved between questions.
    Moved { from: usize, to: usize },
    /// The session entered [`SessionState::Scored`].
    Finished(Termination),
}

/// Live state of one attempt.
#[derive(Debug, Clone)]
pub struct Session {
    exam: Exam,
    exam_id: Option<Uuid>,
    state: SessionState,
    selection: Vec<bool>,
    answers: Answers,
    termination: Option<Termination>,
}

impl Session {
    /// Start a session on an exam that is already in display order.
    ///
    /// An exam with no questions cannot be attempted.
    pub fn new(exam: Exam, exam_id: Option<Uuid>) -> Result<Self, ExamError> {
        if exam.is_empty() {
            return Err(ExamError::EmptyExam);
        }

        let selection = vec![false; exam.questions[0].choices.len()];
        Ok(Self {
            exam,
            exam_id,
            state: SessionState::Viewing(0),
            selection,
            answers: Answers::new(),
            termination: None,
        })
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn exam_id(&self) -> Option<Uuid> {
        self.exam_id
    }

    pub(crate) fn set_exam_id(&mut self, id: Uuid) {
        self.exam_id = Some(id);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_scored(&self) -> bool {
        self.state == SessionState::Scored
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn question_count(&self) -> usize {
        self.exam.questions.len()
    }

    /// Index of the question on screen, `None` once scored.
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Viewing(i) => Some(i),
            SessionState::Scored => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().map(|i| &self.exam.questions[i])
    }

    /// The on-screen selection for the current question.
    pub fn selection(&self) -> &[bool] {
        &self.selection
    }

    /// Captured answers. The current question is only included once the
    /// session has moved away from it.
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// `true` when `Previous` would do nothing.
    pub fn is_first(&self) -> bool {
        self.current_index() == Some(0)
    }

    /// `true` when the next step is submitting rather than moving on.
    pub fn is_last(&self) -> bool {
        self.current_index() == Some(self.question_count() - 1)
    }

    /// Apply an action and return the resulting session.
    #[must_use]
    pub fn apply(mut self, action: Action) -> Self {
        self.dispatch(action);
        self
    }

    /// Apply an action in place.
    pub fn dispatch(&mut self, action: Action) -> Transition {
        let SessionState::Viewing(index) = self.state else {
            tracing::debug!(?action, "session already scored, ignoring");
            return Transition::Ignored;
        };
        let last = self.question_count() - 1;

        match action {
            Action::Toggle(choice) => self.toggle(index, choice),
            Action::Clear => {
                if self.selection.iter().any(|&s| s) {
                    self.selection.iter_mut().for_each(|s| *s = false);
                    Transition::Selected
                } else {
                    Transition::Ignored
                }
            }
            Action::Previous if index > 0 => self.move_to(index, index - 1),
            Action::Next if index < last => self.move_to(index, index + 1),
            Action::JumpTo(target) if target <= last && target != index => {
                self.move_to(index, target)
            }
            Action::Submit if index == last => self.finish(index, Termination::Submitted),
            Action::Timeout => self.finish(index, Termination::TimedOut),
            _ => {
                tracing::debug!(?action, index, "action not available here");
                Transition::Ignored
            }
        }
    }

    /// Score the captured answers.
    pub fn score(&self) -> Result<ScoreSummary, ExamError> {
        score_answers(&self.exam.questions, &self.answers)
    }

    fn toggle(&mut self, index: usize, choice: usize) -> Transition {
        if choice >= self.selection.len() {
            tracing::debug!(choice, index, "choice out of range");
            return Transition::Ignored;
        }

        match self.exam.questions[index].answer_mode() {
            AnswerMode::Single => {
                if self.selection[choice] && self.selection.iter().filter(|&&s| s).count() == 1 {
                    return Transition::Ignored;
                }
                self.selection.iter_mut().for_each(|s| *s = false);
                self.selection[choice] = true;
            }
            AnswerMode::Multiple => {
                self.selection[choice] = !self.selection[choice];
            }
        }
        Transition::Selected
    }

    fn capture(&mut self, index: usize) {
        self.answers.insert(index, self.selection.clone());
    }

    fn move_to(&mut self, from: usize, to: usize) -> Transition {
        self.capture(from);
        let width = self.exam.questions[to].choices.len();
        self.selection = self
            .answers
            .get(&to)
            .cloned()
            .unwrap_or_else(|| vec![false; width]);
        self.state = SessionState::Viewing(to);
        Transition::Moved { from, to }
    }

    fn finish(&mut self, index: usize, termination: Termination) -> Transition {
        self.capture(index);
        self.selection.clear();
        self.state = SessionState::Scored;
        self.termination = Some(termination);
        Transition::Finished(termination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_exam;

    const TWO_QUESTIONS: &str = "# T\n## Q1\n- [ ] a\n- [x] b\n## Q2\n- [x] c\n- [ ] d\n";

    fn session(text: &str) -> Session {
        Session::new(parse_exam(text), None).unwrap()
    }

    #[test]
    fn empty_exam_is_rejected() {
        assert!(matches!(
            Session::new(parse_exam("# Nothing"), None),
            Err(ExamError::EmptyExam)
        ));
    }

    #[test]
    fn starts_on_first_question() {
        let s = session(TWO_QUESTIONS);
        assert_eq!(s.state(), SessionState::Viewing(0));
        assert!(s.is_first());
        assert!(!s.is_last());
        assert_eq!(s.selection(), &[false, false]);
        assert!(s.answers().is_empty());
    }

    #[test]
    fn selection_survives_navigation() {
        let s = session(TWO_QUESTIONS)
            .apply(Action::Toggle(0))
            .apply(Action::Next)
            .apply(Action::Previous);
        assert_eq!(s.current_index(), Some(0));
        assert_eq!(s.selection(), &[true, false]);
    }

    #[test]
    fn untouched_question_is_captured_as_all_false() {
        let s = session(TWO_QUESTIONS).apply(Action::Next);
        assert_eq!(s.answers().get(&0), Some(&vec![false, false]));
    }

    #[test]
    fn single_answer_selects_exclusively() {
        let s = session(TWO_QUESTIONS)
            .apply(Action::Toggle(0))
            .apply(Action::Toggle(1));
        assert_eq!(s.selection(), &[false, true]);
    }

    #[test]
    fn multi_answer_toggles_independently() {
        let mut s = session("## Q\n- [x] a\n- [x] b\n- [ ] c");
        assert_eq!(s.dispatch(Action::Toggle(0)), Transition::Selected);
        assert_eq!(s.dispatch(Action::Toggle(2)), Transition::Selected);
        assert_eq!(s.selection(), &[true, false, true]);
        s.dispatch(Action::Toggle(2));
        assert_eq!(s.selection(), &[true, false, false]);
        assert_eq!(s.dispatch(Action::Clear), Transition::Selected);
        assert_eq!(s.selection(), &[false, false, false]);
        assert_eq!(s.dispatch(Action::Clear), Transition::Ignored);
    }

    #[test]
    fn navigation_bounds() {
        let mut s = session(TWO_QUESTIONS);
        assert_eq!(s.dispatch(Action::Previous), Transition::Ignored);
        assert_eq!(s.dispatch(Action::Submit), Transition::Ignored);
        assert_eq!(s.dispatch(Action::Next), Transition::Moved { from: 0, to: 1 });
        assert!(s.is_last());
        assert_eq!(s.dispatch(Action::Next), Transition::Ignored);
        assert_eq!(s.dispatch(Action::JumpTo(5)), Transition::Ignored);
        assert_eq!(s.dispatch(Action::JumpTo(0)), Transition::Moved { from: 1, to: 0 });
        assert_eq!(s.dispatch(Action::Toggle(9)), Transition::Ignored);
    }

    #[test]
    fn submit_captures_last_selection() {
        let mut s = session(TWO_QUESTIONS)
            .apply(Action::Toggle(1))
            .apply(Action::Next)
            .apply(Action::Toggle(0));
        assert_eq!(
            s.dispatch(Action::Submit),
            Transition::Finished(Termination::Submitted)
        );
        assert!(s.is_scored());
        assert_eq!(s.current_index(), None);
        assert_eq!(s.answers().get(&1), Some(&vec![true, false]));
        let summary = s.score().unwrap();
        assert_eq!((summary.score, summary.total), (2, 2));
    }

    #[test]
    fn scored_is_terminal() {
        let mut s = session(TWO_QUESTIONS).apply(Action::Next).apply(Action::Submit);
        assert_eq!(s.dispatch(Action::Submit), Transition::Ignored);
        assert_eq!(s.dispatch(Action::Timeout), Transition::Ignored);
        assert_eq!(s.dispatch(Action::Previous), Transition::Ignored);
        assert_eq!(s.termination(), Some(Termination::Submitted));
    }

    #[test]
    fn timeout_from_any_question() {
        let mut s = session(TWO_QUESTIONS).apply(Action::Toggle(1));
        assert_eq!(
            s.dispatch(Action::Timeout),
            Transition::Finished(Termination::TimedOut)
        );
        assert_eq!(s.answers().get(&0), Some(&vec![false, true]));
        assert!(!s.answers().contains_key(&1));
        let summary = s.score().unwrap();
        assert_eq!((summary.score, summary.total), (1, 2));
    }
}
