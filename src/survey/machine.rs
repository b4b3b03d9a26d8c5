// src/survey/machine.rs

//! Session state machine.
//!
//! All session state lives in one [`SurveyState`] value and changes only
//! through [`reduce`]. Randomness and time come from the [`SurveyEnv`], so
//! a test can replay a session exactly.

use crate::{
    models::{
        question::QuestionItem,
        response::{AnswerChoice, CodeVersion, Response, SubQuestion},
        session::{SaveReceipt, Session},
    },
    survey::{
        random::{RandomSource, session_id},
        shuffle::shuffle,
        timing::{Clock, TimingTracker},
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurveyOptions {
    /// Later survey rounds ask for a short free-text explanation with
    /// every answer.
    pub require_explanation: bool,
}

/// Collaborators a transition may consult.
pub struct SurveyEnv<'a> {
    pub questions: &'a [QuestionItem],
    pub rng: &'a mut dyn RandomSource,
    pub clock: &'a dyn Clock,
    pub options: SurveyOptions,
}

/// A question on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Presenting {
    pub session: Session,
    /// The dataset in the order drawn at start.
    pub questions: Vec<QuestionItem>,
    pub question_index: usize,
    pub sub_question: SubQuestion,
    pub code_version: CodeVersion,
    pub timer: TimingTracker,
}

impl Presenting {
    pub fn current_question(&self) -> &QuestionItem {
        &self.questions[self.question_index]
    }

    pub fn current_snippet(&self) -> &str {
        self.current_question().snippet(self.code_version)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurveyState {
    NotStarted,
    Presenting(Presenting),
    /// All questions answered. `last_error` holds the reason of the most
    /// recent failed submission, if any.
    Completed {
        session: Session,
        last_error: Option<String>,
    },
    /// A submission is in flight.
    Submitting { session: Session },
    Submitted {
        session: Session,
        receipt: SaveReceipt,
    },
}

impl SurveyState {
    pub fn name(&self) -> &'static str {
        match self {
            SurveyState::NotStarted => "NotStarted",
            SurveyState::Presenting(_) => "Presenting",
            SurveyState::Completed { .. } => "Completed",
            SurveyState::Submitting { .. } => "Submitting",
            SurveyState::Submitted { .. } => "Submitted",
        }
    }

    /// The session being recorded, once started.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SurveyState::NotStarted => None,
            SurveyState::Presenting(p) => Some(&p.session),
            SurveyState::Completed { session, .. }
            | SurveyState::Submitting { session }
            | SurveyState::Submitted { session, .. } => Some(session),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurveyEvent {
    Start,
    Answer {
        choice: Option<AnswerChoice>,
        explanation: Option<String>,
    },
    SubmitRequested,
    SubmitSucceeded(SaveReceipt),
    SubmitFailed(String),
}

impl SurveyEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SurveyEvent::Start => "Start",
            SurveyEvent::Answer { .. } => "Answer",
            SurveyEvent::SubmitRequested => "SubmitRequested",
            SurveyEvent::SubmitSucceeded(_) => "SubmitSucceeded",
            SurveyEvent::SubmitFailed(_) => "SubmitFailed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("no answer selected")]
    MissingAnswer,

    #[error("an explanation is required before continuing")]
    MissingExplanation,

    #[error("{event} is not valid while {state}")]
    InvalidEvent {
        state: &'static str,
        event: &'static str,
    },
}

/// Computes the state that follows `event`.
///
/// A rejected event returns an error and the caller keeps its current
/// state; nothing in `state` is modified.
pub fn reduce(
    state: &SurveyState,
    event: SurveyEvent,
    env: &mut SurveyEnv<'_>,
) -> Result<SurveyState, TransitionError> {
    match (state, event) {
        (SurveyState::NotStarted, SurveyEvent::Start) => Ok(start(env)),

        (SurveyState::Presenting(presenting), SurveyEvent::Answer { choice, explanation }) => {
            answer(presenting, choice, explanation, env)
        }

        (SurveyState::Completed { session, .. }, SurveyEvent::SubmitRequested) => {
            Ok(SurveyState::Submitting {
                session: session.clone(),
            })
        }

        (SurveyState::Submitting { session }, SurveyEvent::SubmitSucceeded(receipt)) => {
            Ok(SurveyState::Submitted {
                session: session.clone(),
                receipt,
            })
        }

        (SurveyState::Submitting { session }, SurveyEvent::SubmitFailed(reason)) => {
            Ok(SurveyState::Completed {
                session: session.clone(),
                last_error: Some(reason),
            })
        }

        (state, event) => Err(TransitionError::InvalidEvent {
            state: state.name(),
            event: event.name(),
        }),
    }
}

fn start(env: &mut SurveyEnv<'_>) -> SurveyState {
    let now_ms = env.clock.now_ms();
    let id = session_id(now_ms, env.rng);
    let session = Session::new(id, env.clock.now());
    let questions = shuffle(env.questions, env.rng);

    if questions.is_empty() {
        tracing::warn!("Starting survey with an empty question set");
        return SurveyState::Completed {
            session,
            last_error: None,
        };
    }

    let code_version = env.rng.code_version();
    tracing::info!(
        session_id = %session.session_id,
        questions = questions.len(),
        "Survey started"
    );

    SurveyState::Presenting(Presenting {
        session,
        questions,
        question_index: 0,
        sub_question: SubQuestion::FIRST,
        code_version,
        timer: TimingTracker::started_at(now_ms),
    })
}

fn answer(
    presenting: &Presenting,
    choice: Option<AnswerChoice>,
    explanation: Option<String>,
    env: &mut SurveyEnv<'_>,
) -> Result<SurveyState, TransitionError> {
    let choice = choice.ok_or(TransitionError::MissingAnswer)?;
    let explanation = explanation
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    if env.options.require_explanation && explanation.is_none() {
        return Err(TransitionError::MissingExplanation);
    }

    let mut next = presenting.clone();
    let now_ms = env.clock.now_ms();
    let time_spent_ms = next.timer.lap(now_ms);

    let question = next.current_question();
    let response = Response {
        question_id: question.id.clone(),
        question_name: question.name.clone(),
        code_version: next.code_version,
        sub_question_index: next.sub_question.index(),
        sub_question_prompt: next.sub_question.prompt().to_string(),
        answer: choice.as_str().to_string(),
        explanation,
        time_spent_ms,
        timestamp: now_ms,
    };
    next.session.responses.push(response);

    if let Some(sub_question) = next.sub_question.next() {
        next.sub_question = sub_question;
        return Ok(SurveyState::Presenting(next));
    }

    if next.question_index + 1 < next.questions.len() {
        next.question_index += 1;
        next.sub_question = SubQuestion::FIRST;
        next.code_version = env.rng.code_version();
        return Ok(SurveyState::Presenting(next));
    }

    tracing::info!(
        session_id = %next.session.session_id,
        responses = next.session.responses.len(),
        "Survey completed"
    );
    Ok(SurveyState::Completed {
        session: next.session,
        last_error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::{random::ScriptedRandom, timing::ManualClock};

    fn item(name: &str) -> QuestionItem {
        QuestionItem {
            id: String::new(),
            name: name.to_string(),
            prompt: format!("{name} prompt"),
            clean_version: format!("clean {name}"),
            messy_version: format!("messy {name}"),
        }
    }

    fn dataset(n: usize) -> Vec<QuestionItem> {
        (0..n)
            .map(|i| {
                let mut q = item(&format!("Q{}", i + 1));
                q.id = format!("q{}", i + 1);
                q
            })
            .collect()
    }

    struct Harness {
        questions: Vec<QuestionItem>,
        rng: ScriptedRandom,
        clock: ManualClock,
        options: SurveyOptions,
        state: SurveyState,
    }

    impl Harness {
        fn new(questions: Vec<QuestionItem>, rng: ScriptedRandom) -> Self {
            Self {
                questions,
                rng,
                clock: ManualClock::new(1_700_000_000_000),
                options: SurveyOptions::default(),
                state: SurveyState::NotStarted,
            }
        }

        fn send(&mut self, event: SurveyEvent) -> Result<(), TransitionError> {
            let mut env = SurveyEnv {
                questions: &self.questions,
                rng: &mut self.rng,
                clock: &self.clock,
                options: self.options,
            };
            self.state = reduce(&self.state, event, &mut env)?;
            Ok(())
        }

        fn answer(&mut self, choice: AnswerChoice) -> Result<(), TransitionError> {
            self.send(SurveyEvent::Answer {
                choice: Some(choice),
                explanation: None,
            })
        }

        fn presenting(&self) -> &Presenting {
            match &self.state {
                SurveyState::Presenting(p) => p,
                other => panic!("expected Presenting, got {}", other.name()),
            }
        }
    }

    #[test]
    fn start_presents_first_sub_question() {
        // 9 id draws, 1 shuffle draw for two questions, then the coin.
        let mut script = vec![0.0; 9];
        script.push(0.9);
        script.push(0.7);
        let mut h = Harness::new(dataset(2), ScriptedRandom::new(script));

        h.send(SurveyEvent::Start).unwrap();

        let p = h.presenting();
        assert_eq!(p.question_index, 0);
        assert_eq!(p.sub_question, SubQuestion::Understand);
        assert_eq!(p.code_version, CodeVersion::Messy);
        assert_eq!(p.session.session_id, "1700000000000-000000000");
        assert!(p.session.responses.is_empty());
        assert_eq!(p.current_snippet(), "messy Q1");
    }

    #[test]
    fn finishing_a_question_draws_a_fresh_code_version() {
        let mut script = vec![0.0; 9];
        script.push(0.9); // shuffle keeps order
        script.push(0.1); // Q1 -> Clean
        script.push(0.8); // Q2 -> Messy
        let mut h = Harness::new(dataset(2), ScriptedRandom::new(script));
        h.send(SurveyEvent::Start).unwrap();
        assert_eq!(h.presenting().code_version, CodeVersion::Clean);

        h.clock.advance(1_500);
        h.answer(AnswerChoice::Yes).unwrap();
        let p = h.presenting();
        assert_eq!(p.question_index, 0);
        assert_eq!(p.sub_question, SubQuestion::Evaluate);
        assert_eq!(p.code_version, CodeVersion::Clean);

        h.clock.advance(2_000);
        h.answer(AnswerChoice::No).unwrap();
        let p = h.presenting();
        assert_eq!(p.question_index, 1);
        assert_eq!(p.sub_question, SubQuestion::Understand);
        assert_eq!(p.code_version, CodeVersion::Messy);

        let times: Vec<u64> = p.session.responses.iter().map(|r| r.time_spent_ms).collect();
        assert_eq!(times, vec![1_500, 2_000]);
    }

    #[test]
    fn full_run_records_every_pair_in_order() {
        let mut h = Harness::new(dataset(3), ScriptedRandom::new([0.3]));
        h.send(SurveyEvent::Start).unwrap();

        let mut presented = Vec::new();
        while let SurveyState::Presenting(p) = &h.state {
            presented.push((p.current_question().id.clone(), p.sub_question.index()));
            h.clock.advance(700);
            h.answer(AnswerChoice::NotSure).unwrap();
        }

        let SurveyState::Completed { session, last_error } = &h.state else {
            panic!("expected Completed, got {}", h.state.name());
        };
        assert!(last_error.is_none());
        assert_eq!(session.responses.len(), 3 * SubQuestion::COUNT);

        let recorded: Vec<(String, u32)> = session
            .responses
            .iter()
            .map(|r| (r.question_id.clone(), r.sub_question_index))
            .collect();
        assert_eq!(recorded, presented);
        assert!(session.responses.iter().all(|r| r.time_spent_ms == 700));
        assert!(session.responses.iter().all(|r| r.answer == "NOT-SURE"));
    }

    #[test]
    fn missing_answer_blocks_progress() {
        let mut h = Harness::new(dataset(1), ScriptedRandom::new([0.2]));
        h.send(SurveyEvent::Start).unwrap();
        let before = h.state.clone();

        let err = h
            .send(SurveyEvent::Answer {
                choice: None,
                explanation: Some("looks fine".into()),
            })
            .unwrap_err();
        assert_eq!(err, TransitionError::MissingAnswer);
        assert_eq!(h.state, before);
    }

    #[test]
    fn explanation_required_when_configured() {
        let mut h = Harness::new(dataset(1), ScriptedRandom::new([0.2]));
        h.options.require_explanation = true;
        h.send(SurveyEvent::Start).unwrap();

        let err = h
            .send(SurveyEvent::Answer {
                choice: Some(AnswerChoice::Yes),
                explanation: Some("   ".into()),
            })
            .unwrap_err();
        assert_eq!(err, TransitionError::MissingExplanation);

        h.send(SurveyEvent::Answer {
            choice: Some(AnswerChoice::Yes),
            explanation: Some("  sums a list ".into()),
        })
        .unwrap();
        let recorded = &h.presenting().session.responses[0];
        assert_eq!(recorded.answer, "YES");
        assert_eq!(recorded.explanation.as_deref(), Some("sums a list"));
    }

    #[test]
    fn backwards_clock_never_yields_negative_time() {
        let mut h = Harness::new(dataset(1), ScriptedRandom::new([0.2]));
        h.send(SurveyEvent::Start).unwrap();
        h.clock.advance(-5_000);
        h.answer(AnswerChoice::Yes).unwrap();
        assert_eq!(h.presenting().session.responses[0].time_spent_ms, 0);
    }

    #[test]
    fn empty_dataset_completes_immediately() {
        let mut h = Harness::new(Vec::new(), ScriptedRandom::new([0.2]));
        h.send(SurveyEvent::Start).unwrap();
        assert!(matches!(
            &h.state,
            SurveyState::Completed { session, .. } if session.responses.is_empty()
        ));
    }

    #[test]
    fn failed_submit_returns_to_completed_with_reason() {
        let mut h = Harness::new(dataset(1), ScriptedRandom::new([0.2]));
        h.send(SurveyEvent::Start).unwrap();
        h.answer(AnswerChoice::Yes).unwrap();
        h.answer(AnswerChoice::No).unwrap();

        h.send(SurveyEvent::SubmitRequested).unwrap();
        assert_eq!(h.state.name(), "Submitting");
        assert!(matches!(
            h.send(SurveyEvent::SubmitRequested),
            Err(TransitionError::InvalidEvent { state: "Submitting", .. })
        ));

        h.send(SurveyEvent::SubmitFailed("connection refused".into()))
            .unwrap();
        let SurveyState::Completed { session, last_error } = &h.state else {
            panic!("expected Completed, got {}", h.state.name());
        };
        assert_eq!(last_error.as_deref(), Some("connection refused"));
        assert_eq!(session.responses.len(), 2);

        h.send(SurveyEvent::SubmitRequested).unwrap();
        h.send(SurveyEvent::SubmitSucceeded(SaveReceipt {
            saved_id: 7,
            message: String::new(),
        }))
        .unwrap();
        assert!(matches!(
            &h.state,
            SurveyState::Submitted { session, receipt } if receipt.saved_id == 7 && session.responses.len() == 2
        ));
    }

    #[test]
    fn out_of_order_events_are_rejected() {
        let mut h = Harness::new(dataset(1), ScriptedRandom::new([0.2]));
        assert!(h.answer(AnswerChoice::Yes).is_err());
        assert!(h.send(SurveyEvent::SubmitRequested).is_err());
        assert_eq!(h.state, SurveyState::NotStarted);

        h.send(SurveyEvent::Start).unwrap();
        assert!(matches!(
            h.send(SurveyEvent::Start),
            Err(TransitionError::InvalidEvent { state: "Presenting", event: "Start" })
        ));
    }
}
