// src/survey/runner.rs

use crate::{
    aggregate::StatsReport,
    client::{ClientError, SubmissionStore},
    models::{
        question::QuestionItem,
        response::AnswerChoice,
        session::SaveReceipt,
    },
    survey::{
        machine::{SurveyEnv, SurveyEvent, SurveyOptions, SurveyState, TransitionError, reduce},
        random::{RandomSource, ThreadRandom},
        timing::{Clock, SystemClock},
    },
};

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("submission failed: {0}")]
    Store(#[from] ClientError),
}

/// Result of a successful submit: the receipt plus the refreshed stats.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub receipt: SaveReceipt,
    /// Empty when the aggregate fetch failed.
    pub stats: StatsReport,
}

/// Drives one participant's session against a submission store.
pub struct SurveyRunner<S, R = ThreadRandom, C = SystemClock> {
    questions: Vec<QuestionItem>,
    state: SurveyState,
    store: S,
    rng: R,
    clock: C,
    options: SurveyOptions,
}

impl<S: SubmissionStore> SurveyRunner<S> {
    pub fn new(questions: Vec<QuestionItem>, store: S) -> Self {
        Self::with_sources(questions, store, ThreadRandom, SystemClock)
    }
}

impl<S, R, C> SurveyRunner<S, R, C>
where
    S: SubmissionStore,
    R: RandomSource,
    C: Clock,
{
    pub fn with_sources(questions: Vec<QuestionItem>, store: S, rng: R, clock: C) -> Self {
        Self {
            questions,
            state: SurveyState::NotStarted,
            store,
            rng,
            clock,
            options: SurveyOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SurveyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> &SurveyState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Applies one event; a rejected event leaves the state as it was.
    pub fn dispatch(&mut self, event: SurveyEvent) -> Result<(), TransitionError> {
        let mut env = SurveyEnv {
            questions: &self.questions,
            rng: &mut self.rng,
            clock: &self.clock,
            options: self.options,
        };

        match reduce(&self.state, event, &mut env) {
            Ok(next) => {
                self.state = next;
                Ok(())
            }
            Err(e) => {
                tracing::debug!(state = self.state.name(), "Rejected event: {}", e);
                Err(e)
            }
        }
    }

    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.dispatch(SurveyEvent::Start)
    }

    pub fn answer(
        &mut self,
        choice: AnswerChoice,
        explanation: Option<String>,
    ) -> Result<(), TransitionError> {
        self.dispatch(SurveyEvent::Answer {
            choice: Some(choice),
            explanation,
        })
    }

    /// Submits the completed session once.
    ///
    /// On failure the state goes back to `Completed` with the reason kept
    /// in `last_error`, and the same call can be retried. A previous call
    /// whose future was dropped mid-request leaves the runner in
    /// `Submitting`; the next call treats that attempt as failed and sends
    /// again, which the service stores once per session id.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if matches!(self.state, SurveyState::Submitting { .. }) {
            tracing::warn!("Previous submission was interrupted, retrying");
            self.dispatch(SurveyEvent::SubmitFailed(
                "submission interrupted".to_string(),
            ))?;
        }
        self.dispatch(SurveyEvent::SubmitRequested)?;

        let SurveyState::Submitting { session } = &self.state else {
            return Err(TransitionError::InvalidEvent {
                state: self.state.name(),
                event: "SubmitRequested",
            }
            .into());
        };
        let session = session.clone();

        match self.store.submit(&session).await {
            Ok(receipt) => {
                self.dispatch(SurveyEvent::SubmitSucceeded(receipt.clone()))?;
                let stats = self.load_stats().await;
                Ok(SubmitOutcome { receipt, stats })
            }
            Err(e) => {
                tracing::warn!(session_id = %session.session_id, "Failed to submit session: {}", e);
                self.dispatch(SurveyEvent::SubmitFailed(e.to_string()))?;
                Err(e.into())
            }
        }
    }

    /// Aggregates everything stored so far; a failed fetch gives an empty
    /// report.
    pub async fn load_stats(&self) -> StatsReport {
        match self.store.fetch_all().await {
            Ok(submissions) => StatsReport::from_submissions(&submissions),
            Err(e) => {
                tracing::warn!("Failed to fetch submissions for stats: {}", e);
                StatsReport::default()
            }
        }
    }
}
