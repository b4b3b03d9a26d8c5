// src/survey/mod.rs

pub mod machine;
pub mod random;
pub mod runner;
pub mod shuffle;
pub mod timing;

pub use machine::{Presenting, SurveyEvent, SurveyOptions, SurveyState, TransitionError, reduce};
pub use runner::{SubmitError, SubmitOutcome, SurveyRunner};
