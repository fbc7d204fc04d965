pub mod state;

pub use state::{Submission, SubmissionFlow, SubmissionState, SuccessPolicy};
