pub mod dto;
pub mod services;

pub use dto::{CodeSubmission, Submission, SubmissionStatus, TestCaseResult};
pub use services::{PollConfig, PollOutcome, SubmissionsService};
