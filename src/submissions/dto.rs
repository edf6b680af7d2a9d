use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{api::json_or_encoded, problems::Language};

/// Judge verdict. The queue-backed submission service reports `queued`,
/// `running` and `success`; those map onto the same three states. Anything
/// else decodes to `Unknown`, which counts as settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[serde(alias = "queued", alias = "running")]
    Pending,
    #[serde(alias = "success")]
    Passed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// Outcome of one judged test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub test_number: u32,
    #[serde(default)]
    pub inputs: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub expected: String,
    pub passed: bool,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: String,
    pub user_id: String,
    pub problem_id: String,
    pub language: Language,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub num_tests: u32,
    #[serde(default)]
    pub function_name: Option<String>,
    pub status: SubmissionStatus,
    #[serde(default, deserialize_with = "json_or_encoded")]
    pub results: Vec<TestCaseResult>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Submission {
    /// The judge has finished with it.
    pub fn is_settled(&self) -> bool {
        self.status != SubmissionStatus::Pending
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Results in judge order; the gateway does not guarantee it.
    pub fn sorted_results(&self) -> Vec<&TestCaseResult> {
        let mut results: Vec<_> = self.results.iter().collect();
        results.sort_by_key(|r| r.test_number);
        results
    }
}

/// `POST /submission` body.
#[derive(Debug, Clone, Serialize)]
pub struct CodeSubmission {
    pub problem_id: String,
    pub user_id: Uuid,
    pub language: Language,
    pub code: String,
}
