use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::json_or_encoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(alias = "easy")]
    Easy,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "hard")]
    Hard,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    String,
    Integer,
    Boolean,
    #[serde(other)]
    Other,
}

impl ReturnType {
    /// Declared return type in the editor stub for `language`.
    pub fn type_name(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Boolean, Language::Java) => "boolean",
            (Self::Boolean, Language::Python) => "bool",
            (Self::Integer, _) => "int",
            (Self::String, Language::Java) => "String",
            (Self::String, Language::Python) => "str",
            (Self::Other, _) => "",
        }
    }
}

/// Languages the judge runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "Python")]
    Python,
    #[serde(alias = "Java")]
    Java,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::Java => "java",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Judge test case. Inputs are argument lists or plain strings depending on
/// the problem, so both sides stay untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Value,
    pub output: Value,
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub problem_id: String,
    pub problem_title: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "json_or_encoded")]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default, deserialize_with = "json_or_encoded")]
    pub test_cases: Vec<TestCase>,
    pub return_type: ReturnType,
    #[serde(default)]
    pub function_name: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt", alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl Problem {
    /// Editor template for a fresh attempt.
    pub fn starter_code(&self, language: Language) -> String {
        let ty = self.return_type.type_name(language);
        let description = &self.description;
        match language {
            Language::Java => {
                let name = self.function_name.as_deref().unwrap_or("FunctionName");
                format!(
                    "/** \n * {description}\n * \n */ \npublic class Solution {{\n    public static {ty} {name}(/*Insert*/) {{\n        // Your code here\n    }}\n}}"
                )
            }
            Language::Python => {
                let name = self.function_name.as_deref().unwrap_or("function_name");
                format!(
                    "def {name}(\"\"\"Insert\"\"\") -> {ty}:\n    \"\"\"{description}\"\"\"\n    #..."
                )
            }
        }
    }

    pub fn visible_test_cases(&self) -> impl Iterator<Item = &TestCase> {
        self.test_cases.iter().filter(|tc| !tc.hidden)
    }
}
