pub mod dto;
pub mod services;

pub use dto::{Difficulty, Example, Language, Problem, ReturnType, TestCase};
pub use services::ProblemsService;
