//! Quiz question as stored in the question bank.
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Ownership,
    Lifetimes,
    PatternMatching,
    ErrorHandling,
    TraitsGenerics,
    IteratorsClosures,
    AsyncAwait,
    Macros,
    Unsafe,
    StdLibrary,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Ownership,
        Category::Lifetimes,
        Category::PatternMatching,
        Category::ErrorHandling,
        Category::TraitsGenerics,
        Category::IteratorsClosures,
        Category::AsyncAwait,
        Category::Macros,
        Category::Unsafe,
        Category::StdLibrary,
    ];

    /// Key used in storage and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ownership => "ownership",
            Category::Lifetimes => "lifetimes",
            Category::PatternMatching => "pattern_matching",
            Category::ErrorHandling => "error_handling",
            Category::TraitsGenerics => "traits_generics",
            Category::IteratorsClosures => "iterators_closures",
            Category::AsyncAwait => "async_await",
            Category::Macros => "macros",
            Category::Unsafe => "unsafe",
            Category::StdLibrary => "std_library",
        }
    }

    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.as_str() == key)
    }

    /// Human readable name, e.g. "pattern matching".
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SpotError,
    FillBlank,
    WillCompile,
    FixCode,
    PredictOutput,
    Idiomatic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub category: Category,
    /// 1 = beginner, 5 = expert
    pub difficulty: u8,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub code: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`
    pub correct: usize,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rust_book_link: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Question {
    pub fn is_correct(&self, answer_index: usize) -> bool {
        answer_index == self.correct
    }
}
