pub mod candidate;
pub mod history;
pub mod question;
pub mod topic;

pub use candidate::{Candidate, RawCandidate, RefinedCandidate};
pub use history::QuestionHistory;
pub use question::{AnswerLetter, Difficulty, Question};
pub use topic::{Theme, Topic};
