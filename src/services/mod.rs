pub mod prompt_builder;
pub mod response_parser;
pub mod validator;

pub use response_parser::{parse_json_text, parse_raw_text};
pub use validator::{validate, RejectReason};
