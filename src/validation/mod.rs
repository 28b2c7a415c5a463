pub mod rules;
pub mod validator;

pub use validator::Validator;
