pub mod code_generator;
pub mod email;
pub mod jwt;

pub use code_generator::{CodeHasher, generate_six_digit_code, is_six_digit_code};
pub use email::*;
pub use jwt::*;
