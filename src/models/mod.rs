pub mod common;
pub mod profile;
pub mod session;
pub mod user;
pub mod verification;

pub use common::*;
pub use profile::*;
pub use session::*;
pub use user::*;
pub use verification::*;
