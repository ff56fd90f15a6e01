mod error;
mod extract_token;
mod password;
mod role_gate;
mod session;

pub use error::*;
pub use extract_token::*;
pub use password::*;
pub use role_gate::*;
pub use session::*;
