pub mod account;
pub mod macros;
pub mod organization;
pub mod shift;
pub mod shift_helper;
pub mod time;

pub use account::*;
pub use organization::*;
pub use shift::*;
pub use shift_helper::*;
pub use time::*;
