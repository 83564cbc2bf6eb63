mod conversation;
mod proposal;
mod trip;

pub use conversation::*;
pub use proposal::*;
pub use trip::*;
