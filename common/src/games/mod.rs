mod broadcaster;
mod session_rng;

pub mod ultimate;

pub use broadcaster::GameBroadcaster;
pub use session_rng::SessionRng;
