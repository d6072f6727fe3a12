pub mod endpoint;
pub mod posting;

pub use endpoint::*;
pub use posting::*;

pub const EMOJI_SHIPPING: &str = "📦";
