pub mod session;

pub use session::{launch_strategies, BrowserSettings, LaunchStrategy, SessionHandle};
