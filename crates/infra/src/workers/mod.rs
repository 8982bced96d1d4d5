pub mod monitor_session;

pub use monitor_session::{LoopSettings, MonitorSession, SessionError, SessionHandle, SessionStats};
