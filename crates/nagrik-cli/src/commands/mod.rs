pub mod common;
pub mod completions;
pub mod config_cmd;
pub mod queue;
pub mod report;
pub mod setting;
pub mod status;
pub mod sync;
pub mod watch;
