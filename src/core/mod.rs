pub mod broker;
pub mod dispatch;
pub mod engine;
pub mod queue;
pub mod task;
pub mod worker;
