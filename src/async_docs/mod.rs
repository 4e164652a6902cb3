pub mod channel;
pub mod loader;
pub mod worker;

pub use channel::{DocRequest, DocResult};
pub use worker::{DocWorker, WorkingCopy};
