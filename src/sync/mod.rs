pub mod controller;
pub mod debounce;
pub mod echo;
pub mod types;
pub mod view;

pub use controller::{DiffSync, Phase, SyncBackend};
pub use types::{DiffTarget, DocSource, Side};
