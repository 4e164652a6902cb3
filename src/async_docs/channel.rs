use crate::sync::{DiffTarget, Side};

#[derive(Debug, Clone)]
pub struct DocRequest {
    pub generation: u64,
    pub target: DiffTarget,
    pub side: Side,
}

#[derive(Debug, Clone)]
pub struct DocResult {
    pub generation: u64,
    pub side: Side,
    /// Empty when the read failed.
    pub text: String,
    /// User-facing description of a failed read.
    pub notice: Option<String>,
}
