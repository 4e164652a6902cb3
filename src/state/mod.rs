pub mod app_state;
pub mod text_buffer;

pub use app_state::AppState;
pub use text_buffer::TextBuffer;
