pub mod copyable_text;
pub mod error_banner;
pub mod modal;
pub mod progress_bar;
pub mod status_badge;

pub use copyable_text::*;
pub use error_banner::*;
pub use modal::*;
pub use progress_bar::*;
pub use status_badge::*;
