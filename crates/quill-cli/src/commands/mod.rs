//! Command handlers, one module per command group.

pub mod detect;
pub mod digest;
pub mod init;
pub mod misc;
pub mod notes;

pub use detect::handle_detect;
pub use digest::handle_digest;
pub use init::handle_init;
pub use misc::handle_completions;
pub use notes::{
    handle_add, handle_delete, handle_edit, handle_list, handle_show, handle_submit,
};
