//! Command handlers
//!
//! Each handler takes an open [`HandlerContext`], the resolved caller where
//! the command needs one, and the formatter to print through.

mod base;
mod board;
mod create;
mod export;
mod init;
mod list;
mod user;
mod workflow;

pub use base::{HandlerContext, parse_ticket_no, password_or_prompt};
pub use board::handle_stats;
pub use create::{CreateParams, handle_new};
pub use export::{handle_export, render as render_export};
#[cfg(feature = "api")]
pub use init::handle_serve;
pub use init::handle_init;
pub use list::{ListParams, handle_list, handle_show};
pub use user::{AddUserParams, handle_login, handle_user_add, handle_user_list};
pub use workflow::{StatusParams, handle_assign, handle_comment, handle_freeze, handle_status};
