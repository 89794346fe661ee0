//! Data models for the BuildHub application.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless interoperability.

mod attachment;
mod bid;
mod comment;
mod contractor;
mod employee;
mod leave;
mod opportunity;
mod project;
mod supplier;
mod task;
mod team;
mod user;

pub use attachment::*;
pub use bid::*;
pub use comment::*;
pub use contractor::*;
pub use employee::*;
pub use leave::*;
pub use opportunity::*;
pub use project::*;
pub use supplier::*;
pub use task::*;
pub use team::*;
pub use user::*;
