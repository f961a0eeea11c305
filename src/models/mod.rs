//! Data models for the MessMate application.
//!
//! These models match the frontend TypeScript interfaces so persisted documents stay interchangeable.

mod bill;
mod feedback;
mod meal;
mod menu;
mod notification;
mod preference;
mod user;

pub use bill::*;
pub use feedback::*;
pub use meal::*;
pub use menu::*;
pub use notification::*;
pub use preference::*;
pub use user::*;
