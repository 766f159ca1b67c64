// Controllers and view models for the Scrumble voting and admin flows.

pub mod admin;
pub mod context;
pub mod presenter;
pub mod status;
pub mod voting;

pub use context::AppContext;
