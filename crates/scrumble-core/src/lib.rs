// Library root for the Scrumble client core: configuration, local storage,
// credential stores, wire types, and the backend API client.

pub mod api;
pub mod config;
pub mod credentials;
pub mod protocol;
pub mod slug;
pub mod storage;
