//! Events Module
//! Mission: Event records, storage, and CRUD/RSVP handlers

pub mod api;
pub mod models;
pub mod store;

pub use store::EventStore;
