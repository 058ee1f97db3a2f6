// --- File: crates/intervu_gcal/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod availability;
#[cfg(test)]
mod availability_proptest;
pub mod booking;
pub mod doc;
pub mod handlers;
#[cfg(test)]
mod handlers_test;
pub mod notifications;
pub mod routes;
pub mod scheduler;
pub mod service;
