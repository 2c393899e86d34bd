//! # Request Handlers

pub mod health;
