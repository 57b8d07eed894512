// src/lib.rs

pub mod config;
pub mod extract;
pub mod fetch;
pub mod history;
pub mod model;
pub mod robots;
pub mod store;
