#![deny(warnings)]

pub mod api;
pub mod config;
pub mod languages;
pub mod node;
pub mod poll;
pub mod request;
