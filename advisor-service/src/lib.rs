//! advisor-service: status-check log and AI premium-advice chat relay.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
