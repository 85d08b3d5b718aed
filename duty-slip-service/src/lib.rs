//! Customer rate lookup and duty slip settlement for the vehicle rental
//! admin panel.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
