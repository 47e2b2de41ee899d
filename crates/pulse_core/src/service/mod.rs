//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Feed repository data through the pure bonus calculator.
//! - Keep UI layers decoupled from storage details.

pub mod control_service;
pub mod directory_service;
pub mod message_service;
pub mod objective_service;
pub mod prime_service;
pub mod team_service;
