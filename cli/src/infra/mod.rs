//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution,
//! Terraform and AWS CLI adapters, and filesystem access.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod aws_inventory;
pub mod command_runner;
pub mod config;
pub mod fs;
pub mod terraform;
pub mod test_cases;
