//! `RoomQuest` Server
//!
//! Marketplace backend for mess outlets, rental rooms and roommate listings.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod password;
pub mod storage;
pub mod validation;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
