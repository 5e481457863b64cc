//! EduTrack portal daemon: role-scoped school records behind a line-based
//! JSON protocol.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod fixtures;
pub mod grading;
pub mod ipc;
pub mod listing;
pub mod model;
pub mod repo;
pub mod routes;
pub mod session;
