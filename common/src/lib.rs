pub mod access_rules;
pub mod auth;
pub mod config;
pub mod context;
pub mod entities;
pub mod error;
pub mod lenient;
pub mod password;
pub mod query;
pub mod reference;
pub mod repository;
pub mod retry;
pub mod storage;
