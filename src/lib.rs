pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod crud;
pub mod dashboard;
pub mod dates;
pub mod draft;
pub mod error;
pub mod export;
pub mod guard;
pub mod search;
pub mod session;
pub mod storage;
pub mod upload;
