//! uptrail - HTTP uptime monitor
//!
//! Polls an endpoint on a fixed interval, logs every response to SQLite and
//! reports request-based and time-window availability from the log.

pub mod cli;
pub mod config;
pub mod db;
pub mod monitor;
pub mod names;
pub mod probe;
pub mod report;
pub mod reproduce;
pub mod uptime;
pub mod web;
