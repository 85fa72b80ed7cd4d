//! Core library modules.

pub mod activity;
pub mod config;
pub mod controller;
pub mod data_storage;
pub mod formatter;
pub mod messages;
pub mod presentation;
pub mod runtime;
pub mod view;
