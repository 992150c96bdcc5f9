pub mod alerts;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod history;
pub mod pages;
pub mod settings;
pub mod state;
pub mod telemetry;
pub mod views;
pub mod web;
