//! UI layer for the dashboard: app shell, route panels and the provision modal.

pub mod app;
mod modal;
mod panels;

pub use app::DashboardApp;
