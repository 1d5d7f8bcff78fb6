pub mod action;
pub mod app;
pub mod bridge;
pub mod component;
pub mod components;
pub mod connection;
pub mod dispatch;
pub mod focus;
pub mod panel;
pub mod store;
pub mod theme;
pub mod widgets;
