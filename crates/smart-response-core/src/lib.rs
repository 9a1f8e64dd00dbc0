//! Board-agnostic boot orchestration and runtime state machine for the
//! Smart Response handheld.
//!
//! Everything in here is driven through small collaborator traits (clock,
//! toolkit, peripherals, config store, network link, input) so the same code
//! runs on the ESP32-S3 board crate and in host tests.

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod boot;
pub mod config;
pub mod device;
pub mod display;
pub mod event_loop;
pub mod input;
pub mod network;
pub mod peripherals;
pub mod render;
pub mod screen;
pub mod settings;
pub mod time;
pub mod ui;

#[cfg(test)]
mod testkit;
