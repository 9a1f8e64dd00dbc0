//! ESP32-S3 board adapters for the Smart Response device.

#![no_std]

pub mod input;
pub mod network;
pub mod peripherals;
pub mod platform;
pub mod render;
pub mod storage;
pub mod time;
