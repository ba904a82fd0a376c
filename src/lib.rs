// src/lib.rs
pub mod cloud;
pub mod components;
pub mod d3_cloud;
pub mod error;
pub mod pipeline;
pub mod showcase_config;
pub mod showcase_data;
pub mod table;
pub mod utils;
pub mod widgets;
