//! MatCalc-rs library — application logic for the matrix product calculator.

pub mod app;
pub mod config;
pub mod errors;
pub mod generator;
