// src/data_analysis/mod.rs

pub mod asym2sig;
pub mod calibration;
pub mod least_squares;
pub mod voltage_fit;
