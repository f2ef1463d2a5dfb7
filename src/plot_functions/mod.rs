// src/plot_functions/mod.rs

pub mod plot_magnetization;
pub mod plot_voltage;
