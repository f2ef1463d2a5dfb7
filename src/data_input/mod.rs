// src/data_input/mod.rs

pub mod organize;
pub mod scan_data;
pub mod scan_parser;
