// src/constants.rs

// Import specific colors needed
use plotters::style::colors::full_palette::{LIGHTBLUE, ORANGE};
use plotters::style::RGBColor;

// --- Scan File Format ---

// Number of instrument header lines before the numeric rows.
pub const SCAN_HEADER_LINES: usize = 5;

// The position encoder reports 250 counts per millimeter of sample travel.
pub const POSITION_COUNTS_PER_MM: f64 = 250.0;

// Raw file stems carry a 12-character session prefix and a "_NNNN"
// measurement-number suffix around the frequency label.
pub const RAW_STEM_PREFIX_LEN: usize = 12;
pub const RAW_STEM_SUFFIX_LEN: usize = 5;
pub const MEASUREMENT_NUMBER_LEN: usize = 4;

// --- Voltage Fit ---

// Initial guess for the sigmoid transition widths, in millimeters.
pub const INITIAL_SIGMOID_WIDTH_MM: f64 = 2.0;

pub const FIT_MAX_ITERATIONS: usize = 200;
pub const FIT_TOLERANCE: f64 = 1e-10;
pub const FIT_FD_STEP: f64 = 1e-7;
pub const FIT_INITIAL_DAMPING: f64 = 1e-3;
pub const FIT_DAMPING_INCREASE: f64 = 10.0;
pub const FIT_DAMPING_DECREASE: f64 = 0.1;
pub const FIT_MAX_DAMPING: f64 = 1e12;

// --- Plot Dimensions ---

pub const VOLTAGE_PLOT_WIDTH: u32 = 1650;
pub const VOLTAGE_PLOT_HEIGHT: u32 = 600;
pub const MAGNETIZATION_PLOT_WIDTH: u32 = 1800;
pub const MAGNETIZATION_PLOT_HEIGHT: u32 = 1800;

// --- Plot Color Assignments ---

pub const COLOR_VOLTAGE_DATA: &RGBColor = &LIGHTBLUE;
pub const COLOR_VOLTAGE_FIT: &RGBColor = &ORANGE;

// Stroke widths and marker size for series
pub const LINE_WIDTH_PLOT: u32 = 1;
pub const LINE_WIDTH_LEGEND: u32 = 2;
pub const MARKER_SIZE: u32 = 2;

// Font sizes
pub const FONT_SIZE_MAIN_TITLE: u32 = 24;
pub const FONT_SIZE_CHART_TITLE: u32 = 20;
pub const FONT_SIZE_AXIS_LABEL: u32 = 12;
pub const FONT_SIZE_LEGEND: u32 = 12;
pub const FONT_SIZE_MESSAGE: i32 = 20;

pub const VOLTS_TO_MILLIVOLTS: f64 = 1000.0;

// src/constants.rs
