// tests/formatting_test.rs

use ac_susceptibility_render::plot_framework::{calculate_range, format_log_tick};

#[test]
fn range_padding_is_fifteen_percent() {
    let (min, max) = calculate_range(0.0, 10.0);
    assert_eq!(min, -1.5);
    assert_eq!(max, 11.5);
}

#[test]
fn degenerate_ranges_get_fixed_padding() {
    let (min, max) = calculate_range(5.0, 5.0);
    assert_eq!(min, 4.5);
    assert_eq!(max, 5.5);
}

#[test]
fn swapped_bounds_are_reordered() {
    let (min, max) = calculate_range(10.0, 0.0);
    assert!(min < max);
    assert_eq!(min, -1.5);
    assert_eq!(max, 11.5);
}

#[test]
fn whole_frequencies_are_printed_without_decimals() {
    assert_eq!(format_log_tick(&10.0), "10");
    assert_eq!(format_log_tick(&1000.0), "1000");
    assert_eq!(format_log_tick(&0.1), "0.1");
}
