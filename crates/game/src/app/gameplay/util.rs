use rand::Rng;

/// Converts a speed in km/h into on-screen pixels per second.
pub(crate) fn to_pixels_per_second(speed_kmh: f32, pixels_per_meter: f32) -> f32 {
    speed_kmh * 1000.0 / 3600.0 * pixels_per_meter
}

/// Uniform integer in `[min, max]`.
///
/// Panics when `min > max`; configuration validation rules that out for every
/// caller fed from config.
pub(crate) fn random_int_inclusive<R: Rng + ?Sized>(rng: &mut R, min: u32, max: u32) -> u32 {
    assert!(
        min <= max,
        "random_int_inclusive requires min <= max (got min={min}, max={max})"
    );
    rng.gen_range(min..=max)
}
