/// Re-maps `value` from `[in_min, in_max]` onto `[out_min, out_max]` without clamping.
///
/// A degenerate input range maps everything to `out_min`.
pub fn linear_map(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    out_min + (value - in_min) * (out_max - out_min) / span
}
