/// Fixed-point rendering with trailing zeros (and a then-bare decimal point) removed.
///
/// Never uses exponent notation: `4.0 -> "4"`, `4.2 -> "4.2"`, `1e21 -> "1000000000000000000000"`.
/// Non-finite values render as `NaN`, `+Inf` and `-Inf`.
pub fn format_float(value: f64, precision: usize) -> String {
    match value {
        v if v.is_nan() => "NaN".to_owned(),
        v if v == f64::INFINITY => "+Inf".to_owned(),
        v if v == f64::NEG_INFINITY => "-Inf".to_owned(),
        v => {
            let fixed = format!("{v:.precision$}");
            match fixed.contains('.') {
                true => fixed.trim_end_matches('0').trim_end_matches('.').to_string(),
                false => fixed,
            }
        }
    }
}
