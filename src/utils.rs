use std::{error::Error, fmt};
use tracing_subscriber::EnvFilter;

/// Start the tracing subscriber used by all the binaries.
/// RUST_LOG wins when set, otherwise debug for verbose runs and info by default.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Minimum and maximum over the finite values, None when there are none.
pub fn min_and_max<'a, I>(s: I) -> Option<(f64, f64)>
where
    I: Iterator<Item = &'a f64>,
{
    s.filter(|v| v.is_finite()).fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

/// Axis range with some padding, never degenerate.
pub fn padded_range(min: f64, max: f64, pad_fraction: f64) -> (f64, f64) {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        let pad = if min.abs() > f64::EPSILON { min.abs() * 0.1 } else { 1.0 };
        (min - pad, max + pad)
    } else {
        (min - span * pad_fraction, max + span * pad_fraction)
    }
}

// Calculate the lower quartile, the median and the upper quartile
// using the linear method (R-7), the default of NumPy.
// Note, no + 1 here because of the zero-starting indexing, i.e.,
// h = (N - 1) * q + 1  => (N - 1) * q
pub fn quartiles(s: &[f64], min_len: usize) -> Result<(f64, f64, f64), LenErr> {
    let mut v: Vec<f64> = s.iter().filter(|n| n.is_finite()).copied().collect();
    let v_len = v.len();
    if v_len < min_len.max(1) {
        return Err(LenErr {
            min_len: Some(min_len.max(1)),
            got_len: v_len,
            max_len: None,
        });
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let quantile = |q: f64| {
        let h = (v_len as f64 - 1.) * q;
        let h_int = h.floor() as usize;
        let h_fract = h.fract();
        match v.get(h_int + 1) {
            Some(next) => v[h_int] + (next - v[h_int]) * h_fract,
            None => v[h_int],
        }
    };
    Ok((quantile(0.25), quantile(0.5), quantile(0.75)))
}

// An Error type for handling length requirements,
// often needed in time series and statistics.
#[derive(Debug)]
pub struct LenErr {
    pub min_len: Option<usize>,
    pub got_len: usize,
    pub max_len: Option<usize>,
}
impl Error for LenErr {}
impl fmt::Display for LenErr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid length, got {}, required is >= {:?} and <= {:?}",
            self.got_len, self.min_len, self.max_len
        )
    }
}

/// Unit used to print a power value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUnit {
    Auto,
    Watt,
    MilliWatt,
}

/// Format a power given in watts.
/// Auto keeps watts from 1 W upwards and switches to milliwatts below.
pub fn format_power_value(power_w: f64, unit: PowerUnit) -> String {
    match unit {
        PowerUnit::Auto if power_w >= 1. => format!("{:.3} W", power_w),
        PowerUnit::Auto => format!("{:.2} mW", power_w * 1000.),
        PowerUnit::Watt => format!("{:.3} W", power_w),
        PowerUnit::MilliWatt => format!("{:.2} mW", power_w * 1000.),
    }
}

/// Human readable duration: seconds, minutes, hours or days.
pub fn format_time_duration(seconds: f64) -> String {
    if !seconds.is_finite() {
        "unlimited".to_string()
    } else if seconds < 60. {
        format!("{:.1} s", seconds)
    } else if seconds < 3600. {
        format!("{:.1} min", seconds / 60.)
    } else if seconds < 86400. {
        format!("{:.1} h", seconds / 3600.)
    } else {
        format!("{:.1} days", seconds / 86400.)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_and_max_skips_nan() {
        let v = [3., f64::NAN, -1., 7.5];
        assert_eq!(min_and_max(v.iter()), Some((-1., 7.5)));
        let empty: [f64; 0] = [];
        assert_eq!(min_and_max(empty.iter()), None);
        assert_eq!(min_and_max([f64::NAN].iter()), None);
    }

    #[test]
    fn quartiles_match_numpy_linear() {
        let v = [1., 2., 3., 4., 5., 6., 7., 8.];
        let (q1, med, q3) = quartiles(&v, 1).unwrap();
        assert!((q1 - 2.75).abs() < 1e-12);
        assert!((med - 4.5).abs() < 1e-12);
        assert!((q3 - 6.25).abs() < 1e-12);
        let (q1, med, q3) = quartiles(&[4.], 1).unwrap();
        assert_eq!((q1, med, q3), (4., 4., 4.));
    }

    #[test]
    fn quartiles_length_error() {
        let err = quartiles(&[1., f64::NAN], 3).unwrap_err();
        assert_eq!(err.got_len, 1);
        assert_eq!(err.min_len, Some(3));
    }

    #[test]
    fn padded_range_is_never_empty() {
        assert_eq!(padded_range(0., 0., 0.1), (-1., 1.));
        let (lo, hi) = padded_range(10., 20., 0.1);
        assert!((lo - 9.).abs() < 1e-12 && (hi - 21.).abs() < 1e-12);
    }

    #[test]
    fn power_formatting() {
        assert_eq!(format_power_value(0.074, PowerUnit::Auto), "74.00 mW");
        assert_eq!(format_power_value(1.5, PowerUnit::Auto), "1.500 W");
        assert_eq!(format_power_value(0.5, PowerUnit::Watt), "0.500 W");
        assert_eq!(format_power_value(2., PowerUnit::MilliWatt), "2000.00 mW");
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_time_duration(12.34), "12.3 s");
        assert_eq!(format_time_duration(90.), "1.5 min");
        assert_eq!(format_time_duration(7200.), "2.0 h");
        assert_eq!(format_time_duration(172800.), "2.0 days");
        assert_eq!(format_time_duration(f64::INFINITY), "unlimited");
    }
}
