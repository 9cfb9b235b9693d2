//! Windowed-sinc low-pass design used to fill the kernel bank.

use std::f64::consts::PI;

/// Zeroth order modified Bessel function of the first kind.
pub(super) fn bessel_i0(x: f64) -> f64 {
    const EPSILON: f64 = 1e-12;
    let half = x / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut k = 1.0;
    loop {
        let t = half / k;
        term *= t * t;
        sum += term;
        k += 1.0;
        if term < EPSILON * sum {
            break;
        }
    }
    sum
}

/// Kaiser's beta for a stop band attenuation in dB.
pub(super) fn kaiser_beta(attenuation: f64) -> f64 {
    if attenuation > 50.0 {
        0.1102 * (attenuation - 8.7)
    } else if attenuation >= 21.0 {
        0.5842 * (attenuation - 21.0).powf(0.4) + 0.07886 * (attenuation - 21.0)
    } else {
        0.0
    }
}

/// Kaiser's length estimate. `transition` is normalized to the sample rate.
pub(super) fn kaiser_len(attenuation: f64, transition: f64) -> usize {
    let n = (attenuation - 7.95) / (2.285 * 2.0 * PI * transition);
    odd(n.ceil() as usize + 1)
}

/// Blackman needs roughly `5.5 / transition` taps.
pub(super) fn blackman_len(transition: f64) -> usize {
    odd((5.5 / transition).ceil() as usize)
}

// symmetric kernels need a middle tap
fn odd(n: usize) -> usize {
    n.max(3) | 1
}

pub(super) fn kaiser_window(len: usize, beta: f64) -> Vec<f64> {
    let m = (len - 1) as f64;
    let denom = bessel_i0(beta);
    (0..len)
        .map(|i| {
            let r = 2.0 * i as f64 / m - 1.0;
            bessel_i0(beta * (1.0 - r * r).max(0.0).sqrt()) / denom
        })
        .collect()
}

pub(super) fn blackman_window(len: usize) -> Vec<f64> {
    let m = (len - 1) as f64;
    (0..len)
        .map(|i| {
            let x = 2.0 * PI * i as f64 / m;
            0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
        })
        .collect()
}

/// Windowed sinc with its corner at `corner` (fraction of the sample rate),
/// normalized to unity DC gain.
pub(super) fn lowpass(corner: f64, window: &[f64]) -> Vec<f64> {
    let center = (window.len() - 1) as f64 / 2.0;
    let mut h: Vec<f64> = window
        .iter()
        .enumerate()
        .map(|(i, w)| {
            let x = i as f64 - center;
            let sinc = if x == 0.0 {
                2.0 * corner
            } else {
                (2.0 * PI * corner * x).sin() / (PI * x)
            };
            sinc * w
        })
        .collect();

    let sum: f64 = h.iter().sum();
    h.iter_mut().for_each(|v| *v /= sum);
    h
}

/// Rounds to fixed point with `bits` fraction bits. The rounding error is
/// pushed into the largest tap so the taps sum to exactly `1 << bits`.
pub(super) fn quantize(h: &[f64], bits: u32) -> (Vec<i32>, usize) {
    let unit = (1u64 << bits) as f64;
    let mut taps: Vec<i32> = h.iter().map(|v| (v * unit).round() as i32).collect();

    let peak = taps
        .iter()
        .enumerate()
        .max_by_key(|(_, t)| t.abs())
        .map(|(i, _)| i)
        .unwrap_or(0);

    let sum: i64 = taps.iter().map(|&t| t as i64).sum();
    taps[peak] += ((1i64 << bits) - sum) as i32;

    (taps, peak)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bessel() {
        assert_eq!(bessel_i0(0.0), 1.0);
        // I0(1) = 1.2660658777...
        assert!((bessel_i0(1.0) - 1.266_065_877_752_008).abs() < 1e-9);
    }

    #[test]
    fn test_windows_are_symmetric() {
        let k = kaiser_window(31, kaiser_beta(80.0));
        let b = blackman_window(31);
        for i in 0..31 {
            assert!((k[i] - k[30 - i]).abs() < 1e-12);
            assert!((b[i] - b[30 - i]).abs() < 1e-12);
        }
        assert!((k[15] - 1.0).abs() < 1e-12);
        assert!((b[15] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lengths() {
        assert_eq!(kaiser_len(80.0, 0.1) % 2, 1);
        assert!(kaiser_len(40.0, 0.1) < kaiser_len(80.0, 0.1));
        assert!(blackman_len(0.01) > blackman_len(0.1));
    }

    #[test]
    fn test_quantize_exact_sum() {
        let h = lowpass(0.2, &kaiser_window(41, kaiser_beta(60.0)));
        let (taps, peak) = quantize(&h, 30);
        let sum: i64 = taps.iter().map(|&t| t as i64).sum();
        assert_eq!(sum, 1 << 30);
        assert_eq!(peak, 20);
    }
}
