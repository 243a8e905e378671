//! Linear and square-root scales with nice bounds and tick generation.
//!
//! Tick placement follows the usual 1-2-5 increments so that axes read
//! the same as in common charting libraries.

const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Integer tick range `[i1, i2]` and increment for `[start, stop]`.
///
/// A negative increment means ticks are `i / -inc` (sub-unit steps).
fn tick_spec(start: f64, stop: f64, count: f64) -> (f64, f64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let positive = 10f64.powf(-power) / factor;
        i1 = (start * positive).round();
        i2 = (stop * positive).round();
        if i1 / positive < start {
            i1 += 1.0;
        }
        if i2 / positive > stop {
            i2 -= 1.0;
        }
        inc = -positive;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }

    (i1, i2, inc)
}

/// Increment between ticks; negative values encode `1 / -inc`.
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    tick_spec(start, stop, count).2
}

/// Roughly `count` evenly spaced round values within `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (i1, i2, inc) = if reverse {
        tick_spec(stop, start, count)
    } else {
        tick_spec(start, stop, count)
    };
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1) as usize + 1;
    let mut out: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 {
                k / -inc
            } else {
                k * inc
            }
        })
        .collect();

    if reverse {
        out.reverse();
    }
    out
}

/// Evenly stepped values from `start` while below `end`.
pub fn range(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !(end > start) {
        return Vec::new();
    }
    let n = ((end - start) / step).ceil() as usize;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Continuous linear mapping from a domain to a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Map a domain value into the range. Not clamped.
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let t = if d1 - d0 != 0.0 {
            (value - d0) / (d1 - d0)
        } else {
            0.5
        };
        r0 + t * (r1 - r0)
    }

    /// Extend the domain to round values for roughly `count` ticks.
    pub fn nice(mut self, count: f64) -> Self {
        let [mut d0, mut d1] = self.domain;
        let reversed = d1 < d0;
        if reversed {
            std::mem::swap(&mut d0, &mut d1);
        }

        let mut previous = None;
        for _ in 0..10 {
            let step = tick_increment(d0, d1, count);
            if previous == Some(step) {
                break;
            } else if step > 0.0 {
                d0 = (d0 / step).floor() * step;
                d1 = (d1 / step).ceil() * step;
            } else if step < 0.0 {
                d0 = (d0 * step).ceil() / step;
                d1 = (d1 * step).floor() / step;
            } else {
                break;
            }
            previous = Some(step);
        }

        self.domain = if reversed { [d1, d0] } else { [d0, d1] };
        self
    }

    pub fn ticks(&self, count: f64) -> Vec<f64> {
        ticks(self.domain[0], self.domain[1], count)
    }
}

/// Square-root mapping, used for radius so that area tracks value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    inner: LinearScale,
}

fn signed_sqrt(x: f64) -> f64 {
    x.signum() * x.abs().sqrt()
}

impl SqrtScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self {
            inner: LinearScale::new([signed_sqrt(domain[0]), signed_sqrt(domain[1])], range),
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        self.inner.apply(signed_sqrt(value))
    }
}
