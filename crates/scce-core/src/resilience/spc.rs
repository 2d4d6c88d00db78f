//! Statistical process control for resilience metrics, borrowed from
//! semiconductor manufacturing: control charts flag drift before it becomes
//! an incident. X-bar uses fixed 3σ limits, CUSUM accumulates small
//! systematic shifts, EWMA smooths noisy series while staying responsive.

use crate::error::{SccError, SccResult};

const MIN_BASELINE_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    A,
    B,
    C,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLimits {
    pub center_line: f64,
    pub ucl: f64,
    pub lcl: f64,
    pub uwl: f64,
    pub lwl: f64,
    pub sigma: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlChartPoint {
    pub value: f64,
    pub is_in_control: bool,
    pub zone: Zone,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapabilityIndices {
    pub cp: f64,
    pub cpk: f64,
    pub cpu: f64,
    pub cpl: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    InsufficientData,
    Stable,
    Increasing,
    Decreasing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct XBarChart {
    pub limits: ControlLimits,
    pub data_points: Vec<f64>,
}

impl XBarChart {
    pub fn from_baseline(baseline: &[f64], target: Option<f64>, sigma_multiplier: f64) -> SccResult<Self> {
        if baseline.len() < MIN_BASELINE_POINTS {
            return Err(SccError::Invalid(format!(
                "need at least {MIN_BASELINE_POINTS} baseline points, got {}",
                baseline.len()
            )));
        }
        let mean = mean(baseline);
        let sigma = sample_stddev(baseline, mean);
        let center_line = target.unwrap_or(mean);

        let limits = ControlLimits {
            center_line,
            ucl: center_line + sigma_multiplier * sigma,
            lcl: center_line - sigma_multiplier * sigma,
            uwl: center_line + 2.0 * sigma,
            lwl: center_line - 2.0 * sigma,
            sigma,
        };
        Ok(Self { limits, data_points: Vec::new() })
    }

    pub fn add_point(&mut self, value: f64) -> ControlChartPoint {
        self.data_points.push(value);
        let zone = self.zone_for(value);
        let is_in_control = value >= self.limits.lcl && value <= self.limits.ucl;
        ControlChartPoint { value, is_in_control, zone }
    }

    fn zone_for(&self, value: f64) -> Zone {
        let distance = (value - self.limits.center_line).abs();
        let sigma = self.limits.sigma;
        if sigma == 0.0 {
            return if distance == 0.0 { Zone::A } else { Zone::Out };
        }
        if distance > 3.0 * sigma {
            Zone::Out
        } else if distance > 2.0 * sigma {
            Zone::C
        } else if distance > sigma {
            Zone::B
        } else {
            Zone::A
        }
    }

    pub fn capability_indices(&self) -> Option<CapabilityIndices> {
        if self.data_points.is_empty() || self.limits.sigma == 0.0 {
            return None;
        }
        let sigma = self.limits.sigma;
        let cp = (self.limits.ucl - self.limits.lcl) / (6.0 * sigma);
        let process_mean = mean(&self.data_points);
        let cpu = (self.limits.ucl - process_mean) / (3.0 * sigma);
        let cpl = (process_mean - self.limits.lcl) / (3.0 * sigma);
        Some(CapabilityIndices { cp, cpk: cpu.min(cpl), cpu, cpl })
    }

    pub fn detect_trend(&self, window_size: usize) -> Trend {
        if self.data_points.len() < window_size || window_size < 2 {
            return Trend::InsufficientData;
        }
        let recent = &self.data_points[self.data_points.len() - window_size..];
        let slope = linear_regression_slope(recent);
        if slope.abs() < 0.01 {
            Trend::Stable
        } else if slope > 0.0 {
            Trend::Increasing
        } else {
            Trend::Decreasing
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CusumChart {
    target: f64,
    k: f64,
    h: f64,
    pub cusum_high: f64,
    pub cusum_low: f64,
}

impl CusumChart {
    pub fn new(target: f64, sigma: f64, k_sigma: f64, h_sigma: f64) -> Self {
        Self { target, k: k_sigma * sigma, h: h_sigma * sigma, cusum_high: 0.0, cusum_low: 0.0 }
    }

    pub fn add_point(&mut self, value: f64) -> bool {
        self.cusum_high = (self.cusum_high + (value - self.target) - self.k).max(0.0);
        self.cusum_low = (self.cusum_low + (self.target - value) - self.k).max(0.0);
        self.cusum_high < self.h && self.cusum_low < self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EwmaChart {
    target: f64,
    sigma: f64,
    lambda: f64,
    limit_multiplier: f64,
    pub ewma: f64,
    n: u32,
}

impl EwmaChart {
    pub fn new(target: f64, sigma: f64, lambda: f64, limit_multiplier: f64) -> Self {
        Self { target, sigma, lambda, limit_multiplier, ewma: target, n: 0 }
    }

    pub fn add_point(&mut self, value: f64) -> (f64, f64, bool) {
        self.n += 1;
        self.ewma = self.lambda * value + (1.0 - self.lambda) * self.ewma;

        let variance_factor =
            (self.lambda / (2.0 - self.lambda)) * (1.0 - (1.0 - self.lambda).powi(2 * self.n as i32));
        let sigma_ewma = self.sigma * variance_factor.sqrt();

        let ucl = self.target + self.limit_multiplier * sigma_ewma;
        let lcl = self.target - self.limit_multiplier * sigma_ewma;
        (ucl, lcl, self.ewma >= lcl && self.ewma <= ucl)
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn sample_stddev(data: &[f64], mean: f64) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

fn linear_regression_slope(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    let xs: Vec<f64> = (0..data.len()).map(|i| i as f64).collect();
    let x_mean = mean(&xs);
    let y_mean = mean(data);
    let numerator: f64 = xs.iter().zip(data).map(|(x, y)| (x - x_mean) * (y - y_mean)).sum();
    let denominator: f64 = xs.iter().map(|x| (x - x_mean).powi(2)).sum();
    if denominator == 0.0 {
        return 0.0;
    }
    let _ = n;
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_below_minimum_is_rejected() {
        let err = XBarChart::from_baseline(&[1.0, 2.0], None, 3.0).unwrap_err();
        assert_eq!(err.code(), "E_INVALID");
    }

    #[test]
    fn point_far_outside_limits_is_out_of_control() {
        let mut chart = XBarChart::from_baseline(&[10.0, 11.0, 9.0, 10.5, 9.5], None, 3.0).unwrap();
        let point = chart.add_point(1000.0);
        assert!(!point.is_in_control);
        assert_eq!(point.zone, Zone::Out);
    }

    #[test]
    fn cusum_flags_sustained_upward_drift() {
        let mut chart = CusumChart::new(10.0, 1.0, 0.5, 4.0);
        let mut in_control = true;
        for _ in 0..20 {
            in_control = chart.add_point(13.0);
        }
        assert!(!in_control);
    }

    #[test]
    fn trend_detection_needs_a_full_window() {
        let mut chart = XBarChart::from_baseline(&[1.0, 2.0, 3.0, 4.0, 5.0], None, 3.0).unwrap();
        chart.add_point(1.0);
        assert_eq!(chart.detect_trend(7), Trend::InsufficientData);
    }
}
