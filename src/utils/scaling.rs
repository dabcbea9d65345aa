// src/utils/scaling.rs

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ScalerError {
    #[error("cannot fit a scaler on an empty sample")]
    Empty,
    #[error("sample contains a non-finite value")]
    NonFinite,
}

/// Linear rescaling onto [0, 1] using the observed minimum and maximum.
///
/// A constant sample gets a scale of 1, so values map to `x - min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinMaxScaler {
    pub data_min: f64,
    pub data_max: f64,
}

impl MinMaxScaler {
    pub fn fit(values: &[f64]) -> Result<Self, ScalerError> {
        if values.is_empty() {
            return Err(ScalerError::Empty);
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ScalerError::NonFinite);
        }
        let data_max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let data_min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        Ok(MinMaxScaler { data_min, data_max })
    }

    fn range(&self) -> f64 {
        let range = self.data_max - self.data_min;
        if range == 0.0 { 1.0 } else { range }
    }

    pub fn transform_one(&self, x: f64) -> f64 {
        (x - self.data_min) / self.range()
    }

    pub fn inverse_one(&self, x: f64) -> f64 {
        x * self.range() + self.data_min
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&x| self.transform_one(x)).collect()
    }

    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&x| self.inverse_one(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_extremes_to_unit_interval() {
        let scaler = MinMaxScaler::fit(&[10.0, 30.0, 20.0]).unwrap();
        assert_eq!(scaler.transform(&[10.0, 20.0, 30.0]), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn round_trip_recovers_values_in_range() {
        let values = [101.25, 99.5, 120.75, 87.0, 110.0];
        let scaler = MinMaxScaler::fit(&values).unwrap();
        let back = scaler.inverse_transform(&scaler.transform(&values));
        for (a, b) in values.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn constant_sample_maps_to_zero() {
        let scaler = MinMaxScaler::fit(&[5.0, 5.0]).unwrap();
        assert_eq!(scaler.transform(&[5.0]), vec![0.0]);
        assert_eq!(scaler.inverse_transform(&[0.0]), vec![5.0]);
    }

    #[test]
    fn rejects_empty_and_nan() {
        assert_eq!(MinMaxScaler::fit(&[]), Err(ScalerError::Empty));
        assert_eq!(MinMaxScaler::fit(&[1.0, f64::NAN]), Err(ScalerError::NonFinite));
    }
}
