//! Robust summary statistics over per-game samples.
//!
//! Everything here is a pure function over a finite, non-empty slice.
//! Emptiness is the caller's responsibility; these assert instead of
//! returning errors.

use std::fmt::Display;

/// Arithmetic mean of the sample.
pub fn mean(sample: &[f64]) -> f64 {
    assert!(!sample.is_empty(), "mean of an empty sample");
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Median of the sample. Sorts a copy; the input is left untouched.
pub fn median(sample: &[f64]) -> f64 {
    assert!(!sample.is_empty(), "median of an empty sample");
    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("NaN in sample"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Unscaled median absolute deviation: the median of `|x - median(sample)|`.
///
/// No consistency factor is applied.
pub fn median_absolute_deviation(sample: &[f64]) -> f64 {
    let med = median(sample);
    let deviations = sample.iter().map(|x| (x - med).abs()).collect::<Vec<_>>();
    median(&deviations)
}

/// Summary of one sample, formatted the way the final run report prints it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleSummary {
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median.
    pub median: f64,
    /// Unscaled median absolute deviation.
    pub mad: f64,
}

impl SampleSummary {
    /// Compute the summary of a non-empty sample.
    pub fn describe(sample: &[f64]) -> SampleSummary {
        assert!(!sample.is_empty(), "summary of an empty sample");
        let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
        let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        SampleSummary {
            min,
            max,
            mean: mean(sample),
            median: median(sample),
            mad: median_absolute_deviation(sample),
        }
    }

    /// Spread of the sample (`max - min`).
    pub fn spread(&self) -> f64 {
        self.max - self.min
    }

    /// MAD expressed as a percentage of the median.
    pub fn mad_percent(&self) -> f64 {
        self.mad / self.median * 100.0
    }
}

impl Display for SampleSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Range:  [{:6.3} - {:6.3}] ({:6.3})",
            self.min,
            self.max,
            self.spread()
        )?;
        writeln!(f, "Average: {:6.3}", self.mean)?;
        writeln!(f, "Median:  {:6.3}", self.median)?;
        write!(f, "MAD:     {:6.3} ({:5.2}%)", self.mad, self.mad_percent())
    }
}

#[cfg(test)]
mod stats_tests {
    use super::*;

    #[test]
    fn mean_of_constant_sample() {
        assert_eq!(mean(&[4.0, 4.0, 4.0]), 4.0);
    }

    #[test]
    fn median_odd_length_is_middle_element() {
        assert_eq!(median(&[1.0, 3.0, 2.0]), 2.0);
    }

    #[test]
    fn median_even_length_averages_middle_pair() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
    }

    #[test]
    fn median_does_not_mutate_input() {
        let sample = [3.0, 1.0, 2.0];
        let _ = median(&sample);
        assert_eq!(sample, [3.0, 1.0, 2.0]);
    }

    #[test]
    fn median_is_bounded_by_extrema() {
        let samples: &[&[f64]] = &[
            &[1.0],
            &[5.0, -3.0],
            &[0.1, 0.2, 0.3, 100.0],
            &[-7.0, -7.0, -7.0, 2.0, 9.0],
        ];
        for sample in samples {
            let med = median(sample);
            let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
            let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            assert!(min <= med && med <= max, "median {med} outside [{min}, {max}]");
        }
    }

    #[test]
    fn mad_resists_outliers() {
        // median 3, deviations [2, 1, 0, 1, 97]
        assert_eq!(median_absolute_deviation(&[1.0, 2.0, 3.0, 4.0, 100.0]), 1.0);
    }

    #[test]
    fn summary_of_outlier_sample() {
        let summary = SampleSummary::describe(&[1.0, 2.0, 3.0, 4.0, 100.0]);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.spread(), 99.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.mad, 1.0);
    }

    #[test]
    fn summary_renders_report_lines() {
        let summary = SampleSummary::describe(&[6.0, 8.0, 10.0]);
        let text = summary.to_string();
        assert!(text.contains("Range:  [ 6.000 - 10.000] ( 4.000)"));
        assert!(text.contains("Average:  8.000"));
        assert!(text.contains("Median:   8.000"));
    }

    #[test]
    #[should_panic(expected = "empty sample")]
    fn median_rejects_empty_sample() {
        let _ = median(&[]);
    }
}
