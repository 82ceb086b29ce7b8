use serde::Serialize;

use crate::models::request_model::RequestDescriptor;

/// Latencies of one batch, in completion order, plus its wall-clock total.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    pub response_times: Vec<f64>,
    pub total_ms: f64,
}

impl BatchResult {
    pub fn average_ms(&self) -> f64 {
        if self.response_times.is_empty() {
            return 0.0;
        }
        self.response_times.iter().sum::<f64>() / self.response_times.len() as f64
    }
}

#[derive(Debug, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub target_url: String,
    pub http_method: String,
    pub request_count: usize,
    pub concurrency: usize,

    pub response_times: Vec<f64>,
    pub total_ms: f64,
    pub average_ms: f64,

    pub fastest_response: f64,
    pub slowest_response: f64,
    pub median_response_time: f64,
    pub throughput: f64,

    pub timestamp: String,
}

impl BatchReport {
    pub fn new(
        descriptor: &RequestDescriptor,
        concurrency: usize,
        result: BatchResult,
        timestamp: String,
    ) -> Self {
        let fastest = result.response_times.iter().copied().fold(f64::NAN, f64::min);
        let slowest = result.response_times.iter().copied().fold(f64::NAN, f64::max);
        let throughput = if result.total_ms > 0.0 {
            result.response_times.len() as f64 / (result.total_ms / 1000.0)
        } else {
            0.0
        };

        Self {
            target_url: descriptor.url.clone(),
            http_method: descriptor.method.to_string(),
            request_count: result.response_times.len(),
            concurrency,
            average_ms: result.average_ms(),
            fastest_response: if fastest.is_nan() { 0.0 } else { fastest },
            slowest_response: if slowest.is_nan() { 0.0 } else { slowest },
            median_response_time: calculate_median(&result.response_times),
            throughput,
            total_ms: result.total_ms,
            response_times: result.response_times,
            timestamp,
        }
    }
}

/// Median of the samples, `0.0` for an empty batch.
pub fn calculate_median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    match sorted.len() {
        0 => 0.0,
        n if n % 2 == 1 => sorted[n / 2],
        n => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request_model::HttpMethod;

    fn descriptor() -> RequestDescriptor {
        RequestDescriptor {
            url: "/rest/api/3/myself".to_string(),
            method: HttpMethod::GET,
            body: None,
        }
    }

    #[test]
    fn median_of_even_and_odd_sets() {
        assert_eq!(calculate_median(&[]), 0.0);
        assert_eq!(calculate_median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(calculate_median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn report_aggregates_samples() {
        let result = BatchResult {
            response_times: vec![30.0, 10.0, 20.0],
            total_ms: 500.0,
        };
        let report = BatchReport::new(&descriptor(), 2, result, "now".to_string());

        assert_eq!(report.request_count, 3);
        assert_eq!(report.average_ms, 20.0);
        assert_eq!(report.fastest_response, 10.0);
        assert_eq!(report.slowest_response, 30.0);
        assert_eq!(report.median_response_time, 20.0);
        assert_eq!(report.throughput, 6.0);
        assert_eq!(report.http_method, "GET");
    }

    #[test]
    fn empty_batch_reports_zeros() {
        let report = BatchReport::new(&descriptor(), 5, BatchResult::default(), String::new());
        assert_eq!(report.average_ms, 0.0);
        assert_eq!(report.fastest_response, 0.0);
        assert_eq!(report.slowest_response, 0.0);
        assert_eq!(report.throughput, 0.0);
    }
}
