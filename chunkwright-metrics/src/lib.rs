use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Counters shared by every worker of one conversion run.
#[derive(Debug, Default)]
pub struct ConversionMetrics {
    // Decode
    pub chunks_decoded: AtomicUsize,
    pub decode_time_us: AtomicU64,
    pub max_decode_time_us: AtomicU64,

    // Encode
    pub chunks_encoded: AtomicUsize,
    pub encode_time_us: AtomicU64,
    pub max_encode_time_us: AtomicU64,

    pub failures: AtomicUsize,
    pub dropped_families: AtomicUsize,

    pub bytes_in: AtomicUsize,
    pub bytes_out: AtomicUsize,

    // Session
    pub start_time: Option<Instant>,
    pub config_summary: String,
}

fn micros(duration: Duration) -> u64 {
    duration.as_micros() as u64
}

fn millis(us: u64) -> f64 {
    us as f64 / 1000.0
}

fn average(total: f64, count: usize) -> f64 {
    if count > 0 { total / count as f64 } else { 0.0 }
}

impl ConversionMetrics {
    pub fn new(config_summary: String) -> Self {
        Self {
            start_time: Some(Instant::now()),
            config_summary,
            ..Default::default()
        }
    }

    pub fn record_decode(&self, duration: Duration, bytes: usize) {
        let us = micros(duration);
        self.chunks_decoded.fetch_add(1, Ordering::Relaxed);
        self.decode_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_decode_time_us.fetch_max(us, Ordering::Relaxed);
        self.bytes_in.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_encode(&self, duration: Duration, bytes: usize, dropped: usize) {
        let us = micros(duration);
        self.chunks_encoded.fetch_add(1, Ordering::Relaxed);
        self.encode_time_us.fetch_add(us, Ordering::Relaxed);
        self.max_encode_time_us.fetch_max(us, Ordering::Relaxed);
        self.bytes_out.fetch_add(bytes, Ordering::Relaxed);
        self.dropped_families.fetch_add(dropped, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();

        let decoded = self.chunks_decoded.load(Ordering::Relaxed);
        let decode_total = millis(self.decode_time_us.load(Ordering::Relaxed));
        let decode_max = millis(self.max_decode_time_us.load(Ordering::Relaxed));

        let encoded = self.chunks_encoded.load(Ordering::Relaxed);
        let encode_total = millis(self.encode_time_us.load(Ordering::Relaxed));
        let encode_max = millis(self.max_encode_time_us.load(Ordering::Relaxed));

        let bytes_in = self.bytes_in.load(Ordering::Relaxed);
        let bytes_out = self.bytes_out.load(Ordering::Relaxed);
        let size_ratio = if bytes_in > 0 { bytes_out as f64 / bytes_in as f64 } else { 0.0 };

        format!(
            "Chunkwright Conversion Report\n\
             =============================\n\
             Configuration: {}\n\
             Session Duration: {:.2?}\n\n\
             [Decode]\n\
             Chunks Decoded: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.2} ms/chunk\n\
             Max Time: {:.2} ms\n\
             Bytes In: {:.1} KB\n\n\
             [Encode]\n\
             Chunks Encoded: {}\n\
             Total Time: {:.2} ms\n\
             Avg Time: {:.2} ms/chunk\n\
             Max Time: {:.2} ms\n\
             Bytes Out: {:.1} KB ({:.2}x of input)\n\
             Dropped Families: {}\n\n\
             [Errors]\n\
             Failures: {}\n",
            self.config_summary,
            uptime,
            decoded,
            decode_total,
            average(decode_total, decoded),
            decode_max,
            bytes_in as f64 / 1024.0,
            encoded,
            encode_total,
            average(encode_total, encoded),
            encode_max,
            bytes_out as f64 / 1024.0,
            size_ratio,
            self.dropped_families.load(Ordering::Relaxed),
            self.failures.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = ConversionMetrics::new("test".to_string());
        metrics.record_decode(Duration::from_micros(1500), 4096);
        metrics.record_decode(Duration::from_micros(500), 1024);
        metrics.record_encode(Duration::from_micros(700), 2048, 1);
        metrics.record_failure();

        assert_eq!(metrics.chunks_decoded.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.decode_time_us.load(Ordering::Relaxed), 2000);
        assert_eq!(metrics.max_decode_time_us.load(Ordering::Relaxed), 1500);
        assert_eq!(metrics.bytes_in.load(Ordering::Relaxed), 5120);
        assert_eq!(metrics.chunks_encoded.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.dropped_families.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_report_contents() {
        let metrics = ConversionMetrics::new("target=4671".to_string());
        metrics.record_decode(Duration::from_millis(2), 1024);
        let report = metrics.generate_report();
        assert!(report.contains("Configuration: target=4671"));
        assert!(report.contains("Chunks Decoded: 1"));
        assert!(report.contains("Avg Time: 2.00 ms/chunk"));
        assert!(report.contains("Chunks Encoded: 0"));
    }

    #[test]
    fn test_empty_report_has_no_nan() {
        let report = ConversionMetrics::default().generate_report();
        assert!(!report.contains("NaN"));
    }
}
