mod prometheus;

pub use self::prometheus::PrometheusMetricsSink;
