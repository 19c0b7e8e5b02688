use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid threshold '{value}'. Expected '<aggregation><op><number>', e.g. 'p(95)<500'.")]
    InvalidThresholdFormat { value: String },
    #[error("Unknown threshold aggregation '{value}'.")]
    UnknownAggregation { value: String },
    #[error("Invalid threshold percentile '{value}'.")]
    InvalidPercentile { value: String },
    #[error("Invalid threshold bound '{value}'.")]
    InvalidThresholdBound { value: String },
    #[error("Unknown metric '{metric}'.")]
    UnknownMetric { metric: String },
    #[error("Threshold '{expression}' does not apply to {kind} metric '{metric}'.")]
    AggregationMismatch {
        metric: String,
        expression: String,
        kind: &'static str,
    },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
