use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{ConfigError, ValidationError};

use super::types::{MetricKind, MetricsSnapshot, metric_kind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregation {
    /// `p(N)` with N in 0..=100.
    Percentile(f64),
    Avg,
    Med,
    Min,
    Max,
    Count,
    Rate,
}

impl Aggregation {
    /// Whether this aggregation yields a value for metrics of `kind`.
    #[must_use]
    pub const fn applies_to(self, kind: MetricKind) -> bool {
        match self {
            Aggregation::Count => true,
            Aggregation::Rate => matches!(kind, MetricKind::Rate | MetricKind::Counter),
            Aggregation::Percentile(_)
            | Aggregation::Avg
            | Aggregation::Med
            | Aggregation::Min
            | Aggregation::Max => matches!(kind, MetricKind::Trend),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

impl Comparison {
    fn holds(self, observed: f64, bound: f64) -> bool {
        match self {
            Comparison::Lt => observed < bound,
            Comparison::Le => observed <= bound,
            Comparison::Gt => observed > bound,
            Comparison::Ge => observed >= bound,
            Comparison::Eq => (observed - bound).abs() < f64::EPSILON,
        }
    }
}

/// A parsed assertion such as `p(95)<500` or `rate<0.01`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdExpr {
    pub aggregation: Aggregation,
    pub comparison: Comparison,
    pub bound: f64,
}

impl std::str::FromStr for ThresholdExpr {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|ch| !ch.is_whitespace()).collect();
        let op_start = compact
            .find(['<', '>', '='])
            .ok_or_else(|| ValidationError::InvalidThresholdFormat {
                value: s.to_owned(),
            })?;
        let (aggregation_part, rest) = compact.split_at(op_start);
        let (comparison, bound_part) = if let Some(bound) = rest.strip_prefix("<=") {
            (Comparison::Le, bound)
        } else if let Some(bound) = rest.strip_prefix(">=") {
            (Comparison::Ge, bound)
        } else if let Some(bound) = rest.strip_prefix("==") {
            (Comparison::Eq, bound)
        } else if let Some(bound) = rest.strip_prefix('<') {
            (Comparison::Lt, bound)
        } else if let Some(bound) = rest.strip_prefix('>') {
            (Comparison::Gt, bound)
        } else {
            return Err(ValidationError::InvalidThresholdFormat {
                value: s.to_owned(),
            });
        };

        let aggregation = parse_aggregation(aggregation_part)?;
        let bound: f64 =
            bound_part
                .parse()
                .map_err(|_err: std::num::ParseFloatError| {
                    ValidationError::InvalidThresholdBound {
                        value: bound_part.to_owned(),
                    }
                })?;
        if !bound.is_finite() {
            return Err(ValidationError::InvalidThresholdBound {
                value: bound_part.to_owned(),
            });
        }

        Ok(Self {
            aggregation,
            comparison,
            bound,
        })
    }
}

fn parse_aggregation(value: &str) -> Result<Aggregation, ValidationError> {
    match value {
        "avg" => Ok(Aggregation::Avg),
        "med" => Ok(Aggregation::Med),
        "min" => Ok(Aggregation::Min),
        "max" => Ok(Aggregation::Max),
        "count" => Ok(Aggregation::Count),
        "rate" => Ok(Aggregation::Rate),
        _ => {
            let inner = value
                .strip_prefix("p(")
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| ValidationError::UnknownAggregation {
                    value: value.to_owned(),
                })?;
            let percentile: f64 =
                inner
                    .parse()
                    .map_err(|_err: std::num::ParseFloatError| {
                        ValidationError::InvalidPercentile {
                            value: inner.to_owned(),
                        }
                    })?;
            if !(0.0..=100.0).contains(&percentile) {
                return Err(ValidationError::InvalidPercentile {
                    value: inner.to_owned(),
                });
            }
            Ok(Aggregation::Percentile(percentile))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Threshold {
    /// Expression exactly as configured, used in reports.
    pub source: String,
    pub expr: ThresholdExpr,
    pub abort_on_fail: bool,
}

impl Threshold {
    /// Parse a threshold expression.
    ///
    /// # Errors
    ///
    /// Returns an error when the expression is malformed.
    pub fn parse(source: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            source: source.trim().to_owned(),
            expr: source.parse()?,
            abort_on_fail: false,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ThresholdOutcome {
    pub metric: String,
    pub expression: String,
    /// `None` when the metric never received a sample.
    pub observed: Option<f64>,
    pub passed: bool,
    pub abort_on_fail: bool,
}

impl ThresholdOutcome {
    #[must_use]
    pub const fn is_fatal_breach(&self) -> bool {
        !self.passed && self.abort_on_fail
    }
}

/// Metric name to assertions, in metric-name order.
#[derive(Debug, Clone, Default)]
pub struct ThresholdSet {
    entries: BTreeMap<String, Vec<Threshold>>,
}

impl ThresholdSet {
    /// Replace every threshold configured for `metric`.
    ///
    /// # Errors
    ///
    /// Returns an error when the metric is not a built-in metric or
    /// submetric, when an expression is malformed, or when its aggregation
    /// cannot be computed for that kind of metric.
    pub fn insert<E>(&mut self, metric: &str, expressions: &[E]) -> Result<(), ConfigError>
    where
        E: AsRef<str>,
    {
        let metric_key: String = metric.chars().filter(|ch| !ch.is_whitespace()).collect();
        let invalid = |source| ConfigError::InvalidThreshold {
            metric: metric_key.clone(),
            source,
        };
        let kind = metric_kind(&metric_key).ok_or_else(|| {
            invalid(ValidationError::UnknownMetric {
                metric: metric_key.clone(),
            })
        })?;
        let thresholds = expressions
            .iter()
            .map(|expression| {
                let threshold = Threshold::parse(expression.as_ref()).map_err(&invalid)?;
                if !threshold.expr.aggregation.applies_to(kind) {
                    return Err(invalid(ValidationError::AggregationMismatch {
                        metric: metric_key.clone(),
                        expression: threshold.source,
                        kind: kind.as_str(),
                    }));
                }
                Ok(threshold)
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.entries.insert(metric_key, thresholds);
        Ok(())
    }

    pub fn push(&mut self, metric: &str, threshold: Threshold) {
        self.entries
            .entry(metric.to_owned())
            .or_default()
            .push(threshold);
    }

    #[must_use]
    pub fn with_abort_on_fail(mut self, abort_on_fail: bool) -> Self {
        for threshold in self.entries.values_mut().flatten() {
            threshold.abort_on_fail = abort_on_fail;
        }
        self
    }

    #[must_use]
    pub fn get(&self, metric: &str) -> Option<&[Threshold]> {
        self.entries.get(metric).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Threshold])> {
        self.entries
            .iter()
            .map(|(metric, thresholds)| (metric.as_str(), thresholds.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn evaluate(&self, snapshot: &MetricsSnapshot) -> Vec<ThresholdOutcome> {
        self.iter()
            .flat_map(|(metric, thresholds)| {
                thresholds.iter().map(move |threshold| {
                    let observed = observe(snapshot, metric, threshold.expr.aggregation);
                    let passed = observed.is_none_or(|value| {
                        threshold.expr.comparison.holds(value, threshold.expr.bound)
                    });
                    ThresholdOutcome {
                        metric: metric.to_owned(),
                        expression: threshold.source.clone(),
                        observed,
                        passed,
                        abort_on_fail: threshold.abort_on_fail,
                    }
                })
            })
            .collect()
    }
}

fn observe(snapshot: &MetricsSnapshot, metric: &str, aggregation: Aggregation) -> Option<f64> {
    if let Some(hist) = snapshot.trend(metric).filter(|hist| hist.count() > 0) {
        return match aggregation {
            Aggregation::Percentile(percentile) => Some(hist.percentile(percentile) as f64),
            Aggregation::Avg => Some(hist.mean()),
            Aggregation::Med => Some(hist.percentile(50.0) as f64),
            Aggregation::Min => Some(hist.min() as f64),
            Aggregation::Max => Some(hist.max() as f64),
            Aggregation::Count => Some(hist.count() as f64),
            Aggregation::Rate => None,
        };
    }
    if let Some(counts) = snapshot.rate(metric).filter(|counts| counts.total > 0) {
        return match aggregation {
            Aggregation::Rate => Some(counts.rate()),
            Aggregation::Count => Some(counts.passes as f64),
            Aggregation::Percentile(_)
            | Aggregation::Avg
            | Aggregation::Med
            | Aggregation::Min
            | Aggregation::Max => None,
        };
    }
    let count = snapshot.counter(metric).filter(|count| *count > 0)?;
    match aggregation {
        Aggregation::Count => Some(count as f64),
        Aggregation::Rate => {
            let secs = snapshot.elapsed.as_secs_f64();
            (secs > 0.0).then(|| count as f64 / secs)
        }
        Aggregation::Percentile(_)
        | Aggregation::Avg
        | Aggregation::Med
        | Aggregation::Min
        | Aggregation::Max => None,
    }
}
