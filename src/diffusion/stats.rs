//! Per-iteration convergence statistics.

/// Statistics of a single-channel grid after one iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrayStats {
    /// Mean intensity
    pub mean: f64,
    /// Population variance of the intensity
    pub variance: f64,
    /// Sum of the gradient magnitude over the grid
    pub gradient_magnitude: f64,
}

/// Statistics of a multi-channel image after one iteration.
///
/// `means` and `variances` hold one entry per channel, in channel order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelStats {
    pub means: Vec<f64>,
    pub variances: Vec<f64>,
    /// Sum of the combined (channel-summed) gradient magnitude
    pub gradient_magnitude: f64,
}

/// Anything recorded once per iteration that carries a total gradient magnitude.
pub trait IterationRecord {
    fn gradient_magnitude(&self) -> f64;
}

impl IterationRecord for GrayStats {
    fn gradient_magnitude(&self) -> f64 {
        self.gradient_magnitude
    }
}

impl IterationRecord for ChannelStats {
    fn gradient_magnitude(&self) -> f64 {
        self.gradient_magnitude
    }
}

/// Append-only sequence of per-iteration records.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatisticsHistory<R> {
    records: Vec<R>,
}

impl<R> StatisticsHistory<R> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: R) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&R> {
        self.records.last()
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R: IterationRecord> StatisticsHistory<R> {
    /// Total gradient magnitude per iteration.
    pub fn gradient_magnitudes(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.gradient_magnitude()).collect()
    }
}

impl StatisticsHistory<GrayStats> {
    pub fn means(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.mean).collect()
    }

    pub fn variances(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.variance).collect()
    }
}

impl StatisticsHistory<ChannelStats> {
    /// Mean of `channel` per iteration. Empty if the channel does not exist.
    pub fn channel_means(&self, channel: usize) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.means.get(channel).copied())
            .collect()
    }

    /// Variance of `channel` per iteration. Empty if the channel does not exist.
    pub fn channel_variances(&self, channel: usize) -> Vec<f64> {
        self.records
            .iter()
            .filter_map(|r| r.variances.get(channel).copied())
            .collect()
    }

    pub fn channels(&self) -> usize {
        self.records.first().map_or(0, |r| r.means.len())
    }
}

impl<'a, R> IntoIterator for &'a StatisticsHistory<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
