use super::growth::GrowthRecord;

/// Per-business metrics plotted as bar panels on the dashboard.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Metric {
    GrowthRate,
    RevenueGrowth,
    AssetGrowth,
    LoanDependency,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::GrowthRate,
        Metric::RevenueGrowth,
        Metric::AssetGrowth,
        Metric::LoanDependency,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::GrowthRate => "Growth Rate (%)",
            Metric::RevenueGrowth => "Revenue Growth Rate",
            Metric::AssetGrowth => "Asset Growth Rate",
            Metric::LoanDependency => "Loan Dependency Ratio",
        }
    }

    pub fn read(self, record: &GrowthRecord) -> Option<f64> {
        match self {
            Metric::GrowthRate => record.growth_rate(),
            Metric::RevenueGrowth => record.revenue_growth_rate(),
            Metric::AssetGrowth => record.asset_growth_rate(),
            Metric::LoanDependency => record.loan_dependency_ratio(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Display label for a row: its business name, else its 1-based position.
pub fn record_label(record: &GrowthRecord, index: usize) -> String {
    record
        .business_name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", index + 1))
}

/// First `limit` rows of `view` that carry `metric`, in view order.
pub fn metric_series(view: &[&GrowthRecord], metric: Metric, limit: usize) -> Vec<SeriesPoint> {
    view.iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            metric.read(record).map(|value| SeriesPoint {
                label: record_label(record, idx),
                value,
            })
        })
        .take(limit)
        .collect()
}

/// Most bins a histogram will hold; rates beyond the last one share it.
pub const MAX_BUCKETS: usize = 24;

/// A histogram bin covering `[lower, upper)`, or `[lower, ∞)` when open-ended.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
    pub open_ended: bool,
}

impl Bucket {
    pub fn label(&self) -> String {
        if self.open_ended {
            format!("≥{:.0}", self.lower)
        } else {
            format!("{:.0}-{:.0}", self.lower, self.upper)
        }
    }
}

/// Bin growth rates into `width`-wide buckets from the lowest occupied
/// bucket upward, keeping empty bins in between. At most [`MAX_BUCKETS`]
/// bins are produced; the last one absorbs everything above it.
pub fn growth_histogram(view: &[&GrowthRecord], width: f64) -> Vec<Bucket> {
    if !(width.is_finite() && width > 0.0) {
        return Vec::new();
    }

    // `as` saturates, so extreme rates land on i64::MIN/MAX instead of wrapping.
    let indices: Vec<i64> = view
        .iter()
        .filter_map(|record| record.growth_rate())
        .map(|rate| (rate / width).floor() as i64)
        .collect();

    let (Some(&min), Some(&max)) = (indices.iter().min(), indices.iter().max()) else {
        return Vec::new();
    };

    let last_slot = MAX_BUCKETS - 1;
    let span = usize::try_from(max.saturating_sub(min)).unwrap_or(usize::MAX);
    let len = span.min(last_slot) + 1;
    let overflow = span > last_slot;

    let mut buckets: Vec<Bucket> = (0..len)
        .map(|slot| {
            let idx = min.saturating_add(slot as i64);
            Bucket {
                lower: idx as f64 * width,
                upper: idx.saturating_add(1) as f64 * width,
                count: 0,
                open_ended: overflow && slot == last_slot,
            }
        })
        .collect();
    for idx in indices {
        let offset = usize::try_from(idx.saturating_sub(min)).unwrap_or(usize::MAX);
        buckets[offset.min(len - 1)].count += 1;
    }
    buckets
}
