use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const BUSINESS_NAME: &str = "Business_Name";
pub const GROWTH_RATE: &str = "Growth_Rate (%)";
pub const REVENUE_GROWTH_RATE: &str = "Revenue_Growth_Rate";
pub const ASSET_GROWTH_RATE: &str = "Asset_Growth_Rate";
pub const LOAN_DEPENDENCY_RATIO: &str = "Loan_Dependency_Ratio";

/// One business row as returned by the service, key order preserved.
///
/// Only the named metrics have accessors; every other field rides along
/// untouched so exports reproduce what the service sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrowthRecord {
    fields: Map<String, Value>,
}

impl GrowthRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn business_name(&self) -> Option<&str> {
        self.fields
            .get(BUSINESS_NAME)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Read `key` as a finite number. Numeric strings are accepted.
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    pub fn growth_rate(&self) -> Option<f64> {
        self.number(GROWTH_RATE)
    }

    pub fn revenue_growth_rate(&self) -> Option<f64> {
        self.number(REVENUE_GROWTH_RATE)
    }

    pub fn asset_growth_rate(&self) -> Option<f64> {
        self.number(ASSET_GROWTH_RATE)
    }

    pub fn loan_dependency_ratio(&self) -> Option<f64> {
        self.number(LOAN_DEPENDENCY_RATIO)
    }
}

impl From<Map<String, Value>> for GrowthRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Rows whose growth rate is strictly above the threshold, in dataset order.
pub type FilteredView<'a> = Vec<&'a GrowthRecord>;

/// Scalars shown above the dashboard charts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub avg_growth: f64,
}

impl Summary {
    pub fn avg_growth_display(&self) -> String {
        format!("{:.2}", self.avg_growth)
    }
}

/// Select the rows above `threshold` and compute their count and mean growth.
///
/// Rows without a readable growth rate never pass. An empty selection yields
/// a zero summary.
pub fn filter_and_summarize(
    dataset: &[GrowthRecord],
    threshold: f64,
) -> (FilteredView<'_>, Summary) {
    let mut total = 0.0;
    let view: FilteredView<'_> = dataset
        .iter()
        .filter(|record| match record.growth_rate() {
            Some(rate) if rate > threshold => {
                total += rate;
                true
            }
            _ => false,
        })
        .collect();

    let count = view.len();
    let avg_growth = if count == 0 {
        0.0
    } else {
        total / count as f64
    };

    (view, Summary { count, avg_growth })
}

/// The most recent processed dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<GrowthRecord>,
}

impl Dataset {
    pub fn new(records: Vec<GrowthRecord>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Swap in a freshly fetched dataset. Nothing is merged.
    pub fn replace(&mut self, records: Vec<GrowthRecord>) {
        self.records = records;
        log::info!("dataset replaced with {} records", self.records.len());
    }

    pub fn filter_and_summarize(&self, threshold: f64) -> (FilteredView<'_>, Summary) {
        filter_and_summarize(&self.records, threshold)
    }
}
