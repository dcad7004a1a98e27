//! Derived display metrics.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Display marker for a metric whose denominator is zero.
pub const UNAVAILABLE: &str = "n/a";

/// A single formatted metric.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// Raw counter passed through unchanged
    Count(u32),
    /// Average rounded to an integer
    Integer(i64),
    /// Average rounded to two decimals
    Decimal(f64),
    /// Percentage string, e.g. "12.35%"
    Percent(String),
    /// Denominator was zero
    Unavailable,
}

impl MetricValue {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, MetricValue::Unavailable)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Integer(n) => write!(f, "{}", n),
            MetricValue::Decimal(x) => write!(f, "{}", x),
            MetricValue::Percent(s) => f.write_str(s),
            MetricValue::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MetricValue::Count(n) => serializer.serialize_u32(*n),
            MetricValue::Integer(n) => serializer.serialize_i64(*n),
            MetricValue::Decimal(x) => serializer.serialize_f64(*x),
            MetricValue::Percent(s) => serializer.serialize_str(s),
            MetricValue::Unavailable => serializer.serialize_str(UNAVAILABLE),
        }
    }
}

/// An ordered group of labelled metrics shown together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    entries: Vec<(&'static str, MetricValue)>,
}

impl Card {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a metric. Labels are fixed display keys.
    pub fn with(mut self, label: &'static str, value: MetricValue) -> Self {
        self.entries.push((label, value));
        self
    }

    /// Look up a metric by label.
    pub fn get(&self, label: &str) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &MetricValue)> {
        self.entries.iter().map(|(l, v)| (*l, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Card {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, value) in &self.entries {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// Display categories, in screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Basic,
    WinLoss,
    Riichi,
    Yakus,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Basic,
        Category::WinLoss,
        Category::Riichi,
        Category::Yakus,
    ];

    /// JSON key for this category.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::WinLoss => "winLoss",
            Category::Riichi => "riichi",
            Category::Yakus => "yakus",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// All derived metrics for one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub basic: Vec<Card>,
    pub win_loss: Vec<Card>,
    pub riichi: Vec<Card>,
    pub yakus: Vec<Card>,
}

impl Metrics {
    /// Cards of one category.
    pub fn category(&self, category: Category) -> &[Card] {
        match category {
            Category::Basic => &self.basic,
            Category::WinLoss => &self.win_loss,
            Category::Riichi => &self.riichi,
            Category::Yakus => &self.yakus,
        }
    }

    /// First metric with `label` in `category`.
    ///
    /// Some labels (e.g. `winRate`) appear in more than one category.
    pub fn find(&self, category: Category, label: &str) -> Option<&MetricValue> {
        self.category(category)
            .iter()
            .find_map(|card| card.get(label))
    }

    /// Total number of metrics across every category.
    pub fn len(&self) -> usize {
        Category::ALL
            .iter()
            .flat_map(|&c| self.category(c))
            .map(Card::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_value_display() {
        assert_eq!(MetricValue::Count(12).to_string(), "12");
        assert_eq!(MetricValue::Integer(-350).to_string(), "-350");
        assert_eq!(MetricValue::Decimal(11.25).to_string(), "11.25");
        assert_eq!(
            MetricValue::Percent("25.00%".to_string()).to_string(),
            "25.00%"
        );
        assert_eq!(MetricValue::Unavailable.to_string(), "n/a");
    }

    #[test]
    fn test_metric_value_serialization() {
        let values = vec![
            MetricValue::Count(3),
            MetricValue::Decimal(-1.5),
            MetricValue::Percent("0.00%".to_string()),
            MetricValue::Unavailable,
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[3,-1.5,"0.00%","n/a"]"#);
    }

    #[test]
    fn test_card_serializes_in_insertion_order() {
        let card = Card::new()
            .with("zeta", MetricValue::Count(1))
            .with("alpha", MetricValue::Unavailable);

        let json = serde_json::to_string(&card).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":"n/a"}"#);
        assert_eq!(
            card.iter().map(|(l, _)| l).collect::<Vec<_>>(),
            vec!["zeta", "alpha"]
        );
    }

    #[test]
    fn test_metrics_lookup() {
        let metrics = Metrics {
            basic: vec![Card::new().with("winRate", MetricValue::Unavailable)],
            win_loss: vec![
                Card::new().with("loseRate", MetricValue::Count(0)),
                Card::new().with("winRate", MetricValue::Percent("1.00%".into())),
            ],
            ..Default::default()
        };

        assert_eq!(
            metrics.find(Category::WinLoss, "winRate"),
            Some(&MetricValue::Percent("1.00%".into()))
        );
        assert!(metrics
            .find(Category::Basic, "winRate")
            .unwrap()
            .is_unavailable());
        assert!(metrics.find(Category::Riichi, "winRate").is_none());
        assert_eq!(metrics.len(), 3);
    }

    #[test]
    fn test_metrics_category_keys() {
        let json = serde_json::to_value(Metrics::default()).unwrap();
        for category in Category::ALL {
            assert!(json.get(category.key()).is_some(), "missing {}", category);
        }
    }
}
