//! Conjunctive cohort filters over sample metadata.

use crate::data::SampleMeta;
use crate::error::{FreqError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A metadata attribute that a cohort filter can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CohortAttribute {
    Project,
    Indication,
    Treatment,
    Response,
    Gender,
    SampleType,
    TimeFromTreatmentStart,
}

impl CohortAttribute {
    /// All filterable attributes.
    pub const ALL: [CohortAttribute; 7] = [
        CohortAttribute::Project,
        CohortAttribute::Indication,
        CohortAttribute::Treatment,
        CohortAttribute::Response,
        CohortAttribute::Gender,
        CohortAttribute::SampleType,
        CohortAttribute::TimeFromTreatmentStart,
    ];

    /// Column name used in configs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Indication => "indication",
            Self::Treatment => "treatment",
            Self::Response => "response",
            Self::Gender => "gender",
            Self::SampleType => "sample_type",
            Self::TimeFromTreatmentStart => "time_from_treatment_start",
        }
    }

    /// Whether values of this attribute are integers.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::TimeFromTreatmentStart)
    }
}

impl fmt::Display for CohortAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CohortAttribute {
    type Err = FreqError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.name() == key)
            .ok_or_else(|| FreqError::UnknownAttribute(s.to_string()))
    }
}

/// The value a filter requires for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
}

impl FilterValue {
    /// Coerce a raw value to the type of `attribute`.
    fn for_attribute(attribute: CohortAttribute, value: FilterValue) -> Result<Self> {
        match (attribute.is_integer(), value) {
            (true, FilterValue::Integer(v)) => Ok(FilterValue::Integer(v)),
            (true, FilterValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(FilterValue::Integer)
                .map_err(|_| {
                    FreqError::InvalidParameter(format!(
                        "Filter value '{}' for '{}' is not an integer",
                        s, attribute
                    ))
                }),
            (false, FilterValue::Integer(v)) => Ok(FilterValue::Text(v.to_string())),
            (false, FilterValue::Text(s)) => Ok(FilterValue::Text(s)),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(s) => Some(s),
            FilterValue::Integer(_) => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Integer(v) => write!(f, "{}", v),
            FilterValue::Text(s) => f.write_str(s),
        }
    }
}

/// A conjunction of equality predicates on sample metadata.
///
/// An empty filter matches every sample. Predicates are kept in a sorted map
/// so two filters with the same predicates compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<CohortAttribute, FilterValue>",
    into = "BTreeMap<CohortAttribute, FilterValue>"
)]
pub struct CohortFilter {
    predicates: BTreeMap<CohortAttribute, FilterValue>,
}

impl CohortFilter {
    /// A filter that matches every sample.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the required value for an attribute.
    pub fn with(mut self, attribute: CohortAttribute, value: impl Into<String>) -> Result<Self> {
        let value = FilterValue::for_attribute(attribute, FilterValue::Text(value.into()))?;
        self.predicates.insert(attribute, value);
        Ok(self)
    }

    /// Add a predicate whose value already has the attribute's type: text for
    /// text attributes, an integer for `time_from_treatment_start`.
    pub(crate) fn require(mut self, attribute: CohortAttribute, value: FilterValue) -> Self {
        debug_assert_eq!(
            attribute.is_integer(),
            matches!(value, FilterValue::Integer(_))
        );
        self.predicates.insert(attribute, value);
        self
    }

    /// Parse `attribute=value` pairs, as given on the command line.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut filter = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                FreqError::InvalidParameter(format!(
                    "Filter '{}' must have the form attribute=value",
                    pair
                ))
            })?;
            filter = filter.with(key.parse()?, value.trim())?;
        }
        Ok(filter)
    }

    /// Whether the filter has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Required value for an attribute, if constrained.
    pub fn get(&self, attribute: CohortAttribute) -> Option<&FilterValue> {
        self.predicates.get(&attribute)
    }

    /// Iterate predicates in attribute order.
    pub fn iter(&self) -> impl Iterator<Item = (CohortAttribute, &FilterValue)> + '_ {
        self.predicates.iter().map(|(a, v)| (*a, v))
    }

    /// Check whether a sample satisfies every predicate.
    pub fn matches(&self, meta: &SampleMeta) -> bool {
        self.predicates.iter().all(|(attribute, value)| {
            let text = value.as_text();
            match attribute {
                CohortAttribute::Project => text == Some(meta.project_id.as_str()),
                CohortAttribute::Indication => text == Some(meta.indication.as_str()),
                CohortAttribute::Treatment => text == Some(meta.treatment.as_str()),
                CohortAttribute::Response => {
                    text.is_some() && text == meta.response.as_deref()
                }
                CohortAttribute::Gender => text == Some(meta.gender.as_str()),
                CohortAttribute::SampleType => text == Some(meta.sample_type.as_str()),
                CohortAttribute::TimeFromTreatmentStart => {
                    *value == FilterValue::Integer(meta.time_from_treatment_start)
                }
            }
        })
    }
}

impl TryFrom<BTreeMap<CohortAttribute, FilterValue>> for CohortFilter {
    type Error = FreqError;

    fn try_from(raw: BTreeMap<CohortAttribute, FilterValue>) -> Result<Self> {
        let predicates = raw
            .into_iter()
            .map(|(a, v)| FilterValue::for_attribute(a, v).map(|v| (a, v)))
            .collect::<Result<_>>()?;
        Ok(Self { predicates })
    }
}

impl From<CohortFilter> for BTreeMap<CohortAttribute, FilterValue> {
    fn from(filter: CohortFilter) -> Self {
        filter.predicates
    }
}

impl fmt::Display for CohortFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.predicates.is_empty() {
            return f.write_str("<all samples>");
        }
        let parts: Vec<String> = self
            .predicates
            .iter()
            .map(|(a, v)| format!("{}={}", a, v))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::metadata::tests::sample;

    #[test]
    fn test_empty_filter_matches_all() {
        let filter = CohortFilter::new();
        assert!(filter.matches(&sample("S1", "sbj1", None)));
    }

    #[test]
    fn test_conjunction() {
        let filter = CohortFilter::new()
            .with(CohortAttribute::Indication, "melanoma")
            .unwrap()
            .with(CohortAttribute::SampleType, "PBMC")
            .unwrap();
        let mut meta = sample("S1", "sbj1", Some("yes"));
        assert!(filter.matches(&meta));

        meta.sample_type = "WB".to_string();
        assert!(!filter.matches(&meta));
    }

    #[test]
    fn test_response_requires_present_label() {
        let filter = CohortFilter::new()
            .with(CohortAttribute::Response, "yes")
            .unwrap();
        assert!(filter.matches(&sample("S1", "sbj1", Some("yes"))));
        assert!(!filter.matches(&sample("S2", "sbj2", Some("no"))));
        assert!(!filter.matches(&sample("S3", "sbj3", None)));
    }

    #[test]
    fn test_integer_attribute() {
        let filter = CohortFilter::parse_pairs(&["time_from_treatment_start=0"]).unwrap();
        let mut meta = sample("S1", "sbj1", None);
        assert!(filter.matches(&meta));
        meta.time_from_treatment_start = 7;
        assert!(!filter.matches(&meta));

        assert!(CohortFilter::parse_pairs(&["time_from_treatment_start=day0"]).is_err());
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = CohortFilter::parse_pairs(&["tissue=lung"]).unwrap_err();
        assert!(err.is_input_shape());
    }

    #[test]
    fn test_malformed_pair_rejected() {
        assert!(CohortFilter::parse_pairs(&["indication"]).is_err());
    }

    #[test]
    fn test_yaml_coerces_types() {
        let yaml = "indication: melanoma\ntime_from_treatment_start: '0'\n";
        let filter: CohortFilter = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            filter.get(CohortAttribute::TimeFromTreatmentStart),
            Some(&FilterValue::Integer(0))
        );
        assert_eq!(filter.to_string(), "indication=melanoma, time_from_treatment_start=0");
    }

    #[test]
    fn test_equal_filters_compare_equal() {
        let a = CohortFilter::parse_pairs(&["gender=M", "indication=melanoma"]).unwrap();
        let b = CohortFilter::parse_pairs(&["indication=melanoma", "gender=M"]).unwrap();
        assert_eq!(a, b);
    }
}
