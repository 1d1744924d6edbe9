use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual treatment chosen for a field value. Always derived from the value's
/// shape, never stored alongside the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepresentationKind {
    TagSet,
    ShortLabel,
    Paragraph,
    ParagraphList,
    Numeric,
    NumericProgress,
    Boolean,
    BoundedRange,
    KeyValueTable,
    RadarProfile,
    BarSeries,
    PieSeries,
    Sparkline,
    List,
    Timeline,
    TimelinePoint,
    GeoPoints,
    NestedGroup,
    NestedGroupList,
    VisualAsset,
}

impl RepresentationKind {
    pub const ALL: [Self; 20] = [
        Self::TagSet,
        Self::ShortLabel,
        Self::Paragraph,
        Self::ParagraphList,
        Self::Numeric,
        Self::NumericProgress,
        Self::Boolean,
        Self::BoundedRange,
        Self::KeyValueTable,
        Self::RadarProfile,
        Self::BarSeries,
        Self::PieSeries,
        Self::Sparkline,
        Self::List,
        Self::Timeline,
        Self::TimelinePoint,
        Self::GeoPoints,
        Self::NestedGroup,
        Self::NestedGroupList,
        Self::VisualAsset,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::TagSet => "tag-set",
            Self::ShortLabel => "short-label",
            Self::Paragraph => "paragraph",
            Self::ParagraphList => "paragraph-list",
            Self::Numeric => "numeric",
            Self::NumericProgress => "numeric-progress",
            Self::Boolean => "boolean",
            Self::BoundedRange => "bounded-range",
            Self::KeyValueTable => "key-value-table",
            Self::RadarProfile => "radar-profile",
            Self::BarSeries => "bar-series",
            Self::PieSeries => "pie-series",
            Self::Sparkline => "sparkline",
            Self::List => "list",
            Self::Timeline => "timeline",
            Self::TimelinePoint => "timeline-point",
            Self::GeoPoints => "geo-points",
            Self::NestedGroup => "nested-group",
            Self::NestedGroupList => "nested-group-list",
            Self::VisualAsset => "visual-asset",
        }
    }

    pub fn is_chart_like(self) -> bool {
        matches!(
            self,
            Self::RadarProfile
                | Self::BarSeries
                | Self::PieSeries
                | Self::Sparkline
                | Self::Timeline
                | Self::GeoPoints
        )
    }

    pub fn is_range_like(self) -> bool {
        matches!(self, Self::BoundedRange | Self::NumericProgress)
    }

    /// Kinds the flattener never lifts out of a parent group.
    pub fn is_container(self) -> bool {
        matches!(self, Self::NestedGroup | Self::NestedGroupList | Self::List)
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_names_match_labels() {
        for kind in RepresentationKind::ALL {
            let encoded = serde_json::to_string(&kind).expect("kind serializes");
            assert_eq!(encoded, format!("\"{}\"", kind.label()));
        }
    }
}
