//! Ordered shape predicates behind the resolver.
//!
//! Each rule inspects an already unwrapped value. [`SHAPE_RULES`] is walked
//! top to bottom and the first rule that matches decides the kind, so the
//! table order is part of the contract.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};

use crate::catalog::unwrap_envelope;
use crate::config::ResolverThresholds;

use super::RepresentationKind;

pub struct ShapeRule {
    pub name: &'static str,
    pub kind: RepresentationKind,
    /// The value is contradictory and this rule is a safe fallback for it.
    pub degraded: bool,
    pub matches: fn(&Value, &ResolverThresholds) -> bool,
}

const fn rule(
    name: &'static str,
    kind: RepresentationKind,
    matches: fn(&Value, &ResolverThresholds) -> bool,
) -> ShapeRule {
    ShapeRule {
        name,
        kind,
        degraded: false,
        matches,
    }
}

pub static SHAPE_RULES: &[ShapeRule] = &[
    rule("null", RepresentationKind::ShortLabel, |value, _| value.is_null()),
    rule("boolean", RepresentationKind::Boolean, |value, _| value.is_boolean()),
    rule("number", RepresentationKind::Numeric, |value, _| value.is_number()),
    rule("image-reference", RepresentationKind::VisualAsset, |value, _| {
        value.as_str().is_some_and(looks_like_image)
    }),
    rule("date-string", RepresentationKind::TimelinePoint, |value, _| {
        value.as_str().is_some_and(looks_like_date)
    }),
    rule("long-text", RepresentationKind::Paragraph, |value, thresholds| {
        value.as_str().is_some_and(|text| {
            text.contains('\n') || text.chars().count() > thresholds.short_label_max_chars
        })
    }),
    rule("single-tag", RepresentationKind::TagSet, |value, thresholds| {
        value
            .as_str()
            .is_some_and(|text| text.chars().count() < thresholds.tag_max_chars)
    }),
    rule("short-text", RepresentationKind::ShortLabel, |value, _| value.is_string()),
    rule("empty-sequence", RepresentationKind::KeyValueTable, |value, _| {
        value.as_array().is_some_and(Vec::is_empty)
    }),
    rule("short-string-list", RepresentationKind::TagSet, is_tag_list),
    rule("text-list", RepresentationKind::ParagraphList, |value, _| {
        items(value).is_some_and(|items| items.iter().all(|item| item.is_string()))
    }),
    rule("numeric-series", RepresentationKind::Sparkline, |value, thresholds| {
        items(value).is_some_and(|items| {
            (thresholds.sparkline_min_items..=thresholds.sparkline_max_items)
                .contains(&items.len())
                && items.iter().all(|item| is_number(item))
        })
    }),
    rule("numeric-list", RepresentationKind::List, |value, _| {
        items(value).is_some_and(|items| items.iter().all(|item| is_number(item)))
    }),
    rule("boolean-list", RepresentationKind::List, |value, _| {
        items(value).is_some_and(|items| items.iter().all(|item| item.is_boolean()))
    }),
    rule("coordinate-list", RepresentationKind::GeoPoints, |value, _| {
        every_object(value, |_, map| has_coordinates(map))
    }),
    rule("stage-timeline", RepresentationKind::Timeline, |value, _| {
        every_object(value, |_, map| {
            find_number(map, DAY_KEYS).is_some() && find_scalar(map, STAGE_KEYS)
        })
    }),
    rule("radar-series", RepresentationKind::RadarProfile, |value, thresholds| {
        every_object(value, |count, map| {
            (thresholds.radar_min_items..=thresholds.radar_max_items).contains(&count)
                && find_scalar(map, CATEGORY_KEYS)
                && find_number(map, MAGNITUDE_KEYS).is_some()
        })
    }),
    rule("share-series", RepresentationKind::PieSeries, |value, thresholds| {
        every_object(value, |count, map| {
            (thresholds.pie_min_items..=thresholds.pie_max_items).contains(&count)
                && (find_scalar(map, CATEGORY_KEYS) || find_scalar(map, LABEL_KEYS))
                && find_number(map, SHARE_KEYS).is_some()
        })
    }),
    rule("amount-series", RepresentationKind::BarSeries, |value, thresholds| {
        every_object(value, |count, map| {
            (thresholds.bar_min_items..=thresholds.bar_max_items).contains(&count)
                && find_scalar(map, LABEL_KEYS)
                && find_number(map, AMOUNT_KEYS).is_some()
        })
    }),
    rule("object-list", RepresentationKind::NestedGroupList, |value, _| {
        items(value).is_some_and(|items| items.iter().any(|item| item.is_object()))
    }),
    rule("mixed-list", RepresentationKind::List, |value, _| value.is_array()),
    rule("date-mapping", RepresentationKind::TimelinePoint, |value, _| {
        value.as_object().is_some_and(is_date_mapping)
    }),
    rule("coordinate-mapping", RepresentationKind::GeoPoints, |value, _| {
        value.as_object().is_some_and(has_coordinates)
    }),
    ShapeRule {
        name: "inverted-range",
        kind: RepresentationKind::KeyValueTable,
        degraded: true,
        matches: |value, _| range_bounds(value).is_some_and(|(min, max)| min > max),
    },
    rule("bounded-range", RepresentationKind::BoundedRange, |value, _| {
        range_bounds(value).is_some()
    }),
    rule("range-group", RepresentationKind::NestedGroup, |value, _| {
        value.as_object().is_some_and(|map| {
            !map.is_empty()
                && map
                    .values()
                    .all(|child| range_bounds(unwrap_envelope(child)).is_some())
        })
    }),
    rule("progress", RepresentationKind::NumericProgress, |value, _| {
        value.as_object().is_some_and(|map| {
            let value_of_max = find_number(map, &["value"]).is_some()
                && find_number(map, &["max"]).is_some();
            value_of_max || find_number(map, PERCENT_KEYS).is_some()
        })
    }),
    rule("radar-mapping", RepresentationKind::RadarProfile, |value, thresholds| {
        value.as_object().is_some_and(|map| {
            (thresholds.radar_min_items..=thresholds.radar_max_items).contains(&map.len())
                && map.values().all(|child| {
                    number(unwrap_envelope(child))
                        .is_some_and(|n| (0.0..=thresholds.radar_max_value).contains(&n))
                })
        })
    }),
    rule("compact-table", RepresentationKind::KeyValueTable, |value, thresholds| {
        value.as_object().is_some_and(|map| {
            map.len() <= thresholds.table_max_keys
                && map.values().all(|child| {
                    let child = unwrap_envelope(child);
                    is_scalar(child) || range_bounds(child).is_some()
                })
        })
    }),
    rule("nested-mapping", RepresentationKind::NestedGroup, |value, _| value.is_object()),
];

const LAT_KEYS: &[&str] = &["lat", "latitude"];
const LNG_KEYS: &[&str] = &["lng", "lon", "long", "longitude"];
const DAY_KEYS: &[&str] = &["day", "days", "dayOffset", "day_offset", "offset", "week"];
const STAGE_KEYS: &[&str] = &["stage", "phase", "event", "milestone"];
const CATEGORY_KEYS: &[&str] = &["category", "axis", "attribute", "trait", "dimension"];
const MAGNITUDE_KEYS: &[&str] = &["magnitude", "score", "level", "intensity", "value"];
const SHARE_KEYS: &[&str] = &["share", "percentage", "percent", "proportion", "fraction"];
const LABEL_KEYS: &[&str] = &["label", "name", "item"];
const AMOUNT_KEYS: &[&str] = &["amount", "count", "quantity", "total", "value"];
const PERCENT_KEYS: &[&str] = &["percentage", "percent", "pct"];
const DATE_KEYS: &[&str] = &["date", "datetime", "timestamp"];

const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".avif", ".bmp",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %B %Y", "%B %d, %Y", "%d %b %Y", "%b %d, %Y"];
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

fn items(value: &Value) -> Option<Vec<&Value>> {
    value
        .as_array()
        .filter(|items| !items.is_empty())
        .map(|items| items.iter().map(unwrap_envelope).collect())
}

fn every_object(value: &Value, check: impl Fn(usize, &Map<String, Value>) -> bool) -> bool {
    let Some(items) = items(value) else {
        return false;
    };
    let count = items.len();
    items
        .iter()
        .all(|item| item.as_object().is_some_and(|map| check(count, map)))
}

fn is_tag_list(value: &Value, thresholds: &ResolverThresholds) -> bool {
    let Some(items) = items(value) else {
        return false;
    };
    let Some(texts) = items.iter().map(|item| item.as_str()).collect::<Option<Vec<_>>>() else {
        return false;
    };

    let lengths = texts.iter().map(|text| text.chars().count()).collect::<Vec<_>>();
    let average = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    let small_and_short = lengths.len() <= thresholds.tag_list_small_count
        && lengths
            .iter()
            .all(|&length| length < thresholds.tag_list_small_item_chars);

    average <= thresholds.tag_list_avg_chars || small_and_short
}

fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn is_number(value: &Value) -> bool {
    number(value).is_some()
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn field<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| keys.iter().any(|candidate| key.eq_ignore_ascii_case(candidate)))
        .map(|(_, value)| unwrap_envelope(value))
}

fn find_number(map: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    field(map, keys).and_then(number)
}

fn find_scalar(map: &Map<String, Value>, keys: &[&str]) -> bool {
    field(map, keys).is_some_and(|value| is_scalar(value) && !value.is_null())
}

fn has_coordinates(map: &Map<String, Value>) -> bool {
    find_number(map, LAT_KEYS).is_some() && find_number(map, LNG_KEYS).is_some()
}

fn is_date_mapping(map: &Map<String, Value>) -> bool {
    let calendar = find_number(map, &["year"]).is_some()
        && field(map, &["month"]).is_some_and(|month| is_scalar(month) && !month.is_null());
    let dated = map.len() <= 3
        && field(map, DATE_KEYS)
            .and_then(Value::as_str)
            .is_some_and(looks_like_date);
    calendar || dated
}

/// `(min, max)` of a mapping carrying numeric `min` and `max` keys.
pub fn range_bounds(value: &Value) -> Option<(f64, f64)> {
    let map = value.as_object()?;
    Some((find_number(map, &["min"])?, find_number(map, &["max"])?))
}

pub fn looks_like_image(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.contains(char::is_whitespace) {
        return false;
    }

    let lower = text.to_ascii_lowercase();
    if lower.starts_with("data:image/") {
        return true;
    }

    let path = lower.split(['?', '#']).next().unwrap_or(&lower);
    IMAGE_EXTENSIONS.iter().any(|extension| path.ends_with(extension))
}

pub fn looks_like_date(text: &str) -> bool {
    let text = text.trim();
    if text.len() < 8 || text.len() > 40 || !text.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    DateTime::parse_from_rfc3339(text).is_ok()
        || DATE_FORMATS
            .iter()
            .any(|format| NaiveDate::parse_from_str(text, format).is_ok())
        || DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(text, format).is_ok())
}

/// Axis/magnitude pairs of a radar-shaped mapping or sequence, in the order
/// the mapping or sequence yields them.
pub fn radar_axes(value: &Value) -> Vec<(String, f64)> {
    match unwrap_envelope(value) {
        Value::Object(map) => map
            .iter()
            .filter_map(|(key, child)| number(unwrap_envelope(child)).map(|n| (key.clone(), n)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let map = unwrap_envelope(item).as_object()?;
                let axis = field(map, CATEGORY_KEYS).and_then(Value::as_str)?;
                Some((axis.to_owned(), find_number(map, MAGNITUDE_KEYS)?))
            })
            .collect(),
        _ => Vec::new(),
    }
}
