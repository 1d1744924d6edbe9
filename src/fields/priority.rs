use super::RepresentationKind;

const SAFETY_BOOST: i32 = 100;
const IDENTITY_BOOST: i32 = 60;
const VISUAL_BOOST: i32 = 20;
const MORPHOLOGY_BOOST: i32 = 25;
const HABITAT_BOOST: i32 = 15;
const PRACTICAL_BOOST: i32 = 10;
const DESCRIPTIVE_BOOST: i32 = 5;
const TAXONOMY_PENALTY: i32 = -20;
const METADATA_PENALTY: i32 = -1000;

/// Extra weight the flattener adds to entries it lifts out of a nested group.
pub const PROMOTED_BOOST: i32 = 15;

// Token prefixes; a token matches when it starts with one of these.
const SAFETY_WORDS: &[&str] = &[
    "safe", "edib", "toxic", "toxin", "poison", "danger", "hazard", "warning", "allerg",
    "lethal", "deadly", "caution",
];
const IDENTITY_WORDS: &[&str] = &["name", "title"];
const MORPHOLOGY_WORDS: &[&str] = &[
    "color", "colour", "shape", "size", "temperature", "range", "height", "width", "length",
    "diameter", "texture", "smell", "odor", "odour", "spore", "gill", "cap", "stem", "leaf",
    "flower", "fruit", "bark", "identif", "feature",
];
const HABITAT_WORDS: &[&str] = &[
    "habitat", "location", "region", "distribution", "ecolog", "substrate", "climate",
    "native", "geo", "elevation", "soil",
];
const PRACTICAL_WORDS: &[&str] = &[
    "culinar", "cook", "recipe", "medicin", "cultivat", "grow", "harvest", "preparation",
    "storage", "use",
];
const DESCRIPTIVE_WORDS: &[&str] = &["descri", "summary", "overview", "appearance", "note"];
const TAXONOMY_WORDS: &[&str] = &[
    "taxonom", "kingdom", "phylum", "division", "class", "order", "family", "genus",
    "scientific", "synonym", "research", "citation", "reference", "study",
];
// Metadata tokens must match whole.
const METADATA_TOKENS: &[&str] = &[
    "id", "uuid", "created", "updated", "modified", "timestamp", "version", "revision", "rev",
    "etag", "internal",
];

fn base_score(kind: RepresentationKind) -> i32 {
    use RepresentationKind::*;

    match kind {
        RadarProfile => 60,
        BarSeries | PieSeries => 58,
        Sparkline | BoundedRange => 55,
        GeoPoints => 50,
        Timeline => 48,
        NumericProgress => 45,
        Numeric => 40,
        TagSet | KeyValueTable => 35,
        Boolean | ShortLabel => 30,
        List => 28,
        VisualAsset => 25,
        ParagraphList => 18,
        Paragraph => 15,
        NestedGroupList => 12,
        NestedGroup | TimelinePoint => 10,
    }
}

/// Splits a field path into lowercase word tokens across dots, separators and
/// camelCase boundaries: `growth.minTemp_c` → `growth`, `min`, `temp`, `c`.
pub fn path_tokens(path: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for ch in path.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }

        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn mentions(tokens: &[String], prefixes: &[&str]) -> bool {
    tokens
        .iter()
        .any(|token| prefixes.iter().any(|prefix| token.starts_with(prefix)))
}

/// Ordering score for a directive. Depends only on the field path and the
/// resolved kind; never influences which kind is chosen.
pub fn priority(path: &str, kind: RepresentationKind) -> i32 {
    let tokens = path_tokens(path);
    let mut score = base_score(kind);

    if mentions(&tokens, SAFETY_WORDS) {
        score += SAFETY_BOOST;
    }
    if mentions(&tokens, IDENTITY_WORDS) {
        score += IDENTITY_BOOST;
    }
    if kind.is_chart_like() || kind.is_range_like() {
        score += VISUAL_BOOST;
    }
    if mentions(&tokens, MORPHOLOGY_WORDS) {
        score += MORPHOLOGY_BOOST;
    }
    if mentions(&tokens, HABITAT_WORDS) {
        score += HABITAT_BOOST;
    }
    if mentions(&tokens, PRACTICAL_WORDS) {
        score += PRACTICAL_BOOST;
    }
    if mentions(&tokens, DESCRIPTIVE_WORDS) {
        score += DESCRIPTIVE_BOOST;
    }
    if mentions(&tokens, TAXONOMY_WORDS) {
        score += TAXONOMY_PENALTY;
    }
    if tokens
        .iter()
        .any(|token| METADATA_TOKENS.contains(&token.as_str()))
    {
        score += METADATA_PENALTY;
    }
    score
}
