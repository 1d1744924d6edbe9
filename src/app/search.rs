use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use taxon_lens::Catalog;
use taxon_lens::config::CatalogSchema;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

pub(super) fn search_catalog(catalog: &Catalog, schema: &CatalogSchema, query: &str) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = catalog
        .iter()
        .filter_map(|record| {
            let label = fuzzy_match_score(&matcher, &record.label(schema), query);
            let id = fuzzy_match_score(&matcher, record.id(), query);
            label.max(id).map(|score| (score, record.id().to_owned()))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use taxon_lens::Record;

    use super::*;

    fn catalog() -> Catalog {
        let records = [
            ("cantharellus-cibarius", "Golden Chanterelle"),
            ("amanita-phalloides", "Death Cap"),
            ("boletus-edulis", "Porcini"),
        ]
        .into_iter()
        .map(|(id, name)| {
            let fields = json!({ "name": name }).as_object().cloned().unwrap_or_default();
            Record::new(id, fields)
        })
        .collect();
        Catalog::new(records)
    }

    #[test]
    fn matches_labels_and_ids_case_insensitively() {
        let schema = CatalogSchema::default();
        assert_eq!(
            search_catalog(&catalog(), &schema, "chanter"),
            vec!["cantharellus-cibarius".to_owned()]
        );
        assert_eq!(
            search_catalog(&catalog(), &schema, "BOLETUS"),
            vec!["boletus-edulis".to_owned()]
        );
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(search_catalog(&catalog(), &CatalogSchema::default(), "   ").is_empty());
    }
}
