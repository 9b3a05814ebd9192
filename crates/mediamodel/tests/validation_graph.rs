//! Recursive validation over a realistic owned object graph.

use mediamodel::prelude::*;
use mediamodel_validate::{NULL_ELEMENT_MESSAGE, NULL_VALUE_MESSAGE, PropertyPath};

struct Title {
    text: Option<String>,
    language_code: Option<String>,
}

struct Release {
    episode_count: Option<i32>,
}

struct Anime {
    romaji_title: Option<String>,
    titles: Option<Vec<Option<Title>>>,
    primary_release: Option<Release>,
    synopsis: Option<String>,
}

impl ValidateOwned for Title {
    fn validate_owned<'e>(&'e self, builder: &mut ValidationBuilder<'e, Self>) {
        builder
            .property("text", self.text.as_ref())
            .rule(|t| !t.is_empty(), "title text may not be empty")
            .rule(|t| t.chars().count() <= 500, "title text too long");
        builder
            .property("language_code", self.language_code.as_ref())
            .rule(|c| c.len() == 2, "language code must be two letters");
    }
}

impl ValidateOwned for Release {
    fn validate_owned<'e>(&'e self, builder: &mut ValidationBuilder<'e, Self>) {
        builder
            .property("episode_count", self.episode_count.as_ref())
            .rule(|n| *n >= 0, "episode count may not be negative");
    }
}

impl ValidateOwned for Anime {
    fn validate_owned<'e>(&'e self, builder: &mut ValidationBuilder<'e, Self>) {
        builder
            .property("romaji_title", self.romaji_title.as_ref())
            .rule(|t| !t.is_empty(), "romaji title may not be empty");
        builder
            .optional_property("synopsis", self.synopsis.as_ref())
            .rule(|s| !s.is_empty(), "synopsis may not be empty when present");
        builder.validate_owned_entities_nullable(
            "titles",
            self.titles.as_deref(),
            |nested| {
                nested.entity().validate_owned(nested);
            },
        );
        builder.validate_owned_entity(
            "primary_release",
            self.primary_release.as_ref(),
            |nested| {
                nested.entity().validate_owned(nested);
            },
        );
    }
}

fn valid_anime() -> Anime {
    Anime {
        romaji_title: Some("Cowboy Bebop".to_string()),
        titles: Some(vec![Some(Title {
            text: Some("カウボーイビバップ".to_string()),
            language_code: Some("ja".to_string()),
        })]),
        primary_release: Some(Release {
            episode_count: Some(26),
        }),
        synopsis: None,
    }
}

#[test]
fn test_valid_graph_produces_no_results() {
    assert!(validate_entity(&valid_anime()).is_empty());
}

#[test]
fn test_missing_required_property_yields_single_result() {
    let mut anime = valid_anime();
    anime.romaji_title = None;

    let results = validate_entity(&anime);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].message(), NULL_VALUE_MESSAGE);
    assert_eq!(results[0].field_id(), "romaji_title");
}

#[test]
fn test_null_slot_and_invalid_sibling_both_reported() {
    let mut anime = valid_anime();
    anime.titles = Some(vec![
        Some(Title {
            text: Some("valid".to_string()),
            language_code: Some("en".to_string()),
        }),
        None,
        Some(Title {
            text: None,
            language_code: Some("x".to_string()),
        }),
    ]);

    let results = validate_entity(&anime);
    let field_ids: Vec<String> = results.iter().map(ValidationResult::field_id).collect();
    assert!(field_ids.contains(&"titles[1]".to_string()));
    assert!(field_ids.contains(&"titles[2].text".to_string()));
    assert!(field_ids.contains(&"titles[2].language_code".to_string()));
    assert!(
        results
            .iter()
            .any(|r| r.field_id() == "titles[1]" && r.message() == NULL_ELEMENT_MESSAGE)
    );
    assert!(
        results
            .iter()
            .any(|r| r.field_id() == "titles[2].language_code"
                && r.message() == "language code must be two letters")
    );
}

#[test]
fn test_missing_owned_child_is_one_result() {
    let mut anime = valid_anime();
    anime.primary_release = None;

    let results = validate_entity(&anime);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].field_id(), "primary_release");
    assert_eq!(results[0].message(), NULL_VALUE_MESSAGE);
}

#[test]
fn test_nested_failures_carry_prefixed_paths() {
    let mut anime = valid_anime();
    anime.primary_release = Some(Release {
        episode_count: Some(-1),
    });

    let results = validate_entity(&anime);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].field_id(), "primary_release.episode_count");
    assert_eq!(results[0].message(), "episode count may not be negative");
}

#[test]
fn test_entity_rules_and_direct_results_run_after_properties() {
    let mut builder = ValidationBuilder::new(&());
    builder.add_validation_result("checked last", PropertyPath::named("direct"));
    builder.add_validation_rule(|_, nested| {
        nested.add_validation_result("checked middle", PropertyPath::named("rule"));
    });

    let results = builder.validate();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].field_id(), "rule");
    assert_eq!(results[1].field_id(), "direct");
}
