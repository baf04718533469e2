use super::*;

mod deterministic_tests {
    use super::*;

    #[test]
    fn test_protein_grams_extracted() {
        for query in [
            "dinner with 30 g protein",
            "dinner with 30g protein",
            "dinner with 30 grams protein",
            "dinner with 30 GRAMS PROTEIN",
        ] {
            let structured = structure_query(query);
            assert!(
                structured.contains("30g protein"),
                "missing protein segment for {:?}: {}",
                query,
                structured
            );
        }
    }

    #[test]
    fn test_time_bound_extracted() {
        let structured = structure_query("vegetarian dinner within 30 minutes");
        assert!(structured.contains("30 minutes"), "{}", structured);
    }

    #[test]
    fn test_region_extracted() {
        let structured = structure_query("something spicy in Punjab region");
        assert!(structured.contains("Punjab cuisine"), "{}", structured);
    }

    #[test]
    fn test_ends_with_original_query() {
        let query = "cheap lunch with 20g protein within 15 minutes";
        let structured = structure_query(query);

        let last_segment = structured.split(" | ").last().expect("segments exist");
        assert_eq!(last_segment, format!("Original query: {}", query));
    }

    #[test]
    fn test_no_patterns_still_structured() {
        let structured = structure_query("comfort food");
        assert_eq!(
            structured,
            "Recipe search: | Original query: comfort food"
        );
    }

    #[test]
    fn test_all_patterns_in_fixed_order() {
        let structured =
            structure_query("40 g protein within 25 minutes in Kerala region please");
        assert_eq!(
            structured,
            "Recipe search: | 40g protein | 25 minutes | Kerala cuisine | \
             Original query: 40 g protein within 25 minutes in Kerala region please"
        );
    }

    #[test]
    fn test_patterns_case_insensitive() {
        let structured = structure_query("WITHIN 45 MINUTES in goa REGION");
        assert!(structured.contains("45 minutes"));
        assert!(structured.contains("goa cuisine"));
    }
}

mod structured_query_tests {
    use super::*;

    #[test]
    fn test_fallback_preserves_query() {
        let q = StructuredQuery::fallback("midnight snack");
        assert_eq!(q.original_query, "midnight snack");
        assert!(q.ingredients.is_empty());
        assert!(q.cuisine.is_none());
        assert!(q.dietary.is_empty());
    }

    #[test]
    fn test_enhanced_text_fallback_only_query() {
        let q = StructuredQuery::fallback("midnight snack");
        assert_eq!(q.enhanced_text(), "Query: midnight snack");
    }

    #[test]
    fn test_enhanced_text_field_order() {
        let q = StructuredQuery {
            ingredients: vec!["paneer".into(), "peas".into()],
            cuisine: Some("North Indian".into()),
            meal_type: Some("dinner".into()),
            time_constraint: Some("30 minutes".into()),
            occasion: None,
            cooking_method: Some("curry".into()),
            dietary: vec!["vegetarian".into()],
            original_query: "paneer dinner".into(),
        };

        assert_eq!(
            q.enhanced_text(),
            "Ingredients: paneer, peas | Cuisine: North Indian | Dietary: vegetarian | \
             Meal type: dinner | Time: 30 minutes | Method: curry | Query: paneer dinner"
        );
    }

    #[test]
    fn test_enhanced_text_skips_empty_fields() {
        let q = StructuredQuery {
            cuisine: Some("Bengali".into()),
            original_query: "fish curry".into(),
            ..Default::default()
        };
        assert_eq!(q.enhanced_text(), "Cuisine: Bengali | Query: fish curry");
    }

    #[test]
    fn test_outcome_accessors() {
        let extracted = StructuredOutcome::Extracted(StructuredQuery::fallback("a"));
        let fallback = StructuredOutcome::Fallback(StructuredQuery::fallback("b"));

        assert!(!extracted.is_fallback());
        assert!(fallback.is_fallback());
        assert_eq!(fallback.query().original_query, "b");
        assert_eq!(extracted.into_query().original_query, "a");
    }
}

mod json_repair_tests {
    use crate::query::json_repair::{extract_object, json_candidates, parse_lenient, repair};

    #[test]
    fn test_repair_strips_trailing_commas() {
        assert_eq!(
            repair(r#"{"ingredients": ["egg",],}"#),
            r#"{"ingredients": ["egg"]}"#
        );
    }

    #[test]
    fn test_repair_strips_non_ascii() {
        assert_eq!(repair("{\"cuisine\": \"caf\u{e9}\"}"), r#"{"cuisine": "caf"}"#);
    }

    #[test]
    fn test_parse_lenient_strict_json() {
        let value = parse_lenient(r#"{"a": 1}"#).expect("parse");
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_parse_lenient_repairs_trailing_comma() {
        let value = parse_lenient(r#"{"ingredients": ["egg",],}"#).expect("parse after repair");
        assert_eq!(value["ingredients"][0], "egg");
    }

    #[test]
    fn test_parse_lenient_gives_up() {
        assert!(parse_lenient("not json at all").is_none());
        assert!(parse_lenient(r#"{"unclosed": ["#).is_none());
    }

    #[test]
    fn test_candidates_tolerate_surrounding_prose() {
        let text = "Sure! Here is the breakdown:\n{\"cuisine\": \"Thai\"}\nHope that helps.";
        let candidates = json_candidates(text);
        assert_eq!(candidates[0], r#"{"cuisine": "Thai"}"#);
    }

    #[test]
    fn test_extract_object_nested_braces() {
        let text = r#"prefix {"outer": {"inner": 1}} suffix"#;
        let value = extract_object(text).expect("extract");
        assert_eq!(value["outer"]["inner"], 1);
    }

    #[test]
    fn test_extract_object_none_without_braces() {
        assert!(extract_object("no json here").is_none());
    }

    #[test]
    fn test_extract_object_rejects_non_object() {
        // A bare array inside braces-free text never matches the object scan.
        assert!(extract_object("[1, 2, 3]").is_none());
    }
}

mod extractor_tests {
    use super::*;
    use crate::generation::MockTextGenerator;

    const FULL_JSON: &str = r#"{"ingredients": ["paneer", "peas"], "cuisine": "North Indian",
        "meal_type": "dinner", "time_constraint": "30 minutes", "occasion": "",
        "cooking_method": "curry", "dietary": ["vegetarian"]}"#;

    #[tokio::test]
    async fn test_extract_success() {
        let generator = MockTextGenerator::with_reply(FULL_JSON);

        let outcome = extract(&generator, 256, "paneer dinner").await;
        assert!(!outcome.is_fallback());

        let q = outcome.query();
        assert_eq!(q.ingredients, vec!["paneer", "peas"]);
        assert_eq!(q.cuisine.as_deref(), Some("North Indian"));
        assert_eq!(q.occasion, None);
        assert_eq!(q.dietary, vec!["vegetarian"]);
        assert_eq!(q.original_query, "paneer dinner");
    }

    #[tokio::test]
    async fn test_extract_tolerates_prose_wrapping() {
        let reply = format!("Here you go:\n{}\nAnything else?", FULL_JSON);
        let generator = MockTextGenerator::with_reply(&reply);

        let outcome = extract(&generator, 256, "paneer dinner").await;
        assert!(!outcome.is_fallback());
    }

    #[tokio::test]
    async fn test_extract_repairs_trailing_commas() {
        let generator = MockTextGenerator::with_reply(
            r#"{"ingredients": ["egg",], "cuisine": "", "meal_type": "breakfast",}"#,
        );

        let outcome = extract(&generator, 256, "egg breakfast").await;
        assert!(!outcome.is_fallback());

        let q = outcome.query();
        assert_eq!(q.ingredients, vec!["egg"]);
        assert_eq!(q.meal_type.as_deref(), Some("breakfast"));
    }

    #[tokio::test]
    async fn test_extract_overwrites_model_echo() {
        // A model echoing its own idea of the query must not survive.
        let generator = MockTextGenerator::with_reply(
            r#"{"ingredients": [], "original_query": "model hallucination"}"#,
        );

        let outcome = extract(&generator, 256, "actual query").await;
        assert_eq!(outcome.query().original_query, "actual query");
    }

    #[tokio::test]
    async fn test_extract_fallback_on_no_json() {
        let generator = MockTextGenerator::with_reply("I cannot produce JSON today.");

        let outcome = extract(&generator, 256, "dal makhani").await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.query().original_query, "dal makhani");
    }

    #[tokio::test]
    async fn test_extract_fallback_on_wrong_types() {
        let generator =
            MockTextGenerator::with_reply(r#"{"ingredients": 42, "cuisine": ["list"]}"#);

        let outcome = extract(&generator, 256, "dal makhani").await;
        assert!(outcome.is_fallback());
    }

    #[tokio::test]
    async fn test_extract_fallback_on_model_failure() {
        let generator = MockTextGenerator::failing();

        let outcome = extract(&generator, 256, "dal makhani").await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.query().original_query, "dal makhani");
    }

    #[tokio::test]
    async fn test_extract_prompt_carries_query() {
        let generator = MockTextGenerator::with_reply(FULL_JSON);

        let _ = extract(&generator, 256, "garlic noodles").await;

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("garlic noodles"));
        assert!(prompts[0].contains("\"ingredients\""));
    }
}
