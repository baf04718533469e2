use super::*;

use crate::embedding::{CrossEncoderConfig, MiniLmConfig};
use crate::generation::{GenerationError, MockTextGenerator, TextGenerator};
use crate::index::EmbeddingMatrix;

fn fixture_recipes() -> Vec<Recipe> {
    let rows = [
        ("Paneer Tikka", "Grilled paneer skewers with spices", Some(30.0), Some("Punjab")),
        ("Vegetable Biryani", "Fragrant rice with mixed vegetables", Some(50.0), Some("Hyderabad")),
        ("Masoor Dal", "Red lentil curry, quick vegetarian dinner", Some(25.0), None),
        ("Chocolate Cake", "Rich baked dessert", Some(60.0), None),
        ("Chana Masala", "Chickpea curry, high protein vegetarian", Some(35.0), Some("Punjab")),
        ("Fish Moilee", "Coconut fish stew", Some(40.0), Some("Kerala")),
        ("Aloo Paratha", "Potato stuffed flatbread", Some(30.0), Some("Punjab")),
        ("Tomato Rasam", "Tangy pepper soup", Some(20.0), Some("Tamil")),
    ];

    rows.iter()
        .map(|(title, description, minutes, region)| Recipe {
            title: (*title).to_string(),
            description: (*description).to_string(),
            prep_time_minutes: *minutes,
            calories: None,
            protein_g: None,
            sub_region: region.map(str::to_string),
            img_url: None,
        })
        .collect()
}

fn build_pipeline_with_loader(
    recipes: Vec<Recipe>,
    loader: crate::generation::ModelLoader,
) -> RecipePipeline {
    let embedder = MiniLmEmbedder::load(MiniLmConfig::stub_with_dim(32)).expect("stub embedder");

    let vectors: Vec<Vec<f32>> = recipes
        .iter()
        .map(|recipe| embedder.embed(&recipe.pair_text()).expect("embed recipe"))
        .collect();
    let matrix = EmbeddingMatrix::from_vectors(vectors).expect("matrix");
    let index = AnnIndex::build(&matrix).expect("index");

    let table = Arc::new(RecipeTable::from_recipes(recipes));
    let reranker = CrossEncoder::load(CrossEncoderConfig::stub()).expect("stub reranker");
    let registry = ModelRegistry::new(loader);

    RecipePipeline::new(table, index, embedder, reranker, registry).expect("pipeline")
}

fn build_pipeline(recipes: Vec<Recipe>, reply: &'static str) -> RecipePipeline {
    build_pipeline_with_loader(
        recipes,
        Box::new(move |_spec| {
            Ok(Arc::new(MockTextGenerator::with_reply(reply)) as Arc<dyn TextGenerator>)
        }),
    )
}

const EXTRACT_AND_SELECT_REPLY: &str = "{\"ingredients\": [], \"cuisine\": \"\", \
     \"meal_type\": \"dinner\", \"time_constraint\": \"\", \"occasion\": \"\", \
     \"cooking_method\": \"\", \"dietary\": [\"vegetarian\"]}\n\
     SELECTED_RECIPES: 2, 1\n\
     EXPLANATION: Both are hearty vegetarian dinners.";

mod similarity_tests {
    use super::*;

    #[test]
    fn test_zero_distance_maps_to_one() {
        assert_eq!(similarity_from_distance(0.0), 1.0);
    }

    #[test]
    fn test_strictly_decreasing() {
        let distances = [0.0, 0.1, 0.5, 1.0, 2.0, 10.0, 1000.0];
        for pair in distances.windows(2) {
            assert!(
                similarity_from_distance(pair[0]) > similarity_from_distance(pair[1]),
                "similarity must strictly decrease: {:?}",
                pair
            );
        }
    }

    #[test]
    fn test_bounded_in_unit_interval() {
        for distance in [0.0, 0.25, 1.0, 7.5, 1e6] {
            let score = similarity_from_distance(distance);
            assert!(score > 0.0 && score <= 1.0, "score {} out of (0, 1]", score);
        }
    }
}

mod construction_tests {
    use super::*;

    #[test]
    fn test_row_count_mismatch_rejected() {
        let embedder = MiniLmEmbedder::load(MiniLmConfig::stub_with_dim(32)).expect("embedder");
        let matrix = EmbeddingMatrix::from_vectors(vec![vec![0.0; 32]; 3]).expect("matrix");
        let index = AnnIndex::build(&matrix).expect("index");

        let table = Arc::new(RecipeTable::from_recipes(fixture_recipes()));
        let reranker = CrossEncoder::stub().expect("reranker");
        let registry = ModelRegistry::new(Box::new(|_spec| {
            Err(GenerationError::LoadFailed {
                key: "unused".into(),
                reason: "unused".into(),
            })
        }));

        let result = RecipePipeline::new(table, index, embedder, reranker, registry);
        assert!(matches!(
            result,
            Err(PipelineError::CorpusIndexMismatch {
                recipes: 8,
                vectors: 3
            })
        ));
    }
}

mod plain_mode_tests {
    use super::*;

    #[test]
    fn test_search_returns_top_three_sorted() {
        let pipeline = build_pipeline(fixture_recipes(), EXTRACT_AND_SELECT_REPLY);

        let results = pipeline
            .search("vegetarian dinner within 30 minutes")
            .expect("search");

        assert_eq!(results.len(), PLAIN_RESULT_COUNT);
        for pair in results.windows(2) {
            assert!(
                pair[0].score >= pair[1].score,
                "results must be sorted descending"
            );
        }
    }

    #[test]
    fn test_search_results_are_corpus_recipes() {
        let recipes = fixture_recipes();
        let titles: Vec<String> = recipes.iter().map(|r| r.title.clone()).collect();
        let pipeline = build_pipeline(recipes, EXTRACT_AND_SELECT_REPLY);

        let results = pipeline.search("paneer skewers").expect("search");
        for candidate in &results {
            assert!(titles.contains(&candidate.recipe.title));
        }
    }

    #[test]
    fn test_search_scores_are_reranker_scores() {
        let pipeline = build_pipeline(fixture_recipes(), EXTRACT_AND_SELECT_REPLY);
        let reranker = CrossEncoder::stub().expect("reranker");

        let query = "quick vegetarian dinner";
        let results = pipeline.search(query).expect("search");

        for candidate in &results {
            let expected = reranker
                .score(query, &candidate.recipe.pair_text())
                .expect("score");
            assert!(
                (candidate.score - expected).abs() < 1e-6,
                "candidate score must be the cross-encoder score, not retrieval similarity"
            );
        }
    }

    #[test]
    fn test_search_small_corpus_returns_fewer() {
        let pipeline = build_pipeline(fixture_recipes()[..2].to_vec(), EXTRACT_AND_SELECT_REPLY);

        let results = pipeline.search("anything").expect("search");
        assert_eq!(results.len(), 2);
    }
}

mod augmented_mode_tests {
    use super::*;

    #[tokio::test]
    async fn test_augmented_uses_model_selection() {
        let pipeline = build_pipeline(fixture_recipes(), EXTRACT_AND_SELECT_REPLY);

        let result = pipeline
            .search_augmented("vegetarian dinner", "tiny_llama")
            .await
            .expect("augmented search");

        assert_eq!(result.explanation, "Both are hearty vegetarian dinners.");
        assert_eq!(result.selected.len(), 2);
    }

    #[tokio::test]
    async fn test_augmented_caps_selection_at_five() {
        let pipeline = build_pipeline(
            fixture_recipes(),
            "SELECTED_RECIPES: 1,2,3,4,5,6,7,8\nEXPLANATION: all of them",
        );

        let result = pipeline
            .search_augmented("dinner", "tiny_llama")
            .await
            .expect("augmented search");

        assert_eq!(result.selected.len(), 5);
    }

    #[tokio::test]
    async fn test_bogus_model_key_behaves_like_default() {
        let pipeline = build_pipeline(fixture_recipes(), EXTRACT_AND_SELECT_REPLY);

        let with_default = pipeline
            .search_augmented("vegetarian dinner", "tiny_llama")
            .await
            .expect("default key");
        let with_bogus = pipeline
            .search_augmented("vegetarian dinner", "bogus")
            .await
            .expect("bogus key");

        assert_eq!(with_default.explanation, with_bogus.explanation);
        let titles = |result: &AugmentedResult| -> Vec<String> {
            result
                .selected
                .iter()
                .map(|c| c.recipe.title.clone())
                .collect()
        };
        assert_eq!(titles(&with_default), titles(&with_bogus));
    }

    #[tokio::test]
    async fn test_generator_failure_degrades_gracefully() {
        let pipeline = build_pipeline_with_loader(
            fixture_recipes(),
            Box::new(|_spec| {
                Ok(Arc::new(MockTextGenerator::failing()) as Arc<dyn TextGenerator>)
            }),
        );

        let result = pipeline
            .search_augmented("paneer night", "tiny_llama")
            .await
            .expect("augmented search");

        assert!(result.explanation.contains("paneer night"));
        assert_eq!(result.selected.len(), 5);

        // The canned selection is 1..5, so results follow rank order.
        let ranked = pipeline
            .search_augmented("paneer night", "tiny_llama")
            .await
            .expect("repeat");
        let titles: Vec<_> = result.selected.iter().map(|c| &c.recipe.title).collect();
        let repeat_titles: Vec<_> = ranked.selected.iter().map(|c| &c.recipe.title).collect();
        assert_eq!(titles, repeat_titles, "degraded path must be deterministic");
    }

    #[tokio::test]
    async fn test_backend_load_failure_degrades_gracefully() {
        let pipeline = build_pipeline_with_loader(
            fixture_recipes(),
            Box::new(|spec| {
                Err(GenerationError::LoadFailed {
                    key: spec.key.to_string(),
                    reason: "no backend".into(),
                })
            }),
        );

        let result = pipeline
            .search_augmented("late dinner", "tiny_llama")
            .await
            .expect("augmented search");

        assert!(result.explanation.contains("late dinner"));
        assert_eq!(result.selected.len(), 5);
    }
}
