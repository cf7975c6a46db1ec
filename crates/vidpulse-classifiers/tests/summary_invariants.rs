//! Property tests for the batch-summary invariants

use proptest::prelude::*;
use vidpulse_classifiers::{
    LabelDecoder, ModelArtifact, ModelBundle, MultinomialNb, TfidfVectorizer,
};

fn fitted_bundle() -> ModelBundle {
    let corpus = vec![
        "this broke everything, terrible update",
        "awful release, everything broke again",
        "meh, nothing interesting here",
        "meh, nothing changed really",
        "great work, love this feature",
        "great release, love the new player",
    ];
    let labels = vec![0usize, 0, 1, 1, 2, 2];

    let vectorizer = TfidfVectorizer::fit(&corpus);
    let features = vectorizer.transform_batch(&corpus);
    let model = MultinomialNb::fit(&features, &labels, 3, 1.0).unwrap();
    let decoder = LabelDecoder::new(vec![
        "negative".to_string(),
        "neutral".to_string(),
        "positive".to_string(),
    ]);

    ModelBundle::new(
        Some(vectorizer),
        Some(ModelArtifact::MultinomialNb(model).into_model()),
        Some(decoder),
    )
}

fn arbitrary_comment() -> impl Strategy<Value = String> {
    let words = prop::sample::select(vec![
        "great", "terrible", "meh", "love", "broke", "work", "release", "nothing", "zzz", "",
    ]);
    prop::collection::vec(words, 0..6).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn summary_invariants_hold_for_any_batch(
        comments in prop::collection::vec(arbitrary_comment(), 1..20)
    ) {
        let bundle = fitted_bundle();
        let summary = bundle.predict(&comments).unwrap();

        // One result per input, in input order
        prop_assert_eq!(summary.count, comments.len());
        prop_assert_eq!(summary.results.len(), comments.len());
        for (result, comment) in summary.results.iter().zip(&comments) {
            prop_assert_eq!(&result.comment, comment);
        }

        // Counts sum to the batch size; percentage keys match count keys
        let total: usize = summary.distribution.counts.values().sum();
        prop_assert_eq!(total, summary.count);
        let count_keys: Vec<_> = summary.distribution.counts.keys().collect();
        let pct_keys: Vec<_> = summary.distribution.percentages.keys().collect();
        prop_assert_eq!(count_keys, pct_keys);

        // Percentages are 1-decimal shares that roughly sum to 100
        let pct_sum: f64 = summary.distribution.percentages.values().sum();
        prop_assert!((pct_sum - 100.0).abs() < 0.5, "percentages summed to {}", pct_sum);

        // Mean confidence matches the per-row values
        let mean: f64 = summary.results.iter().map(|r| r.confidence).sum::<f64>()
            / summary.results.len() as f64;
        prop_assert!((summary.average_confidence - mean).abs() < 1e-12);
        for result in &summary.results {
            prop_assert!((0.0..=1.0).contains(&result.confidence));
        }
    }
}
