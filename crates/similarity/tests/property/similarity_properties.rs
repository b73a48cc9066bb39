use proptest::prelude::*;
use similarity::{cosine_similarity, SimilarityError};

fn vector(len: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1000.0f32..1000.0, len)
}

fn pair() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
    (1usize..300).prop_flat_map(|len| (vector(len), vector(len)))
}

proptest! {
    #[test]
    fn symmetric((a, b) in pair()) {
        let ab = cosine_similarity(&a, &b).unwrap();
        let ba = cosine_similarity(&b, &a).unwrap();
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn bounded((a, b) in pair()) {
        let sim = cosine_similarity(&a, &b).unwrap();
        prop_assert!((-1.0..=1.0).contains(&sim), "out of range: {}", sim);
    }

    #[test]
    fn self_similarity_is_one(a in (1usize..300).prop_flat_map(vector)) {
        prop_assume!(a.iter().any(|&x| x != 0.0));
        let sim = cosine_similarity(&a, &a).unwrap();
        prop_assert!((sim - 1.0).abs() < 1e-9, "self similarity {}", sim);
    }

    #[test]
    fn zero_vector_is_zero(b in (0usize..300).prop_flat_map(vector)) {
        let zero = vec![0.0f32; b.len()];
        prop_assert_eq!(cosine_similarity(&zero, &b).unwrap(), 0.0);
        prop_assert_eq!(cosine_similarity(&b, &zero).unwrap(), 0.0);
    }

    #[test]
    fn negation_flips_sign((a, b) in pair()) {
        let neg_b: Vec<f32> = b.iter().map(|x| -x).collect();
        let sim = cosine_similarity(&a, &b).unwrap();
        let flipped = cosine_similarity(&a, &neg_b).unwrap();
        prop_assert!((sim + flipped).abs() < 1e-9);
    }

    #[test]
    fn positive_scaling_is_invariant((a, b) in pair(), k in 0.001f32..100.0) {
        let scaled: Vec<f32> = a.iter().map(|x| x * k).collect();
        let sim = cosine_similarity(&a, &b).unwrap();
        let scaled_sim = cosine_similarity(&scaled, &b).unwrap();
        prop_assert!((sim - scaled_sim).abs() < 1e-4);
    }

    #[test]
    fn length_mismatch_always_fails(a in vector(5), b in (6usize..20).prop_flat_map(vector)) {
        let err = cosine_similarity(&a, &b).unwrap_err();
        prop_assert_eq!(err, SimilarityError::InvalidInput { left: 5, right: b.len() });
    }
}
