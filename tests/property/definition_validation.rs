//! Property-based tests for definition validation

use lexicard::definition::{validate, WordDefinition};
use lexicard::error::ApiError;
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn well_formed_objects_validate_unchanged(
        word in "[a-z]{1,20}",
        pronunciation in "/[a-zɪəˈ]{1,12}/",
        meaning in "[a-z ]{1,60}",
        examples in proptest::collection::vec("[A-Za-z .]{1,40}", 2),
    ) {
        let candidate = json!({
            "word": word,
            "pronunciation": pronunciation,
            "definition": meaning,
            "examples": examples,
        });

        let definition = validate(&candidate).unwrap();
        prop_assert_eq!(definition.word(), word.as_str());
        prop_assert_eq!(definition.pronunciation(), pronunciation.as_str());
        prop_assert_eq!(definition.definition(), meaning.as_str());
        prop_assert_eq!(definition.examples().to_vec(), examples);
        prop_assert!(definition.image().is_none());
    }

    #[test]
    fn example_count_other_than_two_is_rejected(
        examples in proptest::collection::vec("[a-z]{1,10}", 0..6usize)
            .prop_filter("exactly two is valid", |e| e.len() != 2),
    ) {
        let candidate = json!({
            "word": "ephemeral",
            "pronunciation": "/ɪˈfem(ə)rəl/",
            "definition": "lasting for a very short time",
            "examples": examples,
        });

        let result = validate(&candidate);
        prop_assert!(matches!(result, Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn non_objects_are_rejected(value in prop_oneof![
        Just(json!(null)),
        any::<bool>().prop_map(|b| json!(b)),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,10}".prop_map(|s| json!(s)),
        proptest::collection::vec(any::<u8>(), 0..4).prop_map(|v| json!(v)),
    ]) {
        prop_assert!(matches!(validate(&value), Err(ApiError::ValidationError(_))));
    }

    #[test]
    fn serialized_definitions_validate_back_to_themselves(
        word in "[a-z]{1,20}",
        pronunciation in "/[a-zɪəˈ]{1,12}/",
        meaning in "[a-z][a-z ]{0,59}",
        first in "[A-Z][a-z .]{0,39}",
        second in "[A-Z][a-z .]{0,39}",
        image in proptest::option::of(
            "[a-z]{1,12}".prop_map(|name| format!("https://img.example.com/{}.png", name)),
        ),
    ) {
        let definition =
            WordDefinition::new(word, pronunciation, meaning, [first, second], image).unwrap();

        let text = serde_json::to_string(&definition).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(value.get("image").is_some(), definition.image().is_some());
        prop_assert_eq!(validate(&value).unwrap(), definition);
    }
}
