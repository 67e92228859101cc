//! Property-based tests for card rendering

use lexicard::card::format_vocabulary_card;
use lexicard::definition::WordDefinition;
use proptest::prelude::*;

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z ,.'-]{0,40}"
}

fn image() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(
        "[a-z]{1,12}".prop_map(|name| format!("https://img.example.com/{}.png", name)),
    )
}

proptest! {
    #[test]
    fn card_has_five_lines_plus_optional_image(
        word in "[a-z]{1,20}",
        pronunciation in text(),
        meaning in text(),
        first in text(),
        second in text(),
        image in image(),
        tags in "(#[a-z]{1,8} ?){0,3}",
    ) {
        let definition = WordDefinition::new(
            word.clone(),
            pronunciation.clone(),
            meaning.clone(),
            [first.clone(), second.clone()],
            image.clone(),
        )
        .unwrap();

        let lines = format_vocabulary_card(&definition, &tags);

        prop_assert_eq!(lines.len(), if image.is_some() { 6 } else { 5 });
        prop_assert_eq!(&lines[0], &format!("{} #card {}", word, tags));
        prop_assert_eq!(&lines[1], &format!("*{}*", pronunciation));
        prop_assert_eq!(&lines[2], &format!("**{}**", meaning));
        prop_assert_eq!(&lines[3], &first);
        prop_assert_eq!(&lines[4], &second);
        if let Some(url) = image {
            prop_assert_eq!(&lines[5], &format!("![Image]({})", url));
        }
    }

    #[test]
    fn formatting_is_deterministic(word in "[a-z]{1,20}", tags in "#[a-z]{0,8}") {
        let definition = WordDefinition::new(
            word,
            "/p/",
            "meaning",
            ["one".to_string(), "two".to_string()],
            None,
        )
        .unwrap();
        prop_assert_eq!(
            format_vocabulary_card(&definition, &tags),
            format_vocabulary_card(&definition, &tags)
        );
    }
}
