//! Flashcard rendering.

use crate::definition::WordDefinition;

/// Render `definition` as flashcard lines: the headword tagged as a card, the
/// pronunciation in italics, the meaning in bold, both examples, and the image
/// when there is one.
pub fn format_vocabulary_card(definition: &WordDefinition, custom_tags: &str) -> Vec<String> {
    let mut lines = Vec::with_capacity(6);
    lines.push(format!("{} #card {}", definition.word(), custom_tags));
    lines.push(format!("*{}*", definition.pronunciation()));
    lines.push(format!("**{}**", definition.definition()));
    lines.extend(definition.examples().iter().cloned());

    if let Some(image) = definition.image() {
        lines.push(format!("![Image]({})", image));
    }

    lines
}
