//! Human-readable labels inferred from identifiers.

/// Splits a camelCase, PascalCase, snake_case or kebab-case identifier into
/// words.
fn split_words(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_ascii_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_ascii_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            // "fooBar" and the "P" in "HTMLParser" both start a new word.
            if !prev.is_ascii_uppercase() || next_is_lower {
                words.push(std::mem::take(&mut current));
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

/// Derives a display label from a field key or enum value.
///
/// Words are lowercased, the first letter is capitalized and words are joined
/// with single spaces: `firstName` and `first_name` both become `First name`.
pub fn infer_label(identifier: &str) -> String {
    let sentence = split_words(identifier)
        .into_iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut chars = sentence.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
