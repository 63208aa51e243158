/// Derive the account family key of a character.
///
/// A display name of the form `Name (Main)` yields `Main`; a plain display name
/// yields the character's own name.
pub fn family_key<'a>(name: &'a str, display_name: &'a str) -> &'a str {
    match display_name.split_once('(') {
        Some((_, rest)) => rest.split(')').next().unwrap_or(rest).trim(),
        None => name,
    }
}

/// Display name of `name` within a search group whose main character is `main`.
pub fn display_name(name: &str, main: &str) -> String {
    if name == main {
        name.to_string()
    } else {
        format!("{} ({})", name, main)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_character_is_its_own_family() {
        assert_eq!(family_key("Aria", "Aria"), "Aria");
    }

    #[test]
    fn test_alt_character_resolves_to_main() {
        assert_eq!(family_key("Brin", "Brin (Aria)"), "Aria");
    }

    #[test]
    fn test_unclosed_parenthesis_takes_remainder() {
        assert_eq!(family_key("Brin", "Brin (Aria"), "Aria");
    }

    #[test]
    fn test_display_name_round_trips_through_family_key() {
        let shown = display_name("Brin", "Aria");
        assert_eq!(shown, "Brin (Aria)");
        assert_eq!(family_key("Brin", &shown), "Aria");
        assert_eq!(display_name("Aria", "Aria"), "Aria");
    }
}
