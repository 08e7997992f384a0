//! # Localization Tests
//!
//! Checks the bundled catalogs against every message the bot can send.

use order_bot::dialogue::Prompt;
use order_bot::localization::Localizer;

const PROMPTS: [Prompt; 10] = [
    Prompt::EnterQuantity,
    Prompt::InvalidQuantity,
    Prompt::EnterName,
    Prompt::InvalidName,
    Prompt::NameTooLong,
    Prompt::OrderPlaced,
    Prompt::OrderFailed,
    Prompt::ChooseItemFirst,
    Prompt::UnknownItem,
    Prompt::Cancelled,
];

const TRANSPORT_KEYS: [&str; 4] = ["welcome", "menu-empty", "help", "text-only"];

fn setup_localization() -> Localizer {
    Localizer::new("en").expect("Failed to create localizer")
}

#[test]
fn test_every_message_translated() {
    let localizer = setup_localization();

    for language in localizer.languages() {
        let keys = PROMPTS
            .iter()
            .map(|prompt| prompt.message_key())
            .chain(TRANSPORT_KEYS);
        for key in keys {
            let message = localizer.message(key, Some(language));
            assert!(!message.is_empty(), "{language}/{key} is empty");
            assert!(
                !message.starts_with("Missing translation:"),
                "{language}/{key} is missing"
            );
        }
    }
}

#[test]
fn test_prompts_differ_between_languages() {
    let localizer = setup_localization();

    for prompt in PROMPTS {
        let key = prompt.message_key();
        assert_ne!(
            localizer.message(key, Some("en")),
            localizer.message(key, Some("fr")),
            "{key} is not translated"
        );
    }
}

#[test]
fn test_regional_language_code() {
    let localizer = setup_localization();

    assert_eq!(
        localizer.message("enter-name", Some("fr-CA")),
        localizer.message("enter-name", Some("fr"))
    );
    assert_eq!(
        localizer.message("enter-name", Some("de")),
        "Please enter your name:"
    );
}

#[test]
fn test_get_message_nonexistent_key() {
    let localizer = setup_localization();

    let message = localizer.message("nonexistent-key", Some("fr"));
    assert_eq!(message, "Missing translation: nonexistent-key");
}

#[test]
fn test_admin_message_in_french_default() {
    let localizer = Localizer::new("fr").expect("Failed to create localizer");

    let message = localizer.message_with_args(
        "admin-new-order",
        None,
        &[("name", "Alice"), ("item", "PZ1"), ("quantity", "3")],
    );
    assert!(message.starts_with("📦 Nouvelle commande"));
    assert!(message.contains("Alice"));
    assert!(message.contains("PZ1"));
    assert!(message.contains('3'));
}
