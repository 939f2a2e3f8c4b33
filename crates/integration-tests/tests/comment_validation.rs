//! Integration tests for comment write-time validation.

#![allow(clippy::unwrap_used)]

use lobsters_core::{StoryId, UserId};
use lobsters_integration_tests::hat;
use lobsters_site::models::NewComment;
use lobsters_site::models::comment::MAX_RENDERED_BODY_LENGTH;

fn draft(body: &str) -> NewComment {
    NewComment::new(UserId::new(1), StoryId::new(1), body)
}

#[test]
fn valid_comment_has_no_errors() {
    let errors = draft("Nice post, see https://lobste.rs").validate();
    assert!(errors.is_empty(), "{errors}");
}

#[test]
fn body_is_required() {
    assert_eq!(draft("").validate().on("body"), ["can't be blank"]);
    assert_eq!(draft(" \n\t").validate().on("body"), ["can't be blank"]);
}

#[test]
fn short_id_accepts_one_to_ten_alphanumerics() {
    for ok in ["a", "abc123", "ABCdef0123"] {
        let errors = draft("hi").with_short_id(ok).validate();
        assert!(errors.on("short_id").is_empty(), "{ok}: {errors}");
    }
}

#[test]
fn short_id_rejects_eleven_characters() {
    let errors = draft("hi").with_short_id("01234567890").validate();
    assert_eq!(errors.on("short_id").len(), 1);
}

#[test]
fn short_id_rejects_empty_and_symbols() {
    assert_eq!(draft("hi").with_short_id("").validate().on("short_id").len(), 1);
    assert_eq!(draft("hi").with_short_id("ab-cd").validate().on("short_id").len(), 1);
}

#[test]
fn rendered_body_length_limit() {
    let mut at_limit = draft("hi");
    at_limit.rendered_body = "a".repeat(MAX_RENDERED_BODY_LENGTH);
    assert!(at_limit.validate().on("rendered_body").is_empty());

    let mut over_limit = draft("hi");
    over_limit.rendered_body = "a".repeat(MAX_RENDERED_BODY_LENGTH + 1);
    assert_eq!(
        over_limit.validate().on("rendered_body"),
        ["is too long (maximum is 16777215 characters)"]
    );
}

#[test]
fn hat_must_belong_to_author() {
    let errors = draft("hi").wearing(hat(1, 2)).validate();
    assert_eq!(errors.on("hat"), ["not wearable by user"]);

    let errors = draft("hi").wearing(hat(1, 1)).validate();
    assert!(errors.on("hat").is_empty());
}

#[test]
fn all_failures_are_reported_together() {
    let errors = draft("")
        .with_short_id("01234567890")
        .wearing(hat(1, 2))
        .validate();

    assert_eq!(errors.len(), 3);
    let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
    assert_eq!(fields, ["body", "hat", "short_id"]);
}

#[test]
fn markdown_is_rendered_without_raw_html() {
    let comment = draft("**bold** <script>alert(1)</script>");
    assert!(comment.rendered_body.contains("<strong>bold</strong>"));
    assert!(!comment.rendered_body.contains("<script>"));
}
