use abt_dispatch::{GroupDispatcher, GroupId, GroupSet, HandlerTable, UserId};
use serde_json::json;

fn parity_classify(user: &UserId, groups: &GroupSet) -> GroupId {
    let uid = user.to_number().unwrap_or(0);
    let name = if uid % 2 == 0 { "A" } else { "B" };
    groups
        .get(name)
        .cloned()
        .unwrap_or_else(|| GroupId::new(name))
}

fn fixture() -> GroupDispatcher {
    GroupDispatcher::builder()
        .user("1")
        .classify(parity_classify)
        .handlers(
            HandlerTable::new()
                .single("A", |_, _| Some(json!("A")))
                .named("B", "foo", |_, _| Some(json!("foo")))
                .named("B", "bar", |_, _| Some(json!("bar"))),
        )
        .build()
        .expect("valid config")
}

#[test]
fn unknown_group_is_rejected() {
    let mut dispatcher = fixture();
    let err = dispatcher
        .add_handler_in("Z", "baz", |_, _| Some(json!("baz")))
        .expect_err("Z is not configured");
    assert_eq!(err.info().code, "unknown-group");
    assert_eq!(err.info().context.get("group").map(String::as_str), Some("Z"));
}

#[test]
fn registers_into_a_named_entry() {
    let mut dispatcher = fixture();
    dispatcher
        .add_handler("baz", |_, _| Some(json!("baz")))
        .expect("B is configured");
    assert_eq!(
        dispatcher.run(Some("baz"), &[]).expect("dispatch"),
        Some(json!("baz"))
    );
    assert_eq!(
        dispatcher.run(Some("foo"), &[]).expect("dispatch"),
        Some(json!("foo"))
    );
}

#[test]
fn promotes_a_single_entry_and_keeps_it_as_the_default() {
    let mut dispatcher = fixture();
    dispatcher.set_user("2");
    dispatcher
        .add_handler("baz", |_, _| Some(json!("baz")))
        .expect("A is configured");
    assert_eq!(
        dispatcher.run(Some("baz"), &[]).expect("dispatch"),
        Some(json!("baz"))
    );
    // The displaced anonymous behavior still answers unnamed dispatch.
    assert_eq!(
        dispatcher.run(None, &[]).expect("dispatch"),
        Some(json!("A"))
    );
}

#[test]
fn registers_into_a_group_without_an_entry() {
    let mut dispatcher = GroupDispatcher::builder()
        .user("1")
        .classify(|_, groups| groups.get("C").cloned().expect("configured"))
        .handlers(
            HandlerTable::new()
                .single("A", |_, _| Some(json!("A")))
                .single("B", |_, _| Some(json!("B"))),
        )
        .groups(["A", "B", "C"])
        .build()
        .expect("valid config");
    dispatcher
        .add_handler("foo", |_, _| Some(json!("foo")))
        .expect("C is configured");
    assert_eq!(
        dispatcher.run(Some("foo"), &[]).expect("dispatch"),
        Some(json!("foo"))
    );
    // Promotion from an absent entry leaves no default behind.
    let err = dispatcher.run(None, &[]).expect_err("no default in C");
    assert_eq!(err.info().code, "default-missing");
}

#[test]
fn reregistering_a_name_overwrites_the_handler() {
    let mut dispatcher = fixture();
    dispatcher
        .add_handler("foo", |_, _| Some(json!("foo v2")))
        .expect("B is configured");
    assert_eq!(
        dispatcher.run(Some("foo"), &[]).expect("dispatch"),
        Some(json!("foo v2"))
    );
}

#[test]
fn registration_targets_an_explicit_group_independent_of_the_user() {
    let mut dispatcher = fixture();
    // Current group is B; register into A without switching users.
    dispatcher
        .add_handler_in("A", "baz", |_, _| Some(json!("baz")))
        .expect("A is configured");
    dispatcher.set_user("2");
    assert_eq!(
        dispatcher.run(Some("baz"), &[]).expect("dispatch"),
        Some(json!("baz"))
    );
}

#[test]
fn registration_survives_user_changes() {
    let mut dispatcher = fixture();
    dispatcher
        .add_handler("baz", |_, _| Some(json!("baz")))
        .expect("B is configured");
    dispatcher.set_user("2");
    dispatcher.set_user("3");
    assert_eq!(
        dispatcher.run(Some("baz"), &[]).expect("dispatch"),
        Some(json!("baz"))
    );
}
