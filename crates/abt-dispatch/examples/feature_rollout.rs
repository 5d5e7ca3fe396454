//! Two-arm rollout demo: buckets users by id parity, gives the treatment arm
//! named behaviors, and dispatches per user.

use abt_dispatch::{ConfigError, GroupDispatcher, GroupId, HandlerTable};
use serde_json::json;

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt().init();

    let mut rollout = GroupDispatcher::builder()
        .user(0)
        .classify(|user, groups| {
            let uid = user.to_number().unwrap_or(0);
            let name = if uid % 2 == 0 { "control" } else { "treatment" };
            groups
                .get(name)
                .cloned()
                .unwrap_or_else(|| GroupId::new(name))
        })
        .groups(["control", "treatment"])
        .handlers(
            HandlerTable::new()
                .single("control", |_, _| Some(json!("legacy checkout")))
                .named("treatment", "checkout", |ctx, _| {
                    Some(json!(format!("new checkout for user {}", ctx.user)))
                })
                .named("treatment", "banner", |_, _| Some(json!("spring sale"))),
        )
        .build()?;

    for uid in 0..4 {
        rollout.set_user(uid);
        let outcome = match rollout.group_id().as_str() {
            "control" => rollout.run(None, &[])?,
            _ => rollout.run(Some("checkout"), &[])?,
        };
        println!(
            "user {uid} -> group {}: {}",
            rollout.group_id(),
            outcome.unwrap_or(json!(null))
        );
    }

    // A name nobody registered: dispatch warns and quietly does nothing.
    rollout.set_user(1);
    let missing = rollout.run(Some("sidebar"), &[])?;
    println!("missing handler produced: {missing:?}");

    Ok(())
}
