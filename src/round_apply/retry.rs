//! SQLSTATE classification for the round apply engine (spec §4.5).
//!
//! A statement failure is `retryable` when the error is the kind PostgreSQL
//! raises for "the object this statement needs doesn't exist *yet*" rather
//! than a genuine defect in the statement itself — the same distinction
//! `error_context::SqlErrorContext` draws when it labels a code, just used
//! here to decide whether to give the statement another round instead of
//! just prettifying the message.

/// SQLSTATEs that mean "may succeed once more of the plan has run".
const RETRYABLE_UNCONDITIONAL: &[&str] = &[
    "42P01", // undefined_table
    "42883", // undefined_function
    "42704", // undefined_object
    "42P17", // invalid_object_definition
];

/// `duplicate_table` (42P07) is only retryable when the conflicting name
/// belongs to an object this same apply is still going to create later —
/// in that case the statement that just failed raced a sibling statement
/// that hasn't run yet (e.g. two CREATE TABLE IF NOT EXISTS variants for
/// the same partition) and will succeed once that sibling has applied.
/// When the name matches nothing still pending, the duplicate is real and
/// the failure should stick.
const DUPLICATE_TABLE_SQLSTATE: &str = "42P07";

/// Decide whether a statement failure should be retried in a later round.
///
/// `pending_stable_ids` is the set of stable IDs for statements still
/// `pending` or `retryable` after this round (excluding the one that just
/// failed) — used only for the conditional 42P07 case.
pub fn is_retryable(sqlstate: &str, message: &str, pending_stable_ids: &[String]) -> bool {
    if RETRYABLE_UNCONDITIONAL.contains(&sqlstate) {
        return true;
    }
    if sqlstate == DUPLICATE_TABLE_SQLSTATE {
        return pending_stable_ids
            .iter()
            .any(|id| message_references(message, id));
    }
    false
}

/// Crude but effective: PostgreSQL duplicate-object messages quote the bare
/// object name (`relation "t" already exists`), while stable IDs carry a
/// `kind:schema.name` shape. Match on the trailing identifier segment.
fn message_references(message: &str, stable_id: &str) -> bool {
    let bare = stable_id.rsplit(['.', ':']).next().unwrap_or(stable_id);
    !bare.is_empty() && message.contains(bare)
}
