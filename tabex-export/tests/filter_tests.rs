use proptest::prelude::*;
use serde_json::json;
use tabex_export::compile;
use tabex_model::{ExportFilter, Record, RecordType};
use tabex_store::StoreFilter;

fn rec(value: serde_json::Value) -> Record {
    Record::from_value(value).unwrap()
}

fn filter(value: serde_json::Value) -> ExportFilter {
    ExportFilter::from_json(&value)
}

// ── Date range ───────────────────────────────────────────────────

#[test]
fn to_boundary_is_inclusive_to_the_millisecond() {
    let f = compile(RecordType::Product, &filter(json!({"to": "2024-01-31"})));
    assert!(f.matches(&rec(json!({"createdAt": "2024-01-31T23:59:59.999Z"}))));
    assert!(!f.matches(&rec(json!({"createdAt": "2024-02-01T00:00:00.000Z"}))));
}

#[test]
fn from_boundary_is_inclusive() {
    let f = compile(RecordType::User, &filter(json!({"from": "2024-01-10"})));
    assert!(f.matches(&rec(json!({"createdAt": "2024-01-10"}))));
    assert!(!f.matches(&rec(json!({"createdAt": "2024-01-09T23:59:59.999Z"}))));
}

#[test]
fn missing_created_at_excluded_only_with_bounds() {
    let undated = rec(json!({"id": "x"}));
    let unparseable = rec(json!({"id": "y", "createdAt": "someday"}));
    let bounded = compile(RecordType::Product, &filter(json!({"from": "2024-01-01"})));
    let open = compile(RecordType::Product, &filter(json!({})));

    assert!(!bounded.matches(&undated));
    assert!(!bounded.matches(&unparseable));
    assert!(open.matches(&undated));
    assert!(open.matches(&unparseable));
}

#[test]
fn malformed_bounds_do_not_constrain() {
    let f = compile(RecordType::Booking, &filter(json!({"from": "garbage", "to": "2024-99-99"})));
    assert!(f.matches(&rec(json!({"id": "b1"}))));
}

#[test]
fn epoch_millis_created_at() {
    let f = compile(RecordType::Product, &filter(json!({"from": "2024-01-01", "to": "2024-01-01"})));
    // 2024-01-01T12:00:00Z
    assert!(f.matches(&rec(json!({"createdAt": 1_704_110_400_000_i64}))));
}

// ── Exact matches ────────────────────────────────────────────────

#[test]
fn status_and_user_apply_to_bookings_and_requests() {
    let f = filter(json!({"status": "Pending", "userId": "u1"}));
    let pending = rec(json!({"status": "Pending", "userId": "u1"}));
    let other = rec(json!({"status": "Done", "userId": "u1"}));
    for t in [RecordType::Booking, RecordType::Request] {
        let c = compile(t, &f);
        assert!(c.matches(&pending));
        assert!(!c.matches(&other));
        assert_eq!(c.pushdown(), StoreFilter::all().eq("status", "Pending").eq("userId", "u1"));
    }
}

#[test]
fn inapplicable_fields_are_ignored() {
    let f = filter(json!({"status": "Pending", "role": "admin", "inStock": "in"}));
    let product = compile(RecordType::Product, &f);
    assert!(product.pushdown().is_empty());
    assert!(product.matches(&rec(json!({"status": "Done", "stock": 3}))));

    let user = compile(RecordType::User, &f);
    assert_eq!(user.pushdown(), StoreFilter::all().eq("role", "admin"));
    assert!(user.matches(&rec(json!({"role": "admin", "status": "Done"}))));
}

#[test]
fn all_sentinel_is_not_a_literal() {
    let f = compile(RecordType::Request, &filter(json!({"status": "All"})));
    assert!(f.matches(&rec(json!({"status": "Pending"}))));
    assert!(f.pushdown().is_empty());
}

// ── Search ───────────────────────────────────────────────────────

#[test]
fn product_search_covers_name_and_sku() {
    let f = compile(RecordType::Product, &filter(json!({"search": "pb-"})));
    assert!(f.matches(&rec(json!({"name": "Panel B", "sku": "PB-2"}))));
    assert!(!f.matches(&rec(json!({"name": "Panel A", "sku": "PA-1"}))));
}

#[test]
fn user_search_covers_name_and_email() {
    let f = compile(RecordType::User, &filter(json!({"search": "EXAMPLE.org"})));
    assert!(f.matches(&rec(json!({"name": "Ada", "email": "ada@example.org"}))));
    assert!(f.matches(&rec(json!({"name": "Example.org Team"}))));
    assert!(!f.matches(&rec(json!({"name": "Bob", "email": "bob@test.io"}))));
}

#[test]
fn booking_search_uses_snapshot_name() {
    let f = compile(RecordType::Booking, &filter(json!({"search": "grace"})));
    assert!(f.matches(&rec(json!({"name": "Roof", "user": {"name": "Grace Hopper"}}))));
    assert!(!f.matches(&rec(json!({"name": "Roof"}))));
}

// ── Stock ────────────────────────────────────────────────────────

#[test]
fn in_stock_requires_positive_number() {
    let f = compile(RecordType::Product, &filter(json!({"inStock": "in"})));
    assert!(f.matches(&rec(json!({"stock": 5}))));
    assert!(!f.matches(&rec(json!({"stock": 0}))));
    assert!(!f.matches(&rec(json!({"stock": "lots"}))));
    assert!(!f.matches(&rec(json!({}))));
}

#[test]
fn out_of_stock_treats_missing_as_zero() {
    let f = compile(RecordType::Product, &filter(json!({"inStock": "out"})));
    assert!(f.matches(&rec(json!({"stock": 0}))));
    assert!(f.matches(&rec(json!({"stock": -2}))));
    assert!(f.matches(&rec(json!({}))));
    assert!(f.matches(&rec(json!({"stock": null}))));
    assert!(!f.matches(&rec(json!({"stock": 1}))));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn predicate_is_deterministic(
        stock in prop::option::of(-5i64..5),
        status in prop::sample::select(vec!["Pending", "Done", "All"]),
        day in 1u32..28,
        search in "[a-c]{0,2}",
    ) {
        let mut fields = serde_json::Map::new();
        if let Some(s) = stock {
            fields.insert("stock".into(), json!(s));
        }
        fields.insert("status".into(), json!("Pending"));
        fields.insert("name".into(), json!("abc"));
        fields.insert("createdAt".into(), json!(format!("2024-01-{day:02}")));
        let record = Record::new(fields);

        let f = filter(json!({
            "status": status,
            "search": search,
            "inStock": "in",
            "from": "2024-01-10",
            "to": "2024-01-20",
        }));
        for t in tabex_model::RecordType::ALL {
            let c = compile(t, &f);
            let first = c.matches(&record);
            prop_assert_eq!(first, c.matches(&record));
            prop_assert_eq!(first, compile(t, &f).matches(&record));
        }
    }
}
