use pretty_assertions::assert_eq;
use serde_json::json;
use tabex_export::{columns_for, shape_row};
use tabex_model::{Record, RecordType};

fn rec(value: serde_json::Value) -> Record {
    Record::from_value(value).unwrap()
}

fn cells(t: RecordType, value: serde_json::Value) -> Vec<Option<String>> {
    shape_row(t, &rec(value)).into_cells()
}

fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

// ── Schemas ──────────────────────────────────────────────────────

#[test]
fn column_schemas_are_fixed() {
    assert_eq!(
        columns_for(RecordType::Booking),
        ["id", "name", "capacityKW", "status", "userId", "userName", "createdAt"]
    );
    assert_eq!(
        columns_for(RecordType::Request),
        ["id", "type", "status", "userId", "userName", "createdAt"]
    );
    assert_eq!(
        columns_for(RecordType::User),
        ["id", "name", "email", "phone", "role", "createdAt"]
    );
    assert_eq!(
        columns_for(RecordType::Product),
        ["id", "name", "sku", "stock", "price", "createdAt"]
    );
}

#[test]
fn every_row_has_one_cell_per_column() {
    for t in RecordType::ALL {
        let row = shape_row(t, &rec(json!({})));
        assert_eq!(row.cells().len(), columns_for(t).len(), "{t}");
        assert_eq!(row.columns(), columns_for(t));
    }
}

// ── Snapshot fields ──────────────────────────────────────────────

#[test]
fn booking_user_name_comes_from_snapshot() {
    let row = shape_row(
        RecordType::Booking,
        &rec(json!({
            "id": "b1",
            "name": "Roof array",
            "capacityKW": 6.5,
            "status": "Registered",
            "userId": "u1",
            "user": {"id": "u1", "name": "Ada"},
            "createdAt": "2024-03-01T10:00:00.000Z"
        })),
    );
    assert_eq!(
        row.cells(),
        [s("b1"), s("Roof array"), s("6.5"), s("Registered"), s("u1"), s("Ada"), s("2024-03-01T10:00:00.000Z")]
    );
    assert_eq!(row.get("userName"), Some("Ada"));
    assert_eq!(row.get("nope"), None);
}

#[test]
fn request_without_snapshot_has_empty_user_name() {
    let c = cells(RecordType::Request, json!({"id": "r1", "type": "Service", "userId": "u9"}));
    assert_eq!(c, vec![s("r1"), s("Service"), None, s("u9"), None, None]);
}

// ── Missing values ───────────────────────────────────────────────

#[test]
fn missing_stock_is_zero_but_missing_price_is_blank() {
    let c = cells(RecordType::Product, json!({"id": "p1", "name": "Panel"}));
    assert_eq!(c[3], s("0"));
    assert_eq!(c[4], None);
    assert_ne!(c[3], c[4]);
}

#[test]
fn null_numbers_render_zero() {
    let c = cells(RecordType::Product, json!({"stock": null, "price": null}));
    assert_eq!((c[3].clone(), c[4].clone()), (s("0"), s("0")));
    let b = cells(RecordType::Booking, json!({"capacityKW": null}));
    assert_eq!(b[2], s("0"));
}

#[test]
fn missing_capacity_is_blank() {
    let b = cells(RecordType::Booking, json!({"id": "b1"}));
    assert_eq!(b[2], None);
}

#[test]
fn user_scalars_default_to_empty() {
    let c = cells(RecordType::User, json!({"id": "u1", "name": "Ada", "phone": null}));
    assert_eq!(c, vec![s("u1"), s("Ada"), None, None, None, None]);
}

#[test]
fn non_numeric_stock_is_rendered_as_stored() {
    let c = cells(RecordType::Product, json!({"stock": "lots", "price": 80.0}));
    assert_eq!(c[3], s("lots"));
    assert_eq!(c[4], s("80"));
}

// ── Idempotence ──────────────────────────────────────────────────

#[test]
fn shaping_twice_is_identical() {
    let r = rec(json!({"id": "p1", "name": "Panel, \"A\"", "stock": 5, "price": 100}));
    assert_eq!(shape_row(RecordType::Product, &r), shape_row(RecordType::Product, &r));
}
