//! End-to-end checks of the line-item model, the engine and the document
//! record, driven only through the public API.

use rust_decimal::Decimal;
use tally_core::document::{Document, DocumentRecord};
use tally_core::engine::{self, ItemTax};
use tally_core::line_item::{ItemField, LineItem, LineItems, TaxField};
use tally_core::types::{DiscountSpec, DocumentStatus, GstMode, TaxConfig};
use tally_core::{parse_number_or_zero, CoreError, Money};

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn m(s: &str) -> Money {
    Money::new(d(s))
}

/// One item per `(quantity, rate)` pair.
fn items_with(rows: &[(&str, &str)]) -> LineItems {
    let mut items = LineItems::new();
    for (qty, rate) in rows {
        let id = items.add_item();
        items.update_item(id, ItemField::Quantity, qty);
        items.update_item(id, ItemField::Rate, rate);
    }
    items
}

#[test]
fn amount_tracks_every_quantity_and_rate_edit() {
    let mut items = LineItems::new();
    let id = items.add_item();

    let edits = [
        (ItemField::Quantity, "3"),
        (ItemField::Rate, "19.99"),
        (ItemField::Quantity, "0.5"),
        (ItemField::Rate, ""),
        (ItemField::Rate, "7.25"),
        (ItemField::Quantity, "x"),
        (ItemField::Quantity, "12"),
    ];

    for (field, value) in edits {
        items.update_item(id, field, value);
        let item = items.get(id).unwrap();
        assert_eq!(item.amount(), item.rate().times(item.quantity()));
    }
    assert_eq!(items.get(id).unwrap().amount(), m("87"));
}

#[test]
fn empty_collection_has_zero_totals() {
    for tax in [
        TaxConfig::None,
        TaxConfig::Flat,
        TaxConfig::Gst(GstMode::Igst),
        TaxConfig::Gst(GstMode::CgstSgst),
    ] {
        let b = engine::compute(&[], &DiscountSpec::fixed(d("25")), tax, "$");
        assert_eq!(b.totals.subtotal, Money::zero());
        assert_eq!(b.totals.total, m("-25"));
    }

    let b = engine::compute(&[], &DiscountSpec::percentage(d("10")), TaxConfig::None, "$");
    assert_eq!(b.totals.subtotal, Money::zero());
    assert_eq!(b.totals.discount_amount, Money::zero());
    assert_eq!(b.totals.total, Money::zero());
}

#[test]
fn percentage_discount_on_three_items() {
    let items = items_with(&[("1", "100"), ("1", "200"), ("1", "300")]);
    let b = engine::compute(
        items.as_slice(),
        &DiscountSpec::percentage(d("10")),
        TaxConfig::None,
        "₹",
    );

    assert_eq!(b.totals.subtotal, m("600"));
    assert_eq!(b.totals.discount_amount, m("60"));
    assert_eq!(b.totals.total, m("540"));
    assert_eq!(b.totals.display.total, "₹540.00");
}

#[test]
fn fixed_discount_is_taken_verbatim() {
    let items = items_with(&[("2", "300")]);
    let b = engine::compute(
        items.as_slice(),
        &DiscountSpec::fixed(d("50")),
        TaxConfig::None,
        "₹",
    );

    assert_eq!(b.totals.discount_amount, m("50"));
    assert_eq!(b.totals.total, m("550"));
}

#[test]
fn disabled_discount_applies_nothing() {
    let items = items_with(&[("1", "600")]);
    for discount in [DiscountSpec::percentage(d("50")), DiscountSpec::fixed(d("50"))] {
        let disabled = DiscountSpec {
            enabled: false,
            ..discount
        };
        let b = engine::compute(items.as_slice(), &disabled, TaxConfig::None, "₹");
        assert_eq!(b.totals.discount_amount, Money::zero());
        assert_eq!(b.totals.total, m("600"));
    }
}

#[test]
fn gst_split_is_symmetric_and_matches_igst() {
    let mut items = items_with(&[("1", "1000")]);
    items.update_item_tax(1, TaxField::GstRate, "18");

    let split = engine::compute(
        items.as_slice(),
        &DiscountSpec::default(),
        TaxConfig::Gst(GstMode::CgstSgst),
        "₹",
    );
    let single = engine::compute(
        items.as_slice(),
        &DiscountSpec::default(),
        TaxConfig::Gst(GstMode::Igst),
        "₹",
    );

    let row = &split.items[0];
    assert_eq!(
        row.tax,
        ItemTax::CgstSgst {
            rate: items.as_slice()[0].gst_rate(),
            cgst: m("90"),
            sgst: m("90"),
        }
    );
    assert_eq!(row.item_total, m("1180"));
    assert_eq!(single.items[0].item_total, row.item_total);
    assert_eq!(row.display.sgst.as_deref(), Some("₹90.00"));
}

#[test]
fn flat_tax_on_one_item() {
    let mut items = items_with(&[("1", "500")]);
    items.update_item_tax(1, TaxField::TaxRate, "5");

    let b = engine::compute(items.as_slice(), &DiscountSpec::default(), TaxConfig::Flat, "₹");
    assert_eq!(b.items[0].tax.total(), m("25"));
    assert_eq!(b.items[0].item_total, m("525"));
}

#[test]
fn switching_gst_off_drops_tax_fields_and_keeps_totals() {
    let mut doc = Document::default();
    let id = doc.add_item();
    doc.update_item(id, ItemField::Rate, "1000");
    doc.update_item_tax(id, TaxField::GstRate, "18");

    let with_gst = doc.breakdown();
    doc.set_tax_config(TaxConfig::None);
    let without = doc.breakdown();

    assert_eq!(without.items[0].tax, ItemTax::None);
    assert!(without.items[0].display.cgst.is_none());
    assert_eq!(without.items[0].item_total, m("1000"));
    assert_eq!(without.totals, with_gst.totals);

    // rates survive the round trip through another mode
    doc.set_tax_config(TaxConfig::Gst(GstMode::CgstSgst));
    assert_eq!(doc.breakdown().items[0].item_total, m("1180"));
}

#[test]
fn new_ids_are_past_the_maximum() {
    let mut items = LineItems::new();
    assert_eq!(items.add_item(), 1);

    for _ in 0..4 {
        items.add_item();
    }
    items.remove_item(1);
    items.remove_item(3);
    assert_eq!(items.add_item(), 6);

    items.clear();
    assert_eq!(items.add_item(), 1);
}

#[test]
fn lenient_parsing_examples() {
    assert_eq!(parse_number_or_zero("12.5kg"), d("12.5"));
    assert_eq!(parse_number_or_zero(" 3"), d("3"));
    assert_eq!(parse_number_or_zero(".5"), d("0.5"));
    assert_eq!(parse_number_or_zero("1e2"), d("100"));
    assert_eq!(parse_number_or_zero(""), Decimal::ZERO);
    assert_eq!(parse_number_or_zero("Infinity"), Decimal::ZERO);
}

#[test]
fn record_round_trip_preserves_the_document() {
    let mut doc = Document::default();
    let a = doc.add_item();
    doc.update_item(a, ItemField::Description, "Consulting");
    doc.update_item(a, ItemField::Quantity, "2.5");
    doc.update_item(a, ItemField::Rate, "1200");
    doc.update_item_tax(a, TaxField::GstRate, "18");
    let b = doc.add_item();
    doc.update_item(b, ItemField::Rate, "99.99");
    doc.update_item_tax(b, TaxField::TaxRate, "12.5");
    doc.set_discount_value("7.5");
    doc.set_discount_enabled(true);
    doc.set_tax_config(TaxConfig::Gst(GstMode::Igst));
    doc.set_currency("usd");

    let json = serde_json::to_string(&doc.to_record()).unwrap();
    let record: DocumentRecord = serde_json::from_str(&json).unwrap();
    let restored = Document::from_record(record);

    assert_eq!(restored.id, doc.id);
    assert_eq!(restored.items, doc.items);
    assert_eq!(restored.discount, doc.discount);
    assert_eq!(restored.tax, doc.tax);
    assert_eq!(restored.currency, "USD");
    assert_eq!(restored.breakdown(), doc.breakdown());
}

#[test]
fn stored_amounts_are_recomputed() {
    let record: DocumentRecord = serde_json::from_value(serde_json::json!({
        "items": [{ "id": 1, "quantity": 4, "rate": "25", "amount": "1" }],
        "subtotal": "1.00",
        "total": "1.00",
        "selectedTaxType": "none"
    }))
    .unwrap();

    let doc = Document::from_record(record);
    assert_eq!(doc.items.get(1).unwrap().amount(), m("100"));
    assert_eq!(doc.totals().total, m("100"));
}

#[test]
fn oversized_stored_ids_are_renumbered() {
    let record: DocumentRecord = serde_json::from_value(serde_json::json!({
        "items": [
            { "id": 18446744073709551615u64, "quantity": 1, "rate": 10 },
            { "id": 18446744073709551615u64, "quantity": 2, "rate": 10 },
            { "id": 2, "quantity": 3, "rate": 10 }
        ],
        "customFields": [
            { "id": 18446744073709551615u64, "label": "PO", "value": "1" },
            { "id": 0, "label": "Ref", "value": "2" }
        ],
        "selectedTaxType": "none"
    }))
    .unwrap();

    let mut doc = Document::from_record(record);

    let ids: Vec<u64> = doc.items.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec![3, 4, 2]);
    assert_eq!(doc.totals().total, m("60"));
    assert_eq!(doc.add_item(), 5);

    let field_ids: Vec<u64> = doc.header.custom_fields.iter().map(|f| f.id).collect();
    assert_eq!(field_ids, vec![1, 2]);
    assert_eq!(doc.add_custom_field(), 3);
}

#[test]
fn id_allocation_never_overflows() {
    let mut items = LineItems::from_items(vec![
        LineItem::new(1),
        LineItem::new(tally_core::ids::MAX_ID),
    ]);

    assert_eq!(items.add_item(), 2);
    assert_eq!(items.add_item(), 3);
    assert_eq!(items.len(), 4);
}

#[test]
fn copied_document_is_a_fresh_draft() {
    let mut doc = Document::default();
    let id = doc.add_item();
    doc.update_item(id, ItemField::Rate, "450");
    doc.update_header(tally_core::document::HeaderField::Number, "INV-7");
    doc.mark_paid().unwrap();

    let copy = Document::copy_from_record(doc.to_record());
    assert_ne!(copy.id, doc.id);
    assert_eq!(copy.status(), DocumentStatus::Draft);
    assert!(copy.header.number.is_empty());
    assert!(copy.paid_at().is_none());
    assert_eq!(copy.items, doc.items);
    assert_eq!(copy.totals(), doc.totals());
}

#[test]
fn paid_document_cannot_be_sent_again() {
    let mut doc = Document::default();
    doc.mark_sent().unwrap();
    doc.mark_paid().unwrap();

    match doc.mark_sent() {
        Err(CoreError::InvalidStatusTransition { from, to, .. }) => {
            assert_eq!(from, DocumentStatus::Paid);
            assert_eq!(to, DocumentStatus::Sent);
        }
        other => panic!("expected a rejected transition, got {other:?}"),
    }
    assert_eq!(doc.status(), DocumentStatus::Paid);
}
