//! Scripted JSON-lines sessions against the console host.

use rust_decimal::Decimal;
use serde_json::{json, Value};
use tally_console_lib::run_session;
use tally_console_lib::state::{ConfigState, DocumentState};

/// Feeds `script` through a fresh session and returns the parsed
/// response lines.
fn session(script: &[Value]) -> Vec<Value> {
    let config = ConfigState::default();
    let doc = DocumentState::new(config.new_document(None));
    session_with(&doc, &config, script)
}

fn session_with(doc: &DocumentState, config: &ConfigState, script: &[Value]) -> Vec<Value> {
    let input: String = script.iter().map(|line| format!("{}\n", line)).collect();
    let mut output = Vec::new();

    let handled = run_session(input.as_bytes(), &mut output, doc, config).unwrap();
    assert_eq!(handled, script.len());

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn last_ok(responses: &[Value]) -> &Value {
    let last = responses.last().unwrap();
    assert!(last.get("ok").is_some(), "expected ok, got {}", last);
    &last["ok"]
}

#[test]
fn invoice_with_gst_and_discount() {
    let responses = session(&[
        json!({ "cmd": "add_item" }),
        json!({ "cmd": "update_item", "args": { "id": 1, "field": "description", "value": "Design" } }),
        json!({ "cmd": "update_item", "args": { "id": 1, "field": "quantity", "value": "2" } }),
        json!({ "cmd": "update_item", "args": { "id": 1, "field": "rate", "value": 500 } }),
        json!({ "cmd": "update_item_tax", "args": { "id": 1, "field": "gstRate", "value": "18" } }),
        json!({ "cmd": "set_discount", "args": { "value": "10", "type": "percentage", "enabled": true } }),
    ]);

    assert_eq!(responses.len(), 6);
    let view = last_ok(&responses);

    let item = &view["breakdown"]["items"][0];
    assert_eq!(item["display"]["amount"], "₹1000.00");
    assert_eq!(item["tax"]["mode"], "cgst_sgst");
    assert_eq!(item["display"]["cgst"], "₹90.00");
    assert_eq!(item["display"]["sgst"], "₹90.00");
    assert_eq!(item["display"]["itemTotal"], "₹1180.00");

    let totals = &view["breakdown"]["totals"];
    assert_eq!(totals["display"]["subtotal"], "₹1000.00");
    assert_eq!(totals["display"]["discountLabel"], "Discount (10%)");
    assert_eq!(totals["display"]["discount"], "₹100.00");
    assert_eq!(totals["display"]["total"], "₹900.00");
}

#[test]
fn switching_tax_mode_keeps_totals() {
    let responses = session(&[
        json!({ "cmd": "add_item" }),
        json!({ "cmd": "update_item", "args": { "id": 1, "field": "rate", "value": "500" } }),
        json!({ "cmd": "update_item_tax", "args": { "id": 1, "field": "taxRate", "value": "5" } }),
        json!({ "cmd": "set_tax_config", "args": { "taxType": "tax" } }),
        json!({ "cmd": "set_tax_config", "args": { "taxType": "none" } }),
    ]);

    let flat = &responses[3]["ok"]["breakdown"];
    assert_eq!(flat["items"][0]["tax"]["mode"], "flat");
    assert_eq!(flat["items"][0]["display"]["taxAmount"], "₹25.00");
    assert_eq!(flat["items"][0]["display"]["itemTotal"], "₹525.00");

    let none = &responses[4]["ok"]["breakdown"];
    assert_eq!(none["items"][0]["tax"]["mode"], "none");
    assert!(none["items"][0]["display"].get("taxAmount").is_none());
    assert_eq!(none["totals"], flat["totals"]);
}

#[test]
fn malformed_lines_do_not_end_the_session() {
    let config = ConfigState::default();
    let doc = DocumentState::default();
    let input = "not json\n\n{\"cmd\":\"add_item\"}\n{\"args\":{}}\n";
    let mut output = Vec::new();

    let handled = run_session(input.as_bytes(), &mut output, &doc, &config).unwrap();
    assert_eq!(handled, 3);

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines[0]["error"]["code"], "VALIDATION_ERROR");
    assert!(lines[1].get("ok").is_some());
    assert_eq!(lines[2]["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(doc.with_document(|d| d.items.len()), 1);
}

#[test]
fn error_responses() {
    let responses = session(&[
        json!({ "cmd": "print" }),
        json!({ "cmd": "mark_paid" }),
        json!({ "cmd": "mark_sent" }),
        json!({ "cmd": "remove_custom_field", "args": { "id": 4 } }),
        json!({ "cmd": "update_header", "args": { "field": "footer", "value": "x" } }),
    ]);

    assert_eq!(responses[0]["error"]["code"], "NOT_FOUND");
    assert!(responses[1].get("ok").is_some());
    assert_eq!(responses[2]["error"]["code"], "BUSINESS_LOGIC");
    assert_eq!(responses[3]["error"]["code"], "NOT_FOUND");
    assert_eq!(responses[4]["error"]["code"], "VALIDATION_ERROR");
}

#[test]
fn export_then_copy_record() {
    let config = ConfigState::default();
    let doc = DocumentState::new(config.new_document(None));

    let responses = session_with(
        &doc,
        &config,
        &[
            json!({ "cmd": "add_item" }),
            json!({ "cmd": "update_item", "args": { "id": 1, "field": "rate", "value": "600" } }),
            json!({ "cmd": "set_discount", "args": { "value": 50, "type": "fixed", "enabled": true } }),
            json!({ "cmd": "update_header", "args": { "field": "invoiceNo", "value": "INV-001" } }),
            json!({ "cmd": "export_record" }),
        ],
    );

    let record = last_ok(&responses).clone();
    assert_eq!(record["invoiceNo"], "INV-001");
    assert_eq!(record["discountHidden"], true);
    let total: Decimal = record["total"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, Decimal::from(550));

    let responses = session_with(
        &doc,
        &config,
        &[json!({ "cmd": "copy_record", "args": { "record": record } })],
    );
    let view = last_ok(&responses);
    assert_eq!(view["document"]["header"]["number"], "");
    assert_eq!(view["document"]["status"], "draft");
    assert_eq!(view["breakdown"]["totals"]["display"]["total"], "₹550.00");
}

#[test]
fn config_and_currencies() {
    let responses = session(&[
        json!({ "cmd": "get_config" }),
        json!({ "cmd": "set_currency", "args": { "code": "eur" } }),
        json!({ "cmd": "list_currencies" }),
    ]);

    assert_eq!(responses[0]["ok"]["defaultCurrency"], "INR");
    assert_eq!(responses[1]["ok"]["breakdown"]["currencySymbol"], "€");
    assert!(responses[2]["ok"].as_array().unwrap().len() > 10);
}

#[test]
fn oversized_record_ids_keep_the_session_alive() {
    let record = json!({
        "items": [{ "id": 18446744073709551615u64, "quantity": 1, "rate": 40 }],
        "selectedTaxType": "none"
    });

    let responses = session(&[
        json!({ "cmd": "load_record", "args": { "record": record } }),
        json!({ "cmd": "add_item" }),
        json!({ "cmd": "get_document" }),
    ]);

    assert_eq!(responses.len(), 3);
    let view = last_ok(&responses);
    assert_eq!(view["breakdown"]["items"][0]["id"], 1);
    assert_eq!(view["breakdown"]["items"][1]["id"], 2);
    assert_eq!(view["breakdown"]["totals"]["display"]["total"], "₹40.00");
}
