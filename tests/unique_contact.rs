//! End-to-end tests for the `unique_contact` function boundary.
//!
//! Exercises the full path the host takes: loosely-typed argument values in,
//! aggregated contact map out, including the null-argument and malformed
//! input failure modes.

use std::collections::HashMap;
use webitel_contacts::{
    CallFunctionRequest, Dynamic, DynamicValue, Function, UniqueContactFunction,
};

fn row(fields: &[(&str, &str)]) -> Dynamic {
    Dynamic::Map(
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), Dynamic::String(v.to_string())))
            .collect(),
    )
}

fn string_list(values: &[&str]) -> Dynamic {
    Dynamic::List(
        values
            .iter()
            .map(|v| Dynamic::String(v.to_string()))
            .collect(),
    )
}

fn mapping(
    label_fields: &[&str],
    variable_fields: &[&str],
    group_by_fields: &[&str],
) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(HashMap::from([
        (
            "name_field".to_string(),
            Dynamic::String("name".to_string()),
        ),
        (
            "code_field".to_string(),
            Dynamic::String("code".to_string()),
        ),
        (
            "destination_field".to_string(),
            Dynamic::String("destination".to_string()),
        ),
        ("label_fields".to_string(), string_list(label_fields)),
        ("variable_fields".to_string(), string_list(variable_fields)),
        ("group_by_fields".to_string(), string_list(group_by_fields)),
    ])))
}

async fn call(csv: DynamicValue, csv_mapping: DynamicValue) -> webitel_contacts::CallFunctionResponse {
    UniqueContactFunction::new()
        .call(CallFunctionRequest {
            arguments: vec![csv, csv_mapping],
        })
        .await
}

fn labels_of(contact: &HashMap<String, Dynamic>) -> Vec<&str> {
    contact["labels"]
        .as_list()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect()
}

fn destinations_of(contact: &HashMap<String, Dynamic>) -> Vec<(&str, &str)> {
    contact["destinations"]
        .as_list()
        .unwrap()
        .iter()
        .map(|v| {
            let d = v.as_map().unwrap();
            (
                d["code"].as_str().unwrap(),
                d["destination"].as_str().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn merges_grouped_rows() {
    let csv = DynamicValue::new(Dynamic::List(vec![
        row(&[
            ("name", "foo1"),
            ("code", "1"),
            ("destination", "123"),
            ("foo_label", "local"),
            ("foo_variable", "foo"),
            ("bar_variable", "bar"),
        ]),
        row(&[
            ("name", "foo1"),
            ("code", "1"),
            ("destination", "456"),
            ("foo_label", "local"),
            ("foo_variable", "foo"),
            ("bar_variable", "bar"),
        ]),
        row(&[
            ("name", "foo1"),
            ("code", "2"),
            ("destination", "789"),
            ("foo_label", "other"),
            ("foo_variable", "foo"),
            ("bar_variable", "bar"),
        ]),
        row(&[
            ("name", "bar1"),
            ("code", "1"),
            ("destination", "123"),
            ("foo_label", "local"),
            ("foo_variable", "foo"),
            ("bar_variable", "bar"),
        ]),
    ]));

    let response = call(
        csv,
        mapping(
            &["foo_label"],
            &["foo_variable", "bar_variable"],
            &["name", "foo_variable"],
        ),
    )
    .await;

    assert!(response.error.is_none());
    let result = response.result.unwrap();
    let contacts = result.value.as_map().unwrap();
    assert_eq!(contacts.len(), 2);

    let foo = contacts["foo1-foo"].as_map().unwrap();
    assert_eq!(foo["name"].as_str(), Some("foo1"));
    assert_eq!(labels_of(foo), vec!["local", "other"]);
    assert_eq!(
        destinations_of(foo),
        vec![("1", "+123"), ("1", "+456"), ("2", "+789")]
    );
    let variables = foo["variables"].as_map().unwrap();
    assert_eq!(variables["foo_variable"].as_str(), Some("foo"));
    assert_eq!(variables["bar_variable"].as_str(), Some("bar"));

    let bar = contacts["bar1-foo"].as_map().unwrap();
    assert_eq!(bar["name"].as_str(), Some("bar1"));
    assert_eq!(labels_of(bar), vec!["local"]);
    assert_eq!(destinations_of(bar), vec![("1", "+123")]);
}

// Mirrors the provider acceptance fixture: destination values that are not
// phone numbers still normalize to their digits, and rows with the same
// digits collapse to one destination even when their codes differ.
#[tokio::test]
async fn acceptance_fixture_semantics() {
    let csv = DynamicValue::new(Dynamic::List(vec![
        row(&[
            ("name", "foo1"),
            ("code", "1"),
            ("destination", "ami-54d2a63b"),
            ("account_id", "123"),
        ]),
        row(&[
            ("name", "foo1"),
            ("code", "1"),
            ("destination", "ami-54d2a63c"),
            ("account_id", "321"),
        ]),
        row(&[
            ("name", "foo1"),
            ("code", "2"),
            ("destination", "ami-54d2a63b"),
            ("account_id", "123"),
        ]),
        row(&[
            ("name", "bar1"),
            ("code", "m3.large"),
            ("destination", "ami-54d2a63b"),
            ("account_id", "123"),
        ]),
    ]));

    let response = call(
        csv,
        mapping(&["code", "destination"], &["name"], &["name", "account_id"]),
    )
    .await;

    assert!(response.error.is_none());
    let result = response.result.unwrap();
    let contacts = result.value.as_map().unwrap();
    assert_eq!(contacts.len(), 3);

    let foo_123 = contacts["foo1-123"].as_map().unwrap();
    assert_eq!(labels_of(foo_123), vec!["1", "ami-54d2a63b", "2"]);
    assert_eq!(destinations_of(foo_123), vec![("1", "+54263")]);
    assert_eq!(
        foo_123["variables"].as_map().unwrap()["name"].as_str(),
        Some("foo1")
    );

    let foo_321 = contacts["foo1-321"].as_map().unwrap();
    assert_eq!(labels_of(foo_321), vec!["1", "ami-54d2a63c"]);
    assert_eq!(destinations_of(foo_321), vec![("1", "+54263")]);

    let bar_123 = contacts["bar1-123"].as_map().unwrap();
    assert_eq!(bar_123["name"].as_str(), Some("bar1"));
    assert_eq!(labels_of(bar_123), vec!["m3.large", "ami-54d2a63b"]);
    assert_eq!(destinations_of(bar_123), vec![("m3.large", "+54263")]);
}

#[tokio::test]
async fn null_csv_argument_is_rejected() {
    let response = call(DynamicValue::null(), mapping(&[], &[], &[])).await;

    assert!(response.result.is_none());
    let error = response.error.unwrap();
    assert_eq!(error.text, "argument must not be null");
    assert_eq!(error.function_argument, Some(0));
}

#[tokio::test]
async fn null_mapping_argument_is_rejected() {
    let response = call(
        DynamicValue::new(Dynamic::List(vec![])),
        DynamicValue::null(),
    )
    .await;

    assert!(response.result.is_none());
    let error = response.error.unwrap();
    assert_eq!(error.text, "argument must not be null");
    assert_eq!(error.function_argument, Some(1));
}

#[tokio::test]
async fn unknown_argument_is_rejected() {
    let response = call(DynamicValue::unknown(), mapping(&[], &[], &[])).await;

    let error = response.error.unwrap();
    assert_eq!(error.text, "argument must not be null");
    assert_eq!(error.function_argument, Some(0));
}

#[tokio::test]
async fn non_list_csv_is_a_type_mismatch() {
    let response = call(
        DynamicValue::new(Dynamic::String("name,code".to_string())),
        mapping(&[], &[], &[]),
    )
    .await;

    let error = response.error.unwrap();
    assert!(error.text.contains("expected list of map"));
    assert_eq!(error.function_argument, Some(0));
}

#[tokio::test]
async fn malformed_row_is_a_type_mismatch() {
    let csv = DynamicValue::new(Dynamic::List(vec![Dynamic::Map(HashMap::from([(
        "name".to_string(),
        Dynamic::Bool(true),
    )]))]));

    let response = call(csv, mapping(&[], &[], &[])).await;

    let error = response.error.unwrap();
    assert!(error.text.contains("expected string"));
    assert_eq!(error.function_argument, Some(0));
}

#[tokio::test]
async fn empty_input_produces_empty_result() {
    let response = call(DynamicValue::new(Dynamic::List(vec![])), mapping(&[], &[], &[])).await;

    assert!(response.error.is_none());
    let result = response.result.unwrap();
    assert!(result.value.as_map().unwrap().is_empty());
}

#[tokio::test]
async fn result_survives_the_wire_codec() {
    let csv = DynamicValue::new(Dynamic::List(vec![row(&[
        ("name", "foo"),
        ("code", "1"),
        ("destination", "1-2-3"),
    ])]));

    let response = call(csv, mapping(&[], &[], &[])).await;
    let result = response.result.unwrap();

    let encoded = result.encode_msgpack().unwrap();
    let decoded = DynamicValue::decode_msgpack(&encoded).unwrap();
    assert_eq!(decoded, result);
}
