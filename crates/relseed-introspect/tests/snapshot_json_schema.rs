use jsonschema::JSONSchema;
use relseed_introspect::IntrospectionSnapshot;
use schemars::schema_for;
use serde_json::json;

fn compiled_schema() -> JSONSchema {
    let schema = serde_json::to_value(schema_for!(IntrospectionSnapshot)).expect("serialize schema");
    JSONSchema::compile(&schema).expect("compile snapshot schema")
}

#[test]
fn well_formed_snapshot_validates() {
    let snapshot = json!({
        "engine": "postgres",
        "tables": [{ "schema": "public", "name": "users", "table_type": "BASE TABLE" }],
        "columns": [{
            "schema": "public",
            "table": "users",
            "name": "id",
            "ordinal_position": 1,
            "data_type": "integer",
            "is_nullable": false
        }],
        "constraints": [{
            "schema": "public",
            "table": "users",
            "name": "users_pkey",
            "constraint_type": "p",
            "columns": ["id"]
        }]
    });

    let schema = compiled_schema();
    assert!(schema.is_valid(&snapshot));
    IntrospectionSnapshot::from_json_str(&snapshot.to_string()).expect("deserialize snapshot");
}

#[test]
fn malformed_snapshot_is_rejected() {
    let schema = compiled_schema();

    assert!(!schema.is_valid(&json!({ "tables": "users" })));
    assert!(!schema.is_valid(&json!({ "engine": "oracle" })));
    assert!(!schema.is_valid(&json!({
        "columns": [{ "schema": "public", "table": "users", "name": "id" }]
    })));
}
