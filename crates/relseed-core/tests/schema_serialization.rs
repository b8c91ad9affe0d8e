use relseed_core::{
    Column, ColumnType, Constraint, ConstraintKind, ForeignKey, RelationType, Relationship,
    RelationshipOrigin, Table, TableKey, TableType,
};
use serde_json::json;

fn orders_table() -> Table {
    let mut table = Table::new("public", "orders", TableType::BaseTable);
    let mut id = Column::new("id", ColumnType::plain("integer"));
    id.is_primary = true;
    id.is_nullable = false;
    table.columns.push(id);
    table.constraints.push(Constraint {
        name: "orders_pkey".to_string(),
        kind: ConstraintKind::PrimaryKey,
        columns: vec!["id".to_string()],
        definition: None,
    });
    table.foreign_keys.push(ForeignKey {
        constraint_name: "orders_customer_id_fkey".to_string(),
        column: "customer_id".to_string(),
        target_schema: "public".to_string(),
        target_table: "customers".to_string(),
        target_column: "id".to_string(),
        relation_type: Some(RelationType::ManyToOne),
    });
    table
}

#[test]
fn enums_use_stable_wire_names() {
    let table = orders_table();
    let value = serde_json::to_value(&table).expect("serialize table");

    assert_eq!(value["table_type"], json!("BASE_TABLE"));
    assert_eq!(value["constraints"][0]["kind"], json!("primary_key"));
    assert_eq!(value["foreign_keys"][0]["relation_type"], json!("MANY_TO_ONE"));
    assert_eq!(value["columns"][0]["is_primary"], json!(true));
}

#[test]
fn relationship_origin_is_tagged() {
    let relationship = Relationship {
        table: TableKey::new("public", "students"),
        related_table: TableKey::new("public", "courses"),
        relation_type: RelationType::ManyToMany,
        origin: RelationshipOrigin::Bridge {
            via: TableKey::new("public", "enrollments"),
        },
    };

    let value = serde_json::to_value(&relationship).expect("serialize relationship");
    assert_eq!(
        value,
        json!({
            "table": { "schema": "public", "name": "students" },
            "related_table": { "schema": "public", "name": "courses" },
            "relation_type": "MANY_TO_MANY",
            "origin": {
                "kind": "bridge",
                "via": { "schema": "public", "name": "enrollments" }
            }
        })
    );
}

#[test]
fn table_round_trips_through_json() {
    let table = orders_table();
    let json = serde_json::to_string_pretty(&table).expect("serialize table");
    let back: Table = serde_json::from_str(&json).expect("deserialize table");

    assert_eq!(back.key(), table.key());
    assert_eq!(back.primary_key(), vec!["id"]);
    assert_eq!(back.foreign_keys, table.foreign_keys);
}
