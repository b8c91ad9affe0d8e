use relseed_core::{Error as CoreError, RelationType, RelationshipOrigin, TableKey};
use relseed_introspect::{
    Engine, IntrospectionSnapshot, MarshalOptions, SchemaBuilder, SchemaGraph, build_schema,
    marshal,
};
use serde_json::{Value, json};

fn column(table: &str, name: &str, position: i32, data_type: &str) -> Value {
    json!({
        "schema": "public",
        "table": table,
        "name": name,
        "ordinal_position": position,
        "data_type": data_type,
        "is_nullable": false
    })
}

fn key(table: &str) -> TableKey {
    TableKey::new("public", table)
}

fn shop_snapshot() -> Value {
    let mut email = column("customers", "email", 2, "character varying");
    email["character_max_length"] = json!(120);
    let mut mood = column("customers", "mood", 3, "USER-DEFINED");
    mood["udt_name"] = json!("mood");
    let mut tags = column("customers", "tags", 5, "ARRAY");
    tags["udt_name"] = json!("_text");
    let mut sku = column("products", "sku", 2, "character varying");
    sku["character_max_length"] = json!(64);
    let mut id = column("orders", "id", 1, "integer");
    id["identity_generation"] = json!("BY DEFAULT");

    json!({
        "engine": "postgres",
        "tables": [
            { "schema": "public", "name": "customers", "table_type": "BASE TABLE" },
            { "schema": "public", "name": "customer_profiles", "table_type": "BASE TABLE" },
            { "schema": "public", "name": "orders", "table_type": "BASE TABLE" },
            { "schema": "public", "name": "products", "table_type": "BASE TABLE" },
            { "schema": "public", "name": "order_items", "table_type": "BASE TABLE" },
            { "schema": "public", "name": "categories", "table_type": "BASE TABLE" },
            { "schema": "public", "name": "customer_summary", "table_type": "VIEW" },
            { "schema": "audit", "name": "events", "table_type": "BASE TABLE" }
        ],
        "columns": [
            column("customers", "id", 1, "integer"),
            email,
            mood,
            column("customers", "status", 4, "text"),
            tags,
            column("customer_profiles", "id", 1, "integer"),
            column("customer_profiles", "customer_id", 2, "integer"),
            id,
            column("orders", "customer_id", 2, "integer"),
            column("orders", "event_id", 3, "integer"),
            column("orders", "created_at", 4, "timestamp with time zone"),
            column("products", "id", 1, "integer"),
            sku,
            column("order_items", "order_id", 1, "integer"),
            column("order_items", "product_id", 2, "integer"),
            column("order_items", "quantity", 3, "integer"),
            column("categories", "id", 1, "integer"),
            column("categories", "parent_id", 2, "integer"),
            column("customer_summary", "customer_id", 1, "integer"),
            { "schema": "audit", "table": "events", "name": "id", "data_type": "integer" }
        ],
        "constraints": [
            { "schema": "public", "table": "customers", "name": "customers_pkey", "constraint_type": "p", "columns": ["id"] },
            { "schema": "public", "table": "customers", "name": "customers_email_key", "constraint_type": "u", "columns": ["email"] },
            {
                "schema": "public", "table": "customers", "name": "customers_status_check", "constraint_type": "c",
                "columns": ["status"],
                "definition": "CHECK ((status = ANY (ARRAY['active'::text, 'inactive'::text])))"
            },
            { "schema": "public", "table": "customers", "name": "customers_weird", "constraint_type": "z", "columns": ["id"] },
            { "schema": "public", "table": "customer_profiles", "name": "customer_profiles_pkey", "constraint_type": "p", "columns": ["id"] },
            { "schema": "public", "table": "customer_profiles", "name": "customer_profiles_customer_id_key", "constraint_type": "u", "columns": ["customer_id"] },
            { "schema": "public", "table": "orders", "name": "orders_pkey", "constraint_type": "p", "columns": ["id"] },
            { "schema": "public", "table": "products", "name": "products_pkey", "constraint_type": "PRIMARY KEY", "columns": ["id"] },
            {
                "schema": "public", "table": "products", "name": "products_sku_check", "constraint_type": "CHECK",
                "columns": ["sku"],
                "definition": "CHECK ((char_length((sku)::text) <= 12))"
            },
            { "schema": "public", "table": "order_items", "name": "order_items_pkey", "constraint_type": "p", "columns": ["order_id"] },
            { "schema": "public", "table": "order_items", "name": "order_items_pkey", "constraint_type": "p", "columns": ["product_id"] },
            { "schema": "public", "table": "categories", "name": "categories_pkey", "constraint_type": "p", "columns": ["id"] }
        ],
        "foreign_keys": [
            {
                "schema": "public", "table": "customer_profiles", "constraint_name": "customer_profiles_customer_id_fkey",
                "column": "customer_id", "foreign_schema": "public", "foreign_table": "customers", "foreign_column": "id"
            },
            {
                "schema": "public", "table": "orders", "constraint_name": "orders_customer_id_fkey",
                "column": "customer_id", "foreign_schema": "public", "foreign_table": "customers", "foreign_column": "id"
            },
            {
                "schema": "public", "table": "orders", "constraint_name": "orders_customer_id_fkey",
                "column": "customer_id", "foreign_schema": "public", "foreign_table": "customers", "foreign_column": "id"
            },
            {
                "schema": "public", "table": "orders", "constraint_name": "orders_event_id_fkey",
                "column": "event_id", "foreign_schema": "audit", "foreign_table": "events", "foreign_column": "id"
            },
            {
                "schema": "public", "table": "order_items", "constraint_name": "order_items_order_id_fkey",
                "column": "order_id", "foreign_schema": "public", "foreign_table": "orders", "foreign_column": "id"
            },
            {
                "schema": "public", "table": "order_items", "constraint_name": "order_items_product_id_fkey",
                "column": "product_id", "foreign_schema": "public", "foreign_table": "products", "foreign_column": "id"
            },
            {
                "schema": "public", "table": "categories", "constraint_name": "categories_parent_id_fkey",
                "column": "parent_id", "foreign_schema": "public", "foreign_table": "categories", "foreign_column": "id"
            }
        ],
        "enums": [
            { "schema": "public", "name": "mood", "labels": ["happy", "sad"] }
        ]
    })
}

fn public_only() -> MarshalOptions {
    MarshalOptions {
        schemas: Some(vec!["public".to_string()]),
        ..MarshalOptions::default()
    }
}

fn build_shop(opts: &MarshalOptions) -> SchemaGraph {
    let snapshot =
        IntrospectionSnapshot::from_json_str(&shop_snapshot().to_string()).expect("parse snapshot");
    build_schema(&snapshot, opts).expect("build schema")
}

#[test]
fn marshals_columns_flags_and_checks() {
    let snapshot =
        IntrospectionSnapshot::from_json_str(&shop_snapshot().to_string()).expect("parse snapshot");
    let tables = marshal(&snapshot, &public_only()).expect("marshal");

    assert!(!tables.contains_key(&TableKey::new("audit", "events")));

    let customers = &tables[&key("customers")];
    let names: Vec<&str> = customers.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "email", "mood", "status", "tags"]);
    assert_eq!(customers.primary_key(), vec!["id"]);
    assert_eq!(customers.constraints.len(), 3, "unknown constraint codes are skipped");

    let email = customers.column("email").expect("email");
    assert!(email.is_unique);
    assert!(!email.is_primary);
    assert_eq!(email.max_length, Some(120));

    let mood = customers.column("mood").expect("mood");
    let labels = mood.enum_type.as_ref().map(|e| e.labels.clone());
    assert_eq!(labels, Some(vec!["happy".to_string(), "sad".to_string()]));

    let status = customers.column("status").expect("status");
    assert_eq!(
        status.allowed_values,
        Some(vec!["active".to_string(), "inactive".to_string()])
    );

    let tags = customers.column("tags").expect("tags");
    assert!(tags.column_type.is_array());
    assert_eq!(tags.column_type.element_type.as_deref(), Some("text"));

    let sku = tables[&key("products")].column("sku").expect("sku");
    assert_eq!(sku.max_length, Some(12));

    let orders = &tables[&key("orders")];
    assert_eq!(orders.foreign_keys.len(), 1, "duplicate and dangling rows collapse");
    assert!(orders.column("customer_id").expect("customer_id").is_foreign_key);
    assert!(!orders.column("event_id").expect("event_id").is_foreign_key);
    assert!(orders.column("id").expect("id").identity.is_some());

    let bridge = &tables[&key("order_items")];
    assert_eq!(bridge.primary_key(), vec!["order_id", "product_id"]);
}

#[test]
fn views_carry_no_primary_key_and_can_be_excluded() {
    let with_views = build_shop(&public_only());
    let view = with_views
        .table(&key("customer_summary"))
        .expect("view kept");
    assert!(view.is_view());
    assert!(view.primary_key().is_empty());
    assert_eq!(with_views.insert_order.view_names(), vec!["customer_summary"]);

    let opts = MarshalOptions {
        include_views: false,
        ..public_only()
    };
    let without_views = build_shop(&opts);
    assert!(without_views.table(&key("customer_summary")).is_none());
    assert!(without_views.insert_order.views.is_empty());
}

#[test]
fn resolves_cardinalities_and_reciprocals() {
    let graph = build_shop(&public_only());

    let profiles = graph.table(&key("customer_profiles")).expect("profiles");
    assert_eq!(
        profiles.foreign_keys[0].relation_type,
        Some(RelationType::OneToOne)
    );

    let orders = graph.table(&key("orders")).expect("orders");
    assert_eq!(
        orders.foreign_keys[0].relation_type,
        Some(RelationType::ManyToOne)
    );

    let customers = graph.table(&key("customers")).expect("customers");
    let mirror = |related: &str| {
        customers
            .relationships
            .iter()
            .find(|rel| rel.related_table == key(related))
            .map(|rel| rel.relation_type)
    };
    assert_eq!(mirror("customer_profiles"), Some(RelationType::OneToOne));
    assert_eq!(mirror("orders"), Some(RelationType::OneToMany));

    for table in graph.tables.values() {
        for fk in &table.foreign_keys {
            assert!(fk.relation_type.is_some(), "{} left unresolved", fk.constraint_name);
        }
    }
}

#[test]
fn detects_bridge_and_links_members() {
    let graph = build_shop(&public_only());

    let bridge = graph.table(&key("order_items")).expect("bridge");
    assert!(bridge.is_bridge);
    assert!(
        bridge
            .foreign_keys
            .iter()
            .all(|fk| fk.relation_type == Some(RelationType::ManyToMany))
    );

    for (left, right) in [("orders", "products"), ("products", "orders")] {
        let table = graph.table(&key(left)).expect("member");
        assert!(
            table.relationships.iter().any(|rel| {
                rel.related_table == key(right)
                    && rel.relation_type == RelationType::ManyToMany
                    && rel.origin
                        == RelationshipOrigin::Bridge {
                            via: key("order_items"),
                        }
            }),
            "{left} should link to {right}"
        );
    }
}

#[test]
fn self_reference_is_stable_across_builds() {
    let first = build_shop(&public_only());
    let second = build_shop(&public_only());

    let edge = |graph: &SchemaGraph| {
        graph
            .table(&key("categories"))
            .map(|table| table.foreign_keys[0].relation_type)
    };
    assert_eq!(edge(&first), Some(Some(RelationType::ManyToOne)));
    assert_eq!(edge(&first), edge(&second));
}

#[test]
fn insert_order_puts_parents_first() {
    let graph = build_shop(&public_only());

    assert_eq!(
        graph.insert_order.base_table_names(),
        vec![
            "customers",
            "products",
            "categories",
            "customer_profiles",
            "orders",
            "order_items"
        ]
    );

    let order = &graph.insert_order.base_tables;
    for (position, table_key) in order.iter().enumerate() {
        let table = graph.table(table_key).expect("table");
        for fk in &table.foreign_keys {
            let target = fk.target_key();
            if &target == table_key {
                continue;
            }
            let target_position = order.iter().position(|k| k == &target).expect("target");
            assert!(target_position < position, "{target} must precede {table_key}");
        }
    }
}

#[test]
fn strict_order_reports_self_reference_cycle() {
    let graph = build_shop(&public_only());

    match graph.topological_order() {
        Err(CoreError::CycleDetected {
            members,
            partial_order,
        }) => {
            assert_eq!(members, vec![key("categories")]);
            assert_eq!(partial_order.len(), graph.tables.len() - 1);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
}

#[test]
fn strict_order_succeeds_without_cycles() {
    let snapshot = IntrospectionSnapshot::from_json_str(
        &json!({
            "tables": [
                { "schema": "public", "name": "A" },
                { "schema": "public", "name": "B" }
            ],
            "columns": [
                column("A", "id", 1, "integer"),
                column("B", "id", 1, "integer"),
                column("B", "a_id", 2, "integer")
            ],
            "constraints": [
                { "schema": "public", "table": "A", "name": "a_pkey", "constraint_type": "p", "columns": ["id"] },
                { "schema": "public", "table": "B", "name": "b_pkey", "constraint_type": "p", "columns": ["id"] }
            ],
            "foreign_keys": [
                {
                    "schema": "public", "table": "B", "constraint_name": "b_a_id_fkey",
                    "column": "a_id", "foreign_schema": "public", "foreign_table": "A", "foreign_column": "id"
                }
            ]
        })
        .to_string(),
    )
    .expect("parse snapshot");

    let graph = SchemaBuilder::from_snapshot(&snapshot, &MarshalOptions::default())
        .expect("marshal")
        .build();
    let strict = graph.topological_order().expect("acyclic");
    assert_eq!(strict, vec![key("A"), key("B")]);
    assert_eq!(graph.insert_order.base_table_names(), vec!["A", "B"]);
    assert!(graph.insert_order.views.is_empty());
}

#[test]
fn mysql_snapshot_uses_inline_enums() {
    let snapshot = IntrospectionSnapshot::from_json_str(
        &json!({
            "engine": "mysql",
            "tables": [{ "schema": "shop", "name": "shirts" }],
            "columns": [
                { "schema": "shop", "table": "shirts", "name": "id", "ordinal_position": 1, "data_type": "int(10) unsigned" },
                { "schema": "shop", "table": "shirts", "name": "size", "ordinal_position": 2, "data_type": "enum('small','large')" },
                { "schema": "shop", "table": "shirts", "name": "in_stock", "ordinal_position": 3, "data_type": "tinyint(1)" }
            ]
        })
        .to_string(),
    )
    .expect("parse snapshot");
    assert_eq!(snapshot.engine, Some(Engine::Mysql));

    let tables = marshal(&snapshot, &MarshalOptions::default()).expect("marshal");
    let shirts = &tables[&TableKey::new("shop", "shirts")];

    assert_eq!(shirts.column("id").expect("id").column_type.native_type, "int");
    let size = shirts.column("size").expect("size");
    assert_eq!(
        size.enum_type.as_ref().map(|e| e.labels.clone()),
        Some(vec!["small".to_string(), "large".to_string()])
    );
    assert!(shirts.column("in_stock").expect("in_stock").column_type.is_boolean());
}

#[test]
fn blank_table_name_is_rejected() {
    let snapshot = IntrospectionSnapshot::from_json_str(
        &json!({ "tables": [{ "schema": "public", "name": " " }] }).to_string(),
    )
    .expect("parse snapshot");

    assert!(marshal(&snapshot, &MarshalOptions::default()).is_err());
}
