// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end tests of the permission engine over the in-memory database.

use std::sync::Arc;
use std::thread;

use docdb_permissions::memory::{KindRegistry, MemoryDatabase};
use docdb_permissions::{
	Database, Decision, EngineState, PermissionError, PermissionsConfig, PolicyEngine,
	RequestContext, KIND_PERMISSION_TYPE, PERMISSION_KIND_ID,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn setup() -> (Arc<MemoryDatabase>, Arc<KindRegistry>, PolicyEngine) {
	let db = Arc::new(MemoryDatabase::new());
	let kinds = Arc::new(KindRegistry::new());
	let engine = PolicyEngine::new(db.clone(), kinds.clone());
	(db, kinds, engine)
}

fn grant(type_name: &str, object: &str, caller: &str, operations: Value) -> Value {
	json!({ "type": type_name, "object": object, "caller": caller, "operations": operations })
}

fn admin() -> RequestContext {
	RequestContext::admin("com.example.setup")
}

#[test]
fn example_grant_scenario() {
	let (db, _kinds, mut engine) = setup();
	{
		let lock = db.schema_lock().write();
		engine
			.put(
				&grant(
					"com.example.kind",
					"db.kind",
					"com.example.*",
					json!({ "read": "allow", "write": "deny" }),
				),
				&admin(),
				true,
				&lock,
			)
			.unwrap();
	}

	let check = |op| engine.check("com.example.kind", "db.kind", "com.example.app1", op);
	assert_eq!(check("read"), Decision::Allow);
	assert_eq!(check("write"), Decision::Deny);
	assert_eq!(check("delete"), Decision::Undefined);

	let stored = db.find_by_kind(PERMISSION_KIND_ID).unwrap();
	assert_eq!(stored.len(), 1);
	assert_eq!(
		stored[0]["_id"],
		"_permissions/com.example.kind-db.kind-com.example.*"
	);
}

#[test]
fn configure_then_empty_configure_keeps_disabled() {
	let (db, _kinds, mut engine) = setup();
	let lock = db.schema_lock().write();

	let disabled = PermissionsConfig::from_value(&json!({ "permissionsEnabled": false })).unwrap();
	engine.configure(&disabled, &admin(), &lock).unwrap();
	engine
		.configure(&PermissionsConfig::from_value(&json!({})).unwrap(), &admin(), &lock)
		.unwrap();

	assert!(!engine.is_enabled());
}

#[test]
fn close_forgets_every_grant() {
	let (db, _kinds, mut engine) = setup();
	let triples = [("a", "o1", "c1"), ("a", "o2", "c.*"), ("b", "o1", "*")];
	{
		let lock = db.schema_lock().write();
		for (t, o, c) in triples {
			engine
				.put(&grant(t, o, c, json!({ "read": "allow" })), &admin(), false, &lock)
				.unwrap();
		}
	}

	engine.close().unwrap();
	assert_eq!(engine.state(), EngineState::Closed);
	for (t, o, c) in triples {
		assert_eq!(engine.check(t, o, c, "read"), Decision::Undefined);
	}
}

#[test]
fn kind_owner_delegates_and_stranger_is_refused() {
	let (db, kinds, mut engine) = setup();
	kinds
		.put_kind(&json!({ "id": "com.example.contact:1", "owner": "com.example.contacts" }))
		.unwrap();
	let lock = db.schema_lock().write();
	engine
		.configure(&PermissionsConfig::default(), &admin(), &lock)
		.unwrap();

	// Owner lets com.friend.* update the kind.
	engine
		.put(
			&grant(
				KIND_PERMISSION_TYPE,
				"com.example.contact:1",
				"com.friend.*",
				json!({ "update": "allow" }),
			),
			&RequestContext::new("com.example.contacts"),
			true,
			&lock,
		)
		.unwrap();

	// A delegate with update rights may itself write grants on the kind.
	engine
		.put(
			&grant(
				KIND_PERMISSION_TYPE,
				"com.example.contact:1",
				"com.partner.app",
				json!({ "read": "allow" }),
			),
			&RequestContext::new("com.friend.sync"),
			true,
			&lock,
		)
		.unwrap();

	// Nobody else can grant themselves access.
	let err = engine
		.put(
			&grant(
				KIND_PERMISSION_TYPE,
				"com.example.contact:1",
				"com.evil.*",
				json!({ "update": "allow" }),
			),
			&RequestContext::new("com.evil.app"),
			true,
			&lock,
		)
		.unwrap_err();
	assert!(matches!(err, PermissionError::PermissionDenied { .. }));
	assert_eq!(
		engine.check(KIND_PERMISSION_TYPE, "com.example.contact:1", "com.evil.app", "update"),
		Decision::Undefined
	);
	assert_eq!(db.find_by_kind(PERMISSION_KIND_ID).unwrap().len(), 2);
}

#[test]
fn disabled_engine_skips_kind_self_check() {
	let (db, kinds, mut engine) = setup();
	kinds
		.put_kind(&json!({ "id": "com.example.contact:1", "owner": "com.example.contacts" }))
		.unwrap();
	let lock = db.schema_lock().write();
	engine
		.configure(&PermissionsConfig::default().with_enabled(false), &admin(), &lock)
		.unwrap();

	engine
		.put(
			&grant(
				KIND_PERMISSION_TYPE,
				"com.example.contact:1",
				"com.any.*",
				json!({ "read": "allow" }),
			),
			&RequestContext::new("com.any.app"),
			false,
			&lock,
		)
		.unwrap();
}

#[test]
fn grants_survive_reopen() {
	let db = Arc::new(MemoryDatabase::new());
	let kinds = Arc::new(KindRegistry::new());
	let config = PermissionsConfig::default().with_grant(grant("k", "builtin", "*", json!({ "read": "allow" })));

	{
		let mut engine = PolicyEngine::new(db.clone(), kinds.clone());
		let lock = db.schema_lock().write();
		engine.open(&config, &admin(), &lock).unwrap();
		engine
			.put(&grant("k", "o", "c", json!({ "write": "allow" })), &admin(), true, &lock)
			.unwrap();
		drop(lock);
		engine.close().unwrap();
	}

	let mut engine = PolicyEngine::new(db.clone(), kinds);
	let lock = db.schema_lock().write();
	engine.open(&config, &admin(), &lock).unwrap();
	drop(lock);

	assert_eq!(engine.check("k", "o", "c", "write"), Decision::Allow);
	assert_eq!(engine.check("k", "builtin", "anyone", "read"), Decision::Allow);
	// Built-ins are seeded, never stored.
	assert_eq!(db.len(), 1);
}

#[test]
fn concurrent_checks_share_one_engine() {
	let (db, _kinds, mut engine) = setup();
	{
		let lock = db.schema_lock().write();
		for i in 0..32 {
			engine
				.put(
					&grant("k", &format!("o{i}"), "app.*", json!({ "read": "allow", "write": "deny" })),
					&admin(),
					false,
					&lock,
				)
				.unwrap();
		}
	}

	let engine = Arc::new(engine);
	thread::scope(|scope| {
		for worker in 0..8 {
			let engine = Arc::clone(&engine);
			let db = &db;
			scope.spawn(move || {
				let _read = db.schema_lock().read();
				for i in 0..32 {
					let object = format!("o{i}");
					let caller = format!("app.worker{worker}");
					assert_eq!(engine.check("k", &object, &caller, "read"), Decision::Allow);
					assert_eq!(engine.check("k", &object, &caller, "write"), Decision::Deny);
					assert_eq!(engine.check("k", &object, "other", "read"), Decision::Undefined);
				}
			});
		}
	});
}

proptest! {
	#[test]
	fn put_then_check_returns_stored_decisions(
		type_name in "[a-z]{1,8}",
		object in "[a-z0-9.]{1,12}",
		caller in "[a-z]{1,6}(\\.[a-z]{1,6}){0,2}",
		ops in prop::collection::hash_map("[a-z]{1,8}", prop::bool::ANY, 1..6),
	) {
		let (db, _kinds, mut engine) = setup();
		let operations: serde_json::Map<String, Value> = ops
			.iter()
			.map(|(op, allow)| (op.clone(), json!(if *allow { "allow" } else { "deny" })))
			.collect();
		{
			let lock = db.schema_lock().write();
			engine
				.put(&grant(&type_name, &object, &caller, Value::Object(operations)), &admin(), false, &lock)
				.unwrap();
		}

		for (op, allow) in &ops {
			let expected = if *allow { Decision::Allow } else { Decision::Deny };
			prop_assert_eq!(engine.check(&type_name, &object, &caller, op), expected);
		}
	}
}
