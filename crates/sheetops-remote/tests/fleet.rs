use sheetops_remote::{ConnectOptions, Fleet, HostKeyPolicy, RemoteExecutor, RemoteTarget};
use sheetops_testkit::ScriptedTransport;

fn fleet(transport: ScriptedTransport, workers: usize) -> Fleet<ScriptedTransport> {
    let executor = RemoteExecutor::new(transport, ConnectOptions::new(HostKeyPolicy::AcceptAny));
    Fleet::new(executor, workers).unwrap()
}

fn targets() -> Vec<RemoteTarget> {
    vec![
        RemoteTarget::new("alpha", 22, "root", "a"),
        RemoteTarget::new("down", 22, "root", "b"),
        RemoteTarget::new("gamma", 2222, "ops", "c"),
    ]
}

#[test]
fn one_failed_target_leaves_the_others_intact() {
    let transport = ScriptedTransport::new()
        .respond("hostname", "node")
        .refuse_host("down");
    let report = fleet(transport.clone(), 2).run(&targets(), &["hostname"]);

    let keys: Vec<&str> = report.outcomes().iter().map(|o| o.key.as_str()).collect();
    assert_eq!(keys, vec!["root@alpha:22", "root@down:22", "ops@gamma:2222"]);
    assert!(!report.is_success());
    assert_eq!(report.failures().count(), 1);

    let alpha = report.get("root@alpha:22").unwrap();
    assert_eq!(alpha.result.as_ref().unwrap().render(), "node\n");
    assert!(report.get("root@down:22").unwrap().result.is_err());
    assert!(report.get("ops@gamma:2222").unwrap().is_success());

    let log = transport.log();
    assert_eq!(log.sessions_opened, log.sessions_closed);
    assert_eq!(log.connections.len(), log.disconnections.len());
}

#[test]
fn render_sections_by_target() {
    let transport = ScriptedTransport::new()
        .respond("hostname", "node")
        .refuse_host("down");
    let report = fleet(transport, 1).run(&targets(), &["hostname"]);
    let text = report.render();

    assert!(text.starts_with("== root@alpha:22 ==\nnode\n"));
    assert!(text.contains("== root@down:22 ==\nerror: connection to root@down:22 failed: connection refused\n"));
    assert!(text.ends_with("== ops@gamma:2222 ==\nnode\n"));
}

#[test]
fn repeated_targets_get_distinct_keys() {
    let transport = ScriptedTransport::new()
        .respond("whoami", "root")
        .refuse_host("down");
    let targets = vec![
        RemoteTarget::new("alpha", 22, "root", "first"),
        RemoteTarget::new("down", 22, "root", "b"),
        RemoteTarget::new("alpha", 22, "root", "second"),
        RemoteTarget::new("alpha", 22, "root", "third"),
    ];
    let report = fleet(transport.clone(), 2).run(&targets, &["whoami"]);

    let keys: Vec<&str> = report.outcomes().iter().map(|o| o.key.as_str()).collect();
    assert_eq!(
        keys,
        vec!["root@alpha:22", "root@down:22", "root@alpha:22#2", "root@alpha:22#3"]
    );
    for key in ["root@alpha:22", "root@alpha:22#2", "root@alpha:22#3"] {
        assert!(report.get(key).unwrap().is_success(), "{key}");
    }
    assert!(report.get("root@down:22").unwrap().result.is_err());
    assert!(report.render().contains("== root@alpha:22#2 ==\nroot\n"));
    assert_eq!(transport.log().connections.len(), 3);
}

#[test]
fn zero_workers_means_one() {
    assert_eq!(fleet(ScriptedTransport::new(), 0).max_workers(), 1);
}

#[test]
fn no_targets_no_work() {
    let transport = ScriptedTransport::new();
    let report = fleet(transport.clone(), 4).run::<&str>(&[], &["uptime"]);
    assert!(report.is_empty());
    assert!(report.is_success());
    assert!(transport.log().connections.is_empty());
}
