use super::*;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

fn config() -> LaunchConfig {
    LaunchConfig {
        provider_type: PROVIDER.to_string(),
        provider_info: Value::Null,
        temporary_format: Value::Bool(true),
        extra: serde_json::Map::new(),
    }
}

/// Serve `responses` HTTP requests on localhost with the given status line.
fn health_server(status_line: &'static str, responses: usize) -> (u16, thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    let handle = thread::spawn(move || {
        for stream in listener.incoming().take(responses) {
            let mut stream = stream.expect("accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut buf).expect("read request");
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }
            let response =
                format!("HTTP/1.1 {status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            stream.write_all(response.as_bytes()).expect("write response");
        }
    });
    (port, handle)
}

fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("addr").port()
}

#[test]
fn defaults_are_written_into_the_artifact() {
    let launcher = StaticLauncher::from_params(&json!({"master_list": ["127.0.0.1"]}))
        .expect("params");
    let info = launcher.create(&config()).expect("create");
    assert_eq!(info.provider_type, "static");
    assert_eq!(
        info.provider,
        json!({
            "master_list": ["127.0.0.1"],
            "agent_list": [],
            "public_agent_list": [],
            "health_port": 80,
            "health_path": "/",
            "wait_timeout_secs": 1800,
            "wait_interval_secs": 10,
        })
    );
    let rebuilt = StaticLauncher::from_params(&info.provider).expect("rebuild");
    assert_eq!(rebuilt.params, launcher.params);
}

#[test]
fn invalid_params_are_config_errors() {
    for params in [
        json!({}),
        json!({"master_list": []}),
        json!({"master_list": ["a b"]}),
        json!({"master_list": ["m1"], "health_path": "health"}),
        json!({"master_list": ["m1"], "wait_interval_secs": 0}),
        json!({"master_list": ["m1"], "ssh_user": "core"}),
    ] {
        let err = StaticLauncher::from_params(&params).unwrap_err();
        assert_eq!(err.kind(), "ProviderConfigError", "params {params}");
    }
}

#[test]
fn unresolvable_host_fails_create_with_provision_error() {
    let launcher = StaticLauncher::from_params(&json!({
        "master_list": ["127.0.0.1"],
        "agent_list": ["no-such-host.invalid"],
    }))
    .expect("params");
    let err = launcher.create(&config()).unwrap_err();
    assert_eq!(err.kind(), "ProvisionError");
    assert!(err.to_string().contains("no-such-host.invalid"));
}

#[test]
fn wait_succeeds_repeatedly_on_a_healthy_cluster() {
    let (port, server) = health_server("200 OK", 2);
    let launcher = StaticLauncher::from_params(&json!({
        "master_list": ["127.0.0.1"],
        "health_port": port,
        "health_path": "/health",
        "wait_timeout_secs": 5,
        "wait_interval_secs": 1,
    }))
    .expect("params");
    let info = ClusterInfo::new(PROVIDER, json!({}));
    launcher.wait(&info).expect("first wait");
    launcher.wait(&info).expect("second wait");
    server.join().expect("server thread");
}

#[test]
fn wait_reports_unhealthy_after_budget() {
    let launcher = StaticLauncher::from_params(&json!({
        "master_list": ["127.0.0.1"],
        "health_port": unused_port(),
        "wait_timeout_secs": 0,
        "wait_interval_secs": 1,
    }))
    .expect("params");
    let err = launcher
        .wait(&ClusterInfo::new(PROVIDER, json!({})))
        .unwrap_err();
    assert_eq!(err.kind(), "ClusterUnhealthy");
    assert!(err.to_string().contains("1 of 1 masters unhealthy after 1 attempts"));
}

#[test]
fn non_success_status_counts_as_unhealthy() {
    let (port, server) = health_server("503 Service Unavailable", 1);
    let launcher = StaticLauncher::from_params(&json!({
        "master_list": ["127.0.0.1"],
        "health_port": port,
        "wait_timeout_secs": 0,
        "wait_interval_secs": 1,
    }))
    .expect("params");
    let err = launcher
        .wait(&ClusterInfo::new(PROVIDER, json!({})))
        .unwrap_err();
    assert!(err.to_string().contains("503"));
    server.join().expect("server thread");
}

#[test]
fn describe_lists_roles_and_endpoint() {
    let launcher = StaticLauncher::from_params(&json!({
        "master_list": ["m1"],
        "agent_list": ["a1", "a2"],
        "health_port": 8080,
    }))
    .expect("params");
    let description = launcher
        .describe(&ClusterInfo::new(PROVIDER, json!({})))
        .expect("describe");
    assert_eq!(description["agents"], json!(["a1", "a2"]));
    assert_eq!(description["health_endpoint"], json!("http://<master>:8080/"));
}

#[test]
fn delete_is_a_no_op() {
    let launcher = StaticLauncher::from_params(&json!({"master_list": ["m1"]})).expect("params");
    launcher
        .delete(&ClusterInfo::new(PROVIDER, json!({})))
        .expect("delete");
}
