use httpwire::config::{CONFIG_ENV, Config};
use httpwire::http::connection::Limits;
use std::time::Duration;

#[test]
fn test_config_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:8080");
    assert_eq!(cfg.server.max_head_size, 64 * 1024);
    assert_eq!(cfg.server.read_timeout_secs, None);
    assert!(cfg.proxy.is_none());
}

#[test]
fn test_config_from_yaml() {
    let cfg = Config::from_yaml(
        r#"
server:
  listen_addr: "0.0.0.0:3000"
  max_head_size: 8192
  read_timeout_secs: 10
proxy:
  upstream: "http://httpbin.org"
"#,
    )
    .unwrap();

    assert_eq!(cfg.server.listen_addr, "0.0.0.0:3000");
    assert_eq!(cfg.server.max_head_size, 8192);
    assert_eq!(cfg.server.read_timeout_secs, Some(10));
    assert_eq!(cfg.server.write_timeout_secs, None);

    let proxy = cfg.proxy.unwrap();
    assert_eq!(proxy.upstream, "http://httpbin.org");
    assert_eq!(proxy.connect_timeout_secs, 5);
}

#[test]
fn test_config_partial_server_section() {
    let cfg = Config::from_yaml("server:\n  listen_addr: \"127.0.0.1:9000\"\n").unwrap();

    assert_eq!(cfg.server.listen_addr, "127.0.0.1:9000");
    assert_eq!(cfg.server.max_head_size, 64 * 1024);
    assert!(cfg.proxy.is_none());
}

#[test]
fn test_config_invalid_yaml() {
    assert!(Config::from_yaml("server: [not, a, map]").is_err());
    assert!(Config::from_yaml("proxy:\n  connect_timeout_secs: 3\n").is_err());
}

#[test]
fn test_config_limits_conversion() {
    let cfg = Config::from_yaml(
        "server:\n  max_head_size: 1024\n  read_timeout_secs: 2\n  write_timeout_secs: 3\n",
    )
    .unwrap();
    let limits = Limits::from(&cfg.server);

    assert_eq!(limits.max_head_size, 1024);
    assert_eq!(limits.read_timeout, Some(Duration::from_secs(2)));
    assert_eq!(limits.write_timeout, Some(Duration::from_secs(3)));
}

#[test]
fn test_config_from_file_and_env() {
    let path = std::env::temp_dir().join(format!("httpwire-test-{}.yaml", std::process::id()));
    std::fs::write(&path, "server:\n  listen_addr: \"127.0.0.1:7000\"\n").unwrap();

    // only test in this binary touching the environment
    unsafe {
        std::env::set_var(CONFIG_ENV, &path);
        std::env::remove_var("LISTEN");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "127.0.0.1:7000");

    unsafe {
        std::env::set_var("LISTEN", "0.0.0.0:5000");
    }
    let cfg = Config::load().unwrap();
    assert_eq!(cfg.server.listen_addr, "0.0.0.0:5000");

    unsafe {
        std::env::set_var(CONFIG_ENV, path.with_extension("missing"));
    }
    assert!(Config::load().is_err());

    unsafe {
        std::env::remove_var(CONFIG_ENV);
        std::env::remove_var("LISTEN");
    }
    std::fs::remove_file(&path).unwrap();
}
