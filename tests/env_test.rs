//! Environment overrides for the service settings.
//!
//! Kept in its own test binary with a single test, since the process
//! environment is shared between threads.

use story_chat::config::ServiceConfig;
use story_chat::transport::{ClientConfig, TransportKind};

#[test]
fn env_overrides_config_file() {
    let file = ServiceConfig {
        endpoint: "http://from-file.local/chat".to_string(),
        session: Some("file-session".to_string()),
        transport: TransportKind::OneShot,
    };

    // Nothing set: the file wins.
    std::env::remove_var("STORY_CHAT_ENDPOINT");
    std::env::remove_var("STORY_CHAT_SESSION");
    std::env::remove_var("STORY_CHAT_TRANSPORT");
    let config = ClientConfig::from_env_and_config(&file).unwrap();
    assert_eq!(config.endpoint.as_str(), "http://from-file.local/chat");
    assert_eq!(config.session, "file-session");
    assert_eq!(config.kind, TransportKind::OneShot);

    // Everything set: the environment wins.
    std::env::set_var("STORY_CHAT_ENDPOINT", "http://from-env.local:7000/chat");
    std::env::set_var("STORY_CHAT_SESSION", "env-session");
    std::env::set_var("STORY_CHAT_TRANSPORT", "streaming");
    let config = ClientConfig::from_env_and_config(&file).unwrap();
    assert_eq!(config.endpoint.as_str(), "http://from-env.local:7000/chat");
    assert_eq!(config.session, "env-session");
    assert_eq!(config.kind, TransportKind::Streamed);

    // A bad transport name is a startup error.
    std::env::set_var("STORY_CHAT_TRANSPORT", "smoke-signals");
    assert!(ClientConfig::from_env_and_config(&file).is_err());

    // So is an empty endpoint.
    std::env::set_var("STORY_CHAT_TRANSPORT", "oneshot");
    std::env::set_var("STORY_CHAT_ENDPOINT", "  ");
    assert!(ClientConfig::from_env_and_config(&file).is_err());
}
