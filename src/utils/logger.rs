use std::io::Write;

use chrono::Utc;
use env_logger::Env;
use serde_json::json;

/// Installs `env_logger` writing one JSON object per line. Level comes from `RUST_LOG`
/// and defaults to `info`.
pub fn init(role_name: &str, env: &str) {
    let role_name = role_name.to_string();
    let env = env.to_string();

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(move |buf, record| {
            let line = json!({
                "timestamp": Utc::now().to_rfc3339(),
                "level": record.level().to_string(),
                "target": record.target(),
                "role": role_name,
                "env": env,
                "message": record.args().to_string(),
            });
            writeln!(buf, "{}", line)
        })
        .init();
}
