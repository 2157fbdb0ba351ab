use std::sync::Once;

static SETUP_LOGS: Once = Once::new();

const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
pub fn setup_logger() {
    SETUP_LOGS.call_once(|| {
        let _ = build_logger().is_test(true).try_init();
    });
}

#[cfg(not(test))]
pub fn setup_logger() {
    SETUP_LOGS.call_once(|| {
        let _ = build_logger().is_test(false).try_init();
    });
}

fn build_logger() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();

    builder.format(|f, record| {
        use std::io::Write;
        let mut target = record.target();
        if let Some(rest) = target.strip_prefix(CARGO_PKG_NAME) {
            target = rest.trim_start_matches("::");
            if target.is_empty() {
                target = "pool";
            }
        }
        writeln!(
            f,
            "{} {:<5} {} > {}",
            f.timestamp_micros(),
            record.level(),
            target,
            record.args()
        )
    });

    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(log::LevelFilter::Info);
    }

    builder.parse_env("RUST_LOG");

    builder
}
