use env_logger::Builder;
use log::LevelFilter;

/// Init the logger, `RUST_LOG` overrides the default `info` level
pub fn init() {
    let mut builder = Builder::new();
    builder.filter(None, LevelFilter::Info).parse_default_env().init();
}
