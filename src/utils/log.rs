use log::LevelFilter;

pub struct Logger;

impl Logger {
    pub fn init(level: LevelFilter) {
        let mut builder: env_logger::Builder = colog::default_builder();
        builder.filter_level(level);
        // noisy at info
        builder.filter_module("tectonic", LevelFilter::Warn);
        builder.filter_module("reqwest", LevelFilter::Warn);
        builder.init();
    }
}
