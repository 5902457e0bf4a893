fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    tunevibes::app::run(std::env::args().skip(1).collect())
}
