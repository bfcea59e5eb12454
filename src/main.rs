use env_logger::Env;
use vantage::{EditorConfig, EngineError};

fn main() -> Result<(), EngineError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    vantage::run(EditorConfig::new())
}
