use super::Config;
use crate::error::LoopMirrorError;
use config::Config as ConfigBuilder;

pub const ENV_PREFIX: &str = "LOOPMIRROR";

pub fn load_config(config_path: Option<&str>) -> Result<Config, LoopMirrorError> {
    let mut builder = ConfigBuilder::builder();
    if let Some(config_path) = config_path {
        builder = builder.add_source(config::File::with_name(config_path));
    }

    let config_builder = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("categories")
                .with_list_parse_key("years")
                .try_parsing(true),
        )
        .build()?;

    config_builder.try_deserialize().map_err(Into::into)
}
