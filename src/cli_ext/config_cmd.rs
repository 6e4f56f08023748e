//! CLI command handler for `config get` / `config set`.

use anyhow::Result;

use crate::cli::{AppContext, ConfigArgs, ConfigSubcommand};
use crate::cli_ext::session::resolve_root;
use crate::infra::config::{
    CONFIG_FILES, config_path, get_value, load_config, load_file_config, set_value, write_config,
};

pub fn run(
    args: ConfigArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let root = resolve_root(&ctx.root)?;

    match args.command
    {
        // Effective value, env overrides included
        ConfigSubcommand::Get { key } =>
        {
            match get_value(&load_config(&root)?, &key)?
            {
                toml::Value::String(s) => println!("{s}"),
                other => println!("{other}"),
            }
        }
        ConfigSubcommand::Set { key, value } =>
        {
            // Env overrides stay out of the saved file
            let updated = set_value(&load_file_config(&root)?, &key, &value)?;

            // YAML/JSON configs are read-only here; writes always go to TOML
            let path = config_path(&root)
                .filter(|p| p.extension().is_some_and(|e| e == "toml"))
                .unwrap_or_else(|| root.join(CONFIG_FILES[0]));
            write_config(&path, &updated)?;

            if !ctx.quiet
            {
                println!("Set {key} in {}", path.display());
            }
        }
    }
    Ok(())
}
