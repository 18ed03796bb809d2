use cu::pre::*;

use cast::ParseOutput;

use crate::config::Config;

/// Consume the upstream parser's output, build the type map, and write
/// the dump artifacts
pub fn run(config: Config) -> cu::Result<()> {
    let source = cu::fs::read_string(&config.paths.prepared)?;
    let ast_json = cu::fs::read_string(&config.paths.ast)?;
    let output = json::parse::<ParseOutput>(&ast_json)?;
    let ast = output.into_ast(&source)?;
    cu::debug!("loaded AST with {} top-level items", ast.items.len());

    let map = cu::check!(typemap::build_typemap(&ast), "failed to build type map")?;
    cu::info!(
        "type map: {} variables, {} functions, {} structs",
        map.var_types.len(),
        map.functions.len(),
        map.named_structs.len()
    );

    if let Some(parent) = config.paths.dump.parent() {
        cu::fs::make_dir(parent)?;
    }
    let dump = typemap::dump_typemap(&map);
    cu::fs::write(&config.paths.dump, &dump)?;
    cu::info!("type map dump written to {}", config.paths.dump.display());

    if let Some(map_yaml) = &config.paths.map_yaml {
        let text = yaml::stringify(&map)?;
        cu::fs::write(map_yaml, &text)?;
        cu::info!("type map YAML written to {}", map_yaml.display());
    }
    Ok(())
}
