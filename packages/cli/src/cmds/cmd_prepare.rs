use cu::pre::*;

use crate::config::Config;

/// Read the C context, inject the builtin typedefs, strip comments, and
/// write the result for the upstream parser
pub fn run(config: Config) -> cu::Result<()> {
    let source = cu::fs::read_string(&config.paths.context)?;
    let source = cast::add_builtin_typedefs(&source);
    let source = cu::check!(
        cast::strip_comments(&source),
        "failed to strip comments from {}",
        config.paths.context.display()
    )?;

    if let Some(parent) = config.paths.prepared.parent() {
        cu::fs::make_dir(parent)?;
    }
    cu::fs::write(&config.paths.prepared, &source)?;
    cu::info!("prepared context written to {}", config.paths.prepared.display());
    Ok(())
}
