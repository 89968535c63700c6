//! Import and export command handlers.

use std::path::Path;

use rolo_core::{Directory, ImportFile};

use crate::cli::{ExportArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn import(
    directory: &Directory,
    path: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );
    let bytes = std::fs::read(path)?;
    let file = ImportFile::from_bytes(name, bytes)?;

    let created = directory.import(&file).await?;
    output::print_output(
        &format!("Imported {} contacts from {}", created.len(), path.display()),
        global.quiet,
    );
    Ok(())
}

pub async fn export(
    directory: &Directory,
    args: &ExportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let payload = directory.export(args.format.into()).await?;

    let path = args
        .file
        .clone()
        .unwrap_or_else(|| payload.file_name().into());
    std::fs::write(&path, &payload.bytes)?;
    output::print_output(
        &format!("Exported contacts to {}", path.display()),
        global.quiet,
    );
    Ok(())
}
