use crate::runner::*;

use std::path::{Path, PathBuf};

pub fn read_file(path: &str) -> CliResult<String> {
    info!("Reading {:?}", path);
    fs::read_to_string(path).context(ReadingFileSnafu { path })
}

/// Writes to the given path, or to the standard output for `stdout`.
pub fn write_output(path: &str, contents: &str) -> CliResult<()> {
    if path == "stdout" {
        println!("{}", contents);
        return Ok(());
    }
    info!("Writing {:?}", path);
    fs::write(path, contents).context(WritingFileSnafu { path })
}

/// Resolves a path found in a configuration file against the directory of that file.
pub fn relative_to(config_path: &str, file_path: &str) -> CliResult<String> {
    if Path::new(file_path).is_absolute() {
        return Ok(file_path.to_string());
    }
    let root = Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })?;
    let p: PathBuf = root.join(file_path);
    Ok(p.display().to_string())
}
