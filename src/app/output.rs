//! Writing OpenVPN configurations to stdout or disk.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::storage::ServerConfig;

/// Writes the `# HOST`/`# IP`/`# COUNTRY` comment block followed by the
/// configuration bytes, unchanged.
pub fn write_config<W: Write + ?Sized>(config: &ServerConfig, out: &mut W) -> io::Result<()> {
    writeln!(out, "# HOST: {}", config.fqdn())?;
    writeln!(out, "# IP: {}", config.ip)?;
    writeln!(out, "# COUNTRY: {}", config.country_long)?;
    out.write_all(&config.config)?;
    if !config.config.ends_with(b"\n") {
        writeln!(out)?;
    }
    Ok(())
}

/// Saves the configuration under `path`.
///
/// An existing directory gets a file named by [`ServerConfig::file_name`];
/// anything else is treated as the file path itself. Missing parent
/// directories are created. Returns the path written.
pub fn save_config(config: &ServerConfig, path: &Path) -> io::Result<PathBuf> {
    let target = if path.is_dir() {
        path.join(config.file_name())
    } else {
        path.to_path_buf()
    };
    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = fs::File::create(&target)?;
    write_config(config, &mut file)?;
    file.flush()?;
    Ok(target)
}
