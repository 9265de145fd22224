//! Filesystem helpers for `PostgreSQL` test clusters.

use super::BoxError;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use postgresql_embedded::Settings;
use std::io::ErrorKind;

/// Line of `postmaster.pid` holding the listening port.
const PID_FILE_PORT_LINE: usize = 3;

fn read_optional(dir: &Utf8Path, file_name: &str) -> Result<Option<String>, BoxError> {
    let handle =
        Dir::open_ambient_dir(dir, ambient_authority()).map_err(|err| Box::new(err) as BoxError)?;
    match handle.read_to_string(file_name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(Box::new(err) as BoxError),
    }
}

fn utf8(path: &std::path::Path) -> Result<&Utf8Path, BoxError> {
    Utf8Path::from_path(path).ok_or_else(|| {
        Box::new(std::io::Error::new(
            ErrorKind::InvalidData,
            format!("path is not valid UTF-8: {}", path.display()),
        )) as BoxError
    })
}

/// Picks up a generated superuser password written by the bootstrapper.
pub(super) fn sync_password_from_file(settings: &mut Settings) -> Result<(), BoxError> {
    let password_file = utf8(&settings.password_file)?;
    let (Some(dir), Some(file_name)) = (password_file.parent(), password_file.file_name()) else {
        return Ok(());
    };
    if let Some(contents) = read_optional(dir, file_name)? {
        let password = contents.trim_end();
        if !password.is_empty() {
            password.clone_into(&mut settings.password);
        }
    }
    Ok(())
}

/// Replaces the configured port with the one the postmaster bound.
pub(super) fn sync_port_from_pid(settings: &mut Settings) -> Result<(), BoxError> {
    let data_dir = utf8(&settings.data_dir)?;
    let Some(contents) = read_optional(data_dir, "postmaster.pid")? else {
        return Ok(());
    };
    if let Some(port) = contents
        .lines()
        .nth(PID_FILE_PORT_LINE)
        .and_then(|line| line.trim().parse::<u16>().ok())
    {
        settings.port = port;
    }
    Ok(())
}
