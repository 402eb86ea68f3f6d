use directories::ProjectDirs;
use std::{
    error::Error,
    fmt::Display,
    fs::OpenOptions,
    io::{self, Read, Write},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use serde::{Deserialize, Serialize};

static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("org", "gravity-trails", "gravity_trails_demo"));
static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    PROJECT_DIRS
        .as_ref()
        .map(|dir| dir.config_dir().join("config.toml"))
});

/// The platform preferences file, if the platform has a config directory.
pub fn default_path() -> Option<&'static Path> {
    CONFIG_PATH.as_deref()
}

fn resolve(path: Option<&Path>) -> Option<&Path> {
    path.or_else(|| default_path())
}

fn get_table(cfg_path: &Path) -> toml::value::Table {
    let Ok(mut file) = OpenOptions::new().read(true).open(cfg_path) else {
        return toml::value::Table::new();
    };

    let mut string = String::new();
    let Ok(_) = file.read_to_string(&mut string) else {
        return toml::value::Table::new();
    };

    toml::from_str(&string).unwrap_or_default()
}

/// Stores `value` under `key`, keeping every other key in the file.
///
/// The file is rewritten through a temporary sibling and a rename so a
/// crash mid-write never leaves a truncated file behind.
pub(crate) fn save<T: Serialize>(path: Option<&Path>, key: &str, value: T) -> Result<(), SaveError> {
    let cfg_path = resolve(path).ok_or(SaveError::NoSaveDirectory)?;
    let cfg_dir = cfg_path.parent().ok_or(SaveError::NoSaveDirectory)?;
    let tmp_path = cfg_path.with_extension("toml.tmp");

    let value = toml::Value::try_from(value).map_err(SaveError::SerializeValue)?;

    std::fs::create_dir_all(cfg_dir).map_err(SaveError::CreateConfigDir)?;

    let mut table = get_table(cfg_path);

    let mut tmp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)
        .map_err(SaveError::OpenTmpFile)?;

    table.insert(key.to_string(), value);
    let table_string = toml::to_string(&table).map_err(SaveError::StringifyTable)?;

    tmp_file
        .write_all(table_string.as_bytes())
        .map_err(SaveError::Write)?;
    tmp_file.flush().map_err(SaveError::Write)?;
    drop(tmp_file);

    std::fs::rename(&tmp_path, cfg_path).map_err(SaveError::Rename)?;

    Ok(())
}

pub(crate) fn load<T: for<'d> Deserialize<'d>>(path: Option<&Path>, key: &str) -> Result<T, LoadError> {
    let cfg_path = resolve(path).ok_or(LoadError::NoSaveDirectory)?;
    let mut file = OpenOptions::new()
        .read(true)
        .open(cfg_path)
        .map_err(LoadError::OpenFile)?;

    let mut string = String::new();
    file.read_to_string(&mut string)
        .map_err(LoadError::ReadFile)?;
    drop(file);

    let mut table: toml::value::Table =
        toml::from_str(&string).map_err(LoadError::DeserializeFile)?;

    let value = table.remove(key).ok_or(LoadError::NotFoundInTable)?;
    value.try_into().map_err(LoadError::DeserializeValue)
}

/// Deletes the preferences file. A missing file is not an error.
pub(crate) fn reset(path: Option<&Path>) -> Result<(), ResetError> {
    let Some(file) = resolve(path) else {
        return Ok(());
    };
    match std::fs::remove_file(file) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ResetError::DeleteConfig(e)),
    }
}

#[derive(Debug)]
pub enum SaveError {
    NoSaveDirectory,
    SerializeValue(toml::ser::Error),
    CreateConfigDir(io::Error),
    OpenTmpFile(io::Error),
    StringifyTable(toml::ser::Error),
    Write(io::Error),
    Rename(io::Error),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::NoSaveDirectory => write!(f, "No reasonable save directory was found"),
            SaveError::SerializeValue(error) => write!(f, "SerializeValue: {error}"),
            SaveError::CreateConfigDir(error) => write!(f, "CreateConfigDir: {error}"),
            SaveError::OpenTmpFile(error) => write!(f, "OpenTmpFile: {error}"),
            SaveError::StringifyTable(error) => write!(f, "StringifyTable: {error}"),
            SaveError::Write(error) => write!(f, "Write: {error}"),
            SaveError::Rename(error) => write!(f, "Rename: {error}"),
        }
    }
}

impl Error for SaveError {}

#[derive(Debug)]
pub enum LoadError {
    NoSaveDirectory,
    OpenFile(io::Error),
    ReadFile(io::Error),
    DeserializeFile(toml::de::Error),
    NotFoundInTable,
    DeserializeValue(toml::de::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::NoSaveDirectory => write!(f, "No reasonable save directory was found"),
            LoadError::OpenFile(error) => write!(f, "OpenFile: {error}"),
            LoadError::ReadFile(error) => write!(f, "ReadFile: {error}"),
            LoadError::DeserializeFile(error) => write!(f, "DeserializeFile: {error}"),
            LoadError::NotFoundInTable => write!(f, "Key not found in table"),
            LoadError::DeserializeValue(error) => write!(f, "DeserializeValue: {error}"),
        }
    }
}

impl Error for LoadError {}

#[derive(Debug)]
pub enum ResetError {
    DeleteConfig(io::Error),
}

impl Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::DeleteConfig(error) => write!(f, "DeleteConfig: {error}"),
        }
    }
}

impl Error for ResetError {}
