use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.ini";

pub fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

// Settings for a running instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    // Directory holding one JSON file per entity type.
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
}

// Values read from an INI file, all optional:
// ```
// [storage]
// data_dir = /var/lib/invoicer
//
// [server]
// bind = 0.0.0.0:8080
// ```
#[derive(Debug, Default, PartialEq)]
pub struct FileConfig {
    pub data_dir: Option<PathBuf>,
    pub bind: Option<SocketAddr>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        log::debug!("Loading config from {path:?}");
        let ini =
            ini::Ini::load_from_file(path).with_context(|| format!("Reading config {path:?}"))?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &ini::Ini) -> Result<Self> {
        let data_dir = ini
            .get_from(Some("storage"), "data_dir")
            .map(PathBuf::from);
        let bind = ini
            .get_from(Some("server"), "bind")
            .map(|s| {
                s.parse::<SocketAddr>()
                    .with_context(|| format!("Invalid bind address '{s}'"))
            })
            .transpose()?;
        Ok(Self { data_dir, bind })
    }
}

impl Config {
    // Combine explicit settings (flags or environment) with the config file.
    // Explicit settings win, then the file, then the defaults.
    pub fn resolve(
        data_dir: Option<PathBuf>,
        bind: Option<SocketAddr>,
        file: FileConfig,
    ) -> Result<Config> {
        let data_dir = match data_dir.or(file.data_dir) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        Ok(Config {
            data_dir,
            bind: bind.or(file.bind).unwrap_or_else(default_bind),
        })
    }
}

// $XDG_DATA_HOME/invoicer
pub fn default_data_dir() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix(crate::APP_NAME)?;
    Ok(dirs.get_data_home())
}

// $XDG_CONFIG_HOME/invoicer/config.ini, or any of $XDG_CONFIG_DIRS, if it exists.
pub fn default_config_file() -> Result<Option<PathBuf>> {
    let dirs = xdg::BaseDirectories::with_prefix(crate::APP_NAME)?;
    Ok(dirs.find_config_file(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Result<FileConfig> {
        FileConfig::from_ini(&ini::Ini::load_from_str(s).unwrap())
    }

    #[test]
    fn test_parse_config() {
        let actual = parse(
            "[storage]\n\
             data_dir = /srv/invoices\n\
             [server]\n\
             bind = 0.0.0.0:8080\n",
        )
        .unwrap();
        assert_eq!(
            actual,
            FileConfig {
                data_dir: Some("/srv/invoices".into()),
                bind: Some("0.0.0.0:8080".parse().unwrap()),
            }
        );
    }

    #[test]
    fn test_parse_config_partial() {
        assert_eq!(parse("").unwrap(), FileConfig::default());
        assert_eq!(
            parse("[server]\nbind = 127.0.0.1:9000\n").unwrap(),
            FileConfig {
                data_dir: None,
                bind: Some("127.0.0.1:9000".parse().unwrap()),
            }
        );
    }

    #[test]
    fn test_parse_config_bad_bind() {
        let err = parse("[server]\nbind = localhost\n").unwrap_err();
        assert_eq!(err.to_string(), "Invalid bind address 'localhost'");
    }

    #[test]
    fn test_load_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(&path, "[storage]\ndata_dir = data\n").unwrap();
        assert_eq!(
            FileConfig::load(&path).unwrap().data_dir,
            Some(PathBuf::from("data"))
        );
        assert!(FileConfig::load(&tmp.path().join("nope.ini")).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let file = || FileConfig {
            data_dir: Some("/from/file".into()),
            bind: Some("0.0.0.0:8080".parse().unwrap()),
        };

        let config = Config::resolve(None, None, file()).unwrap();
        assert_eq!(
            config,
            Config {
                data_dir: "/from/file".into(),
                bind: "0.0.0.0:8080".parse().unwrap(),
            }
        );

        let config = Config::resolve(
            Some("/from/flag".into()),
            Some("127.0.0.1:1234".parse().unwrap()),
            file(),
        )
        .unwrap();
        assert_eq!(
            config,
            Config {
                data_dir: "/from/flag".into(),
                bind: "127.0.0.1:1234".parse().unwrap(),
            }
        );

        let config = Config::resolve(Some("d".into()), None, FileConfig::default()).unwrap();
        assert_eq!(config.bind, default_bind());
    }
}
