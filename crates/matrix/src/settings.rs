use crate::RoomMapping;
use std::path::Path;

/// Location of the Matrix settings file on monitoring servers.
pub const DEFAULT_PATH: &str = "/etc/zabbix/secret.d/matrix.ini";

/// Settings of the Matrix homeserver and the rooms that messages are routed to.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the homeserver. Trailing slashes are dropped.
    pub server: url::Url,
    /// Access token used as a bearer credential.
    pub token: String,
    pub rooms: RoomMapping,
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("cannot read {origin}")]
    Read {
        origin: String,
        #[source]
        source: ini::Error,
    },
    #[error("{origin}: missing section [{section}]")]
    MissingSection {
        origin: String,
        section: &'static str,
    },
    #[error("{origin}: missing '{key}' in section [{section}]")]
    MissingKey {
        origin: String,
        section: &'static str,
        key: &'static str,
    },
    #[error("{origin}: invalid homeserver URL '{url}'")]
    InvalidServer {
        origin: String,
        url: String,
        #[source]
        source: Option<url::ParseError>,
    },
}

/// KeyPrecedence selects which spelling of the `[server]` keys wins when a
/// file carries both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPrecedence {
    /// `MATRIX_SERVER` and `MATRIX_TOKEN` win over `base_url` and `access_token`.
    #[default]
    MatrixKeys,
    /// `base_url` and `access_token` win over `MATRIX_SERVER` and `MATRIX_TOKEN`.
    ClientKeys,
}

impl KeyPrecedence {
    fn server_keys(self) -> [&'static str; 2] {
        match self {
            KeyPrecedence::MatrixKeys => ["MATRIX_SERVER", "base_url"],
            KeyPrecedence::ClientKeys => ["base_url", "MATRIX_SERVER"],
        }
    }

    fn token_keys(self) -> [&'static str; 2] {
        match self {
            KeyPrecedence::MatrixKeys => ["MATRIX_TOKEN", "access_token"],
            KeyPrecedence::ClientKeys => ["access_token", "MATRIX_TOKEN"],
        }
    }
}

impl Settings {
    /// Load Settings from the INI file at `path`, preferring `MATRIX_*` keys.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        Self::load_with(path, KeyPrecedence::MatrixKeys)
    }

    /// Parse Settings from INI `content`, preferring `MATRIX_*` keys.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        Self::parse_with(content, KeyPrecedence::MatrixKeys)
    }

    /// Load Settings from the INI file at `path`.
    pub fn load_with(
        path: impl AsRef<Path>,
        precedence: KeyPrecedence,
    ) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let ini = ini::Ini::load_from_file_opt(path, parse_options())
            .map_err(|source| SettingsError::Read {
                origin: origin.clone(),
                source,
            })?;

        Self::from_ini(&ini, origin, precedence)
    }

    /// Parse Settings from INI `content`.
    pub fn parse_with(content: &str, precedence: KeyPrecedence) -> Result<Self, SettingsError> {
        let origin = "<inline>".to_string();

        let ini = ini::Ini::load_from_str_opt(content, parse_options()).map_err(|err| {
            SettingsError::Read {
                origin: origin.clone(),
                source: ini::Error::Parse(err),
            }
        })?;

        Self::from_ini(&ini, origin, precedence)
    }

    fn from_ini(
        ini: &ini::Ini,
        origin: String,
        precedence: KeyPrecedence,
    ) -> Result<Self, SettingsError> {
        let server = section(ini, "server", &origin)?;
        let rooms = section(ini, "rooms", &origin)?;

        let server_keys = precedence.server_keys();
        let token_keys = precedence.token_keys();

        let server_url = lookup(server, &server_keys).ok_or_else(|| SettingsError::MissingKey {
            origin: origin.clone(),
            section: "server",
            key: server_keys[0],
        })?;
        let token = lookup(server, &token_keys).ok_or_else(|| SettingsError::MissingKey {
            origin: origin.clone(),
            section: "server",
            key: token_keys[0],
        })?;

        let server = parse_server(server_url.trim_end_matches('/'), &origin)?;

        Ok(Settings {
            server,
            token: token.trim().to_string(),
            rooms: rooms.iter().collect(),
        })
    }
}

fn parse_options() -> ini::ParseOption {
    ini::ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

fn section<'i>(
    ini: &'i ini::Ini,
    section: &'static str,
    origin: &str,
) -> Result<&'i ini::Properties, SettingsError> {
    ini.section(Some(section))
        .ok_or_else(|| SettingsError::MissingSection {
            origin: origin.to_string(),
            section,
        })
}

// Keys are matched case-insensitively, and earlier `keys` take precedence.
// Empty values are skipped.
fn lookup<'p>(props: &'p ini::Properties, keys: &[&str]) -> Option<&'p str> {
    keys.iter().find_map(|key| {
        props
            .iter()
            .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    })
}

fn parse_server(raw: &str, origin: &str) -> Result<url::Url, SettingsError> {
    let invalid = |source| SettingsError::InvalidServer {
        origin: origin.to_string(),
        url: raw.to_string(),
        source,
    };
    let url = url::Url::parse(raw).map_err(|err| invalid(Some(err)))?;

    if url.cannot_be_a_base() {
        return Err(invalid(None));
    }
    Ok(url)
}
