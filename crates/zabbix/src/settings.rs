use std::path::{Path, PathBuf};

/// Location of the Zabbix API settings file on monitoring servers.
pub const DEFAULT_PATH: &str = "/etc/zabbix/secret.d/zabbix_api.ini";

/// Settings of the Zabbix API endpoint, read from the `[zabbix]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// JSON-RPC endpoint, typically `https://<host>/api_jsonrpc.php`.
    pub url: url::Url,
    /// API token sent as the request `auth`.
    pub token: String,
    /// Whether server certificates are verified.
    pub verify_tls: bool,
    /// PEM bundle of trusted CAs, used in place of the built-in roots when verifying.
    pub cafile: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("cannot read {origin}")]
    Read {
        origin: String,
        #[source]
        source: ini::Error,
    },
    #[error("{origin}: missing section [zabbix]")]
    MissingSection { origin: String },
    #[error("{origin}: missing '{key}' in section [zabbix]")]
    MissingKey { origin: String, key: &'static str },
    #[error("{origin}: invalid API URL '{url}'")]
    InvalidUrl {
        origin: String,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let origin = path.display().to_string();

        let ini = ini::Ini::load_from_file_opt(path, parse_options())
            .map_err(|source| SettingsError::Read {
                origin: origin.clone(),
                source,
            })?;

        Self::from_ini(&ini, origin)
    }

    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let origin = "<inline>".to_string();

        let ini = ini::Ini::load_from_str_opt(content, parse_options()).map_err(|err| {
            SettingsError::Read {
                origin: origin.clone(),
                source: ini::Error::Parse(err),
            }
        })?;

        Self::from_ini(&ini, origin)
    }

    fn from_ini(ini: &ini::Ini, origin: String) -> Result<Self, SettingsError> {
        let Some(props) = ini.section(Some("zabbix")) else {
            return Err(SettingsError::MissingSection { origin });
        };
        let get = |key: &str| {
            props
                .iter()
                .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
        };

        let Some(raw_url) = get("url") else {
            return Err(SettingsError::MissingKey { origin, key: "url" });
        };
        let Some(token) = get("token") else {
            return Err(SettingsError::MissingKey {
                origin,
                key: "token",
            });
        };
        let url = url::Url::parse(raw_url).map_err(|source| SettingsError::InvalidUrl {
            origin: origin.clone(),
            url: raw_url.to_string(),
            source,
        })?;

        // Anything other than a literal "true" disables verification.
        let verify_tls = get("verify_tls")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        Ok(Settings {
            url,
            token: token.to_string(),
            verify_tls,
            cafile: get("cafile").map(PathBuf::from),
        })
    }
}

fn parse_options() -> ini::ParseOption {
    ini::ParseOption {
        enabled_escape: false,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_settings() {
        let settings = Settings::parse(
            r#"
[zabbix]
url = https://zabbix.example.org/api_jsonrpc.php
token = 0123abcd
verify_tls = TRUE
cafile = /etc/ssl/internal-ca.pem
"#,
        )
        .unwrap();

        assert_eq!(
            settings,
            Settings {
                url: url::Url::parse("https://zabbix.example.org/api_jsonrpc.php").unwrap(),
                token: "0123abcd".to_string(),
                verify_tls: true,
                cafile: Some(PathBuf::from("/etc/ssl/internal-ca.pem")),
            }
        );
    }

    #[test]
    fn verification_defaults_on_and_only_true_enables_it() {
        let base = "[zabbix]\nurl = https://z.example.org/api_jsonrpc.php\ntoken = t\n";

        let settings = Settings::parse(base).unwrap();
        assert!(settings.verify_tls);
        assert_eq!(settings.cafile, None);

        for value in ["false", "no", "0", "yes"] {
            let settings = Settings::parse(&format!("{base}verify_tls = {value}\n")).unwrap();
            assert!(!settings.verify_tls, "{value}");
        }
    }

    #[test]
    fn missing_pieces_are_reported() {
        let err = Settings::parse("[other]\nurl = x\n").unwrap_err();
        assert!(matches!(err, SettingsError::MissingSection { .. }));

        let err = Settings::parse("[zabbix]\nurl = https://z.example.org\n").unwrap_err();
        assert_eq!(err.to_string(), "<inline>: missing 'token' in section [zabbix]");

        let err = Settings::parse("[zabbix]\nurl = zabbix\ntoken = t\n").unwrap_err();
        assert!(matches!(err, SettingsError::InvalidUrl { .. }));
    }
}
