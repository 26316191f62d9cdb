use std::collections::BTreeMap;

/// RoomMapping maps lowercase route names to opaque Matrix room identifiers.
/// A `default` entry is expected, and is used when a route has no room of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomMapping {
    rooms: BTreeMap<String, String>,
}

impl RoomMapping {
    /// Name of the fallback room entry.
    pub const DEFAULT: &'static str = "default";

    /// Returns the room configured for exactly `key`, if any.
    /// Entries with an empty room identifier are treated as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.rooms
            .get(key)
            .map(String::as_str)
            .filter(|room| !room.is_empty())
    }

    /// Returns the room for `key`, or the `default` room if `key` isn't mapped.
    pub fn resolve(&self, key: &str) -> Option<&str> {
        self.get(key).or_else(|| self.default_room())
    }

    pub fn default_room(&self) -> Option<&str> {
        self.get(Self::DEFAULT)
    }
}

impl<K, V> FromIterator<(K, V)> for RoomMapping
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let rooms = iter
            .into_iter()
            .map(|(k, v)| {
                (
                    k.as_ref().trim().to_lowercase(),
                    v.as_ref().trim().to_string(),
                )
            })
            .collect();

        RoomMapping { rooms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> RoomMapping {
        [
            ("Default", " !fallback:example.org "),
            ("DISK_SPACE", "!disk:example.org"),
            ("updates", ""),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn keys_are_normalized_on_load() {
        let rooms = mapping();
        assert_eq!(rooms.get("disk_space"), Some("!disk:example.org"));
        assert_eq!(rooms.get("DISK_SPACE"), None);
        assert_eq!(rooms.default_room(), Some("!fallback:example.org"));
    }

    #[test]
    fn unmapped_and_empty_keys_resolve_to_default() {
        let rooms = mapping();
        assert_eq!(rooms.resolve("pc_down"), Some("!fallback:example.org"));
        assert_eq!(rooms.resolve("updates"), Some("!fallback:example.org"));
        assert_eq!(rooms.resolve("disk_space"), Some("!disk:example.org"));
    }

    #[test]
    fn missing_default_resolves_to_nothing() {
        let rooms: RoomMapping = [("disk_space", "!disk:example.org")].into_iter().collect();
        assert_eq!(rooms.resolve("pc_down"), None);
        assert_eq!(rooms.resolve("disk_space"), Some("!disk:example.org"));
    }
}
