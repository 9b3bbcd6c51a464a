/// Storefront identifiers for every platform a GOG Galaxy database can hold.
///
/// This enum centralizes storefront identity (short names, display names,
/// hint aliases, and the two vendor key-prefix conventions) in one place,
/// replacing ad-hoc string matching throughout the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// The vendor's own storefront. Release keys with no recognizable
    /// foreign marker default here.
    Gog,
    Steam,
    EpicGames,
    Origin,
    Uplay,
    XboxLive,
    Psn,
    BattleNet,
}

/// All platform variants in registration order.
const ALL_PLATFORMS: &[Platform] = &[
    Platform::Gog,
    Platform::Steam,
    Platform::EpicGames,
    Platform::Origin,
    Platform::Uplay,
    Platform::XboxLive,
    Platform::Psn,
    Platform::BattleNet,
];

impl Platform {
    /// Canonical short name used for library ids and the store's
    /// platform column.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Gog => "gog",
            Self::Steam => "steam",
            Self::EpicGames => "epic",
            Self::Origin => "origin",
            Self::Uplay => "uplay",
            Self::XboxLive => "xbox",
            Self::Psn => "psn",
            Self::BattleNet => "bnet",
        }
    }

    /// Full display name for the storefront.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gog => "GOG.com",
            Self::Steam => "Steam",
            Self::EpicGames => "Epic Games Store",
            Self::Origin => "EA Origin",
            Self::Uplay => "Ubisoft Connect",
            Self::XboxLive => "Xbox Live",
            Self::Psn => "PlayStation Network",
            Self::BattleNet => "Battle.net",
        }
    }

    /// Substrings recognized in the free-text platform/source hints of a
    /// Galaxy metadata blob (case-insensitive matching).
    ///
    /// Includes the canonical short name plus the spellings the Galaxy
    /// client and its integration plugins are known to emit.
    pub fn hint_aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Gog => &["gog galaxy", "gog"],
            Self::Steam => &["steam"],
            Self::EpicGames => &["epic games", "epicgames", "epic"],
            Self::Origin => &["origin", "ea app", "ea desktop"],
            Self::Uplay => &["ubisoft connect", "ubisoftconnect", "ubisoft", "uplay"],
            Self::XboxLive => &["xbox", "microsoft store", "winstore"],
            Self::Psn => &["playstation", "psn"],
            Self::BattleNet => &["battle.net", "battlenet", "blizzard"],
        }
    }

    /// Prefix this storefront's titles carry in Galaxy release keys
    /// (`epicgames_abc123`).
    ///
    /// Distinct from [`stats_key_prefix`](Self::stats_key_prefix): the
    /// vendor abbreviates storefronts differently in the two tables, and
    /// collapsing the conventions into one table breaks playtime matching.
    pub fn release_key_prefix(&self) -> &'static str {
        match self {
            Self::Gog => "gog",
            Self::Steam => "steam",
            Self::EpicGames => "epicgames",
            Self::Origin => "origin",
            Self::Uplay => "ubisoftconnect",
            Self::XboxLive => "xboxlive",
            Self::Psn => "psn",
            Self::BattleNet => "battlenet",
        }
    }

    /// Prefix this storefront's titles carry in the Galaxy statistics
    /// table (`epic_abc123`).
    pub fn stats_key_prefix(&self) -> &'static str {
        match self {
            Self::Gog => "gog",
            Self::Steam => "steam",
            Self::EpicGames => "epic",
            Self::Origin => "origin",
            Self::Uplay => "uplay",
            Self::XboxLive => "xbox",
            Self::Psn => "psn",
            Self::BattleNet => "bnet",
        }
    }

    /// True for the vendor's own storefront.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Gog)
    }

    /// All 8 platform variants.
    pub fn all() -> &'static [Platform] {
        ALL_PLATFORMS
    }

    /// Match a free-text metadata hint against every platform's alias set
    /// (case-insensitive substring containment).
    pub fn from_hint(hint: &str) -> Option<Platform> {
        let lower = hint.to_lowercase();
        for &platform in ALL_PLATFORMS {
            for alias in platform.hint_aliases() {
                if lower.contains(alias) {
                    return Some(platform);
                }
            }
        }
        None
    }

    /// Look up a platform by its release-key prefix (already lowercased,
    /// without the trailing underscore).
    pub fn from_release_key_prefix(prefix: &str) -> Option<Platform> {
        ALL_PLATFORMS
            .iter()
            .copied()
            .find(|platform| platform.release_key_prefix() == prefix)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Error returned when a string cannot be parsed into a `Platform`.
#[derive(Debug, Clone)]
pub struct PlatformParseError(pub String);

impl std::fmt::Display for PlatformParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown platform: '{}'", self.0)
    }
}

impl std::error::Error for PlatformParseError {}

impl std::str::FromStr for Platform {
    type Err = PlatformParseError;

    /// Parse a platform from any recognized name (case-insensitive).
    ///
    /// Matches against `short_name()`, both key prefixes, and all entries
    /// in `hint_aliases()`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        for &platform in ALL_PLATFORMS {
            if platform.short_name() == lower
                || platform.release_key_prefix() == lower
                || platform.stats_key_prefix() == lower
            {
                return Ok(platform);
            }
            for alias in platform.hint_aliases() {
                if *alias == lower {
                    return Ok(platform);
                }
            }
        }
        Err(PlatformParseError(s.to_string()))
    }
}

impl serde::Serialize for Platform {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.short_name())
    }
}

impl<'de> serde::Deserialize<'de> for Platform {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
