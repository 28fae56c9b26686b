use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seedling species audited during a nursery back check.
///
/// The variant order is the presentation order used by the form and by every
/// export, so columns of the input and of the exported table line up.
/// Incoming names are matched case-insensitively against [`Species::key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Species {
    Guava,
    Gesho,
    Lemon,
    Grevillea,
}

impl Species {
    /// Fixed display and export order.
    pub const ALL: [Species; 4] = [
        Species::Guava,
        Species::Gesho,
        Species::Lemon,
        Species::Grevillea,
    ];

    /// Number of sockets a correctly prepared bed has across its width.
    pub fn expected_width(self) -> u32 {
        match self {
            Species::Guava | Species::Lemon => 13,
            Species::Gesho | Species::Grevillea => 16,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Species::Guava => "Guava",
            Species::Gesho => "Gesho",
            Species::Lemon => "Lemon",
            Species::Grevillea => "Grevillea",
        }
    }

    /// Name shown on the Amharic form.
    pub fn amharic_label(self) -> &'static str {
        match self {
            Species::Guava => "ዘይቱን",
            Species::Gesho => "ጌሾ",
            Species::Lemon => "ሎሚ",
            Species::Grevillea => "ግራቪሊያ",
        }
    }

    /// Lowercase prefix used for storage columns and form field keys.
    pub fn key(self) -> &'static str {
        match self {
            Species::Guava => "guava",
            Species::Gesho => "gesho",
            Species::Lemon => "lemon",
            Species::Grevillea => "grevillea",
        }
    }

    /// Position of the species in [`Species::ALL`].
    pub fn index(self) -> usize {
        match self {
            Species::Guava => 0,
            Species::Gesho => 1,
            Species::Lemon => 2,
            Species::Grevillea => 3,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpecies(pub String);

impl fmt::Display for UnknownSpecies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown species '{}'", self.0)
    }
}

impl std::error::Error for UnknownSpecies {}

impl FromStr for Species {
    type Err = UnknownSpecies;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Species::ALL
            .into_iter()
            .find(|sp| sp.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSpecies(s.to_string()))
    }
}

impl TryFrom<String> for Species {
    type Error = UnknownSpecies;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_matches_index() {
        for (i, sp) in Species::ALL.iter().enumerate() {
            assert_eq!(sp.index(), i);
        }
    }

    #[test]
    fn expected_widths_are_fixed() {
        assert_eq!(Species::Guava.expected_width(), 13);
        assert_eq!(Species::Gesho.expected_width(), 16);
        assert_eq!(Species::Lemon.expected_width(), 13);
        assert_eq!(Species::Grevillea.expected_width(), 16);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("GREVILLEA".parse::<Species>(), Ok(Species::Grevillea));
        assert_eq!(" lemon ".parse::<Species>(), Ok(Species::Lemon));
        assert!("mango".parse::<Species>().is_err());
    }

    #[test]
    fn deserializes_keys_and_labels() {
        let parsed: Vec<Species> =
            serde_json::from_str(r#"["guava", "Gesho", "LEMON", "grevillea"]"#).unwrap();
        assert_eq!(parsed, Species::ALL.to_vec());
        assert_eq!(serde_json::to_string(&Species::Guava).unwrap(), r#""Guava""#);
        assert!(serde_json::from_str::<Species>(r#""mango""#).is_err());
    }
}
