use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An encyclopedia language a flower record can be localized into.
///
/// Serialized by its long lowercase name (`"english"`), which is also the
/// key used for the language's entry inside a serialized
/// [`FlowerRecord`](crate::model::FlowerRecord). The declaration order is
/// the output order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    German,
    French,
    Italian,
}

impl Language {
    /// Every supported language, in output order.
    pub const ALL: [Self; 4] = [Self::English, Self::German, Self::French, Self::Italian];

    /// The languages a record is built for unless configured otherwise.
    pub const DEFAULTS: [Self; 3] = [Self::English, Self::German, Self::French];

    /// ISO 639-1 code, also the Wikipedia subdomain.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::German => "de",
            Self::French => "fr",
            Self::Italian => "it",
        }
    }

    /// Key under which the record JSON stores this language's entry.
    #[must_use]
    pub const fn record_key(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::German => "german",
            Self::French => "french",
            Self::Italian => "italian",
        }
    }

    /// Sitelink key of this language's Wikipedia (e.g. `dewiki`).
    #[must_use]
    pub fn wiki_key(self) -> String {
        format!("{}wiki", self.code())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    /// Accepts either the language code (`de`) or the record key (`german`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(wanted)
                    || lang.record_key().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| Error::InvalidData(format!("unsupported language: {s}")))
    }
}
