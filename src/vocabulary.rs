use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Declares a closed vocabulary: an enum whose members each map to
/// exactly one label, plus parsing, display and serialization through
/// that label.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident, $error:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every member, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = $error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    _ => Err($error(s.to_owned())),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }
    };
}

/// Returned when a string is not a member of the genre vocabulary.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("unknown genre {0:?}")]
pub struct UnknownGenre(pub String);

/// Returned when a string is not a known state code.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("unknown state {0:?}")]
pub struct UnknownState(pub String);

vocabulary! {
    /// A musical style a venue hosts or an artist performs.
    Genre, UnknownGenre {
        Alternative => "Alternative",
        Blues => "Blues",
        Classical => "Classical",
        Country => "Country",
        Electronic => "Electronic",
        Folk => "Folk",
        Funk => "Funk",
        HipHop => "Hip-Hop",
        HeavyMetal => "Heavy Metal",
        Instrumental => "Instrumental",
        Jazz => "Jazz",
        MusicalTheatre => "Musical Theatre",
        Pop => "Pop",
        Punk => "Punk",
        RhythmAndBlues => "R&B",
        Reggae => "Reggae",
        RockNRoll => "Rock n Roll",
        Soul => "Soul",
        Other => "Other",
    }
}

vocabulary! {
    /// A two-letter region code.
    #[allow(clippy::upper_case_acronyms)]
    State, UnknownState {
        AK => "AK",
        AL => "AL",
        AZ => "AZ",
        AR => "AR",
        CA => "CA",
        CO => "CO",
        CT => "CT",
        DE => "DE",
        DC => "DC",
        FL => "FL",
        GA => "GA",
        HI => "HI",
        ID => "ID",
        IL => "IL",
        IN => "IN",
        IA => "IA",
        KS => "KS",
        KY => "KY",
        LA => "LA",
        ME => "ME",
        MT => "MT",
        NE => "NE",
        NV => "NV",
        NH => "NH",
        NJ => "NJ",
        NM => "NM",
        NY => "NY",
        NC => "NC",
        ND => "ND",
        OH => "OH",
        OK => "OK",
        OR => "OR",
        MD => "MD",
        MA => "MA",
        MI => "MI",
        MN => "MN",
        MS => "MS",
        MO => "MO",
        PA => "PA",
        RI => "RI",
        SC => "SC",
        SD => "SD",
        TN => "TN",
        TX => "TX",
        UT => "UT",
        VT => "VT",
        VA => "VA",
        WA => "WA",
        WV => "WV",
        WI => "WI",
        WY => "WY",
    }
}

/// Parses every label, failing on the first unknown one. Repeated
/// genres are kept once, at their first position.
pub fn parse_genres<'a>(
    labels: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Genre>, UnknownGenre> {
    let mut genres: Vec<Genre> = vec![];

    for label in labels {
        let genre = label.parse()?;

        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }

    Ok(genres)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_back_to_their_members() {
        for genre in Genre::ALL {
            assert_eq!(genre.label().parse::<Genre>(), Ok(*genre));
        }

        for state in State::ALL {
            assert_eq!(state.label().parse::<State>(), Ok(*state));
        }
    }

    #[test]
    fn vocabularies_are_complete() {
        assert_eq!(Genre::ALL.len(), 19);
        assert_eq!(State::ALL.len(), 51);
        assert_eq!(Genre::ALL.last(), Some(&Genre::Other));
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert_eq!("jazz".parse::<Genre>(), Err(UnknownGenre("jazz".to_owned())));
        assert_eq!("ca".parse::<State>(), Err(UnknownState("ca".to_owned())));
        assert_eq!("Hip-Hop".parse::<Genre>(), Ok(Genre::HipHop));
        assert_eq!("R&B".parse::<Genre>(), Ok(Genre::RhythmAndBlues));
    }

    #[test]
    fn repeated_genres_collapse() {
        let genres = parse_genres(vec!["Jazz", "Reggae", "Jazz"]).expect("parse genres");

        assert_eq!(genres, vec![Genre::Jazz, Genre::Reggae]);
    }

    #[test]
    fn unknown_genres_are_rejected() {
        assert_eq!(
            parse_genres(vec!["Jazz", "Polka"]),
            Err(UnknownGenre("Polka".to_owned()))
        );
    }

    #[test]
    fn members_serialize_as_labels() {
        let json = serde_json::to_string(&vec![Genre::HeavyMetal, Genre::RockNRoll])
            .expect("serialize genres");

        assert_eq!(json, r#"["Heavy Metal","Rock n Roll"]"#);
        assert_eq!(
            serde_json::to_string(&State::NY).expect("serialize state"),
            r#""NY""#
        );
    }
}
