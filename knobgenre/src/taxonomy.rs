//! Canonical genre taxonomy and normalization tables
//!
//! Every genre string observed in the collection maps into a fixed
//! parent/subgenre hierarchy. Tags that are not genres (label names,
//! "Other") map to an explicit None so they are not retried.

/// Parent genres and their subgenres
pub const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Bass",
        &[
            "Dubstep",
            "Deep Dubstep",
            "Riddim",
            "Grime",
            "Garage",
            "Drum & Bass",
            "Leftfield Bass",
            "Freeform Bass",
        ],
    ),
    (
        "Electronic",
        &[
            "House",
            "Deep House",
            "Progressive House",
            "Trance",
            "IDM",
            "Breakbeat",
            "Big Beat",
            "Glitch Hop",
        ],
    ),
    (
        "Chill",
        &["Downtempo", "Chillout", "Lofi", "Ambient", "Trip Hop", "Chillstep"],
    ),
    ("Hip-Hop", &["Hip-Hop", "Trap", "Beats"]),
    ("Dub/Reggae", &["Dub", "Reggae"]),
    (
        "Metal",
        &[
            "Heavy Metal",
            "Death Metal",
            "Black Metal",
            "Doom",
            "Thrash",
            "Stoner/Sludge",
        ],
    ),
    ("Punk", &["Punk", "Hardcore", "Post-Punk", "Crust", "Skate Punk"]),
    ("Blues/Soul", &["Blues", "R&B", "Soul", "Funk"]),
    (
        "Jazz",
        &["Bebop", "Cool Jazz", "Free Jazz", "Fusion", "Latin Jazz", "Swing"],
    ),
    (
        "Classical",
        &["Orchestral", "Chamber", "Solo", "Opera", "Modern/Contemporary"],
    ),
    ("Pop/Rock", &["Pop", "Rock", "Indie", "Country", "Folk"]),
];

/// Directories whose contents are station assets, not music
pub const CONTENT_TYPE_DIRS: &[(&str, &str)] = &[
    ("callsigns", "callsign"),
    ("commercials", "commercial"),
    ("promos", "promo"),
    ("talking_clips", "talking"),
    ("SHOWS", "talking"),
    ("abnormal", "promo"),
];

/// Observed tag strings and where they land in the taxonomy
///
/// None marks strings that are known but unclassifiable.
pub const TAG_NORMALIZE: &[(&str, Option<(&str, &str)>)] = &[
    // Dubstep variants
    ("Dubstep", Some(("Bass", "Dubstep"))),
    ("DubStep", Some(("Bass", "Dubstep"))),
    ("Deep Dubstep", Some(("Bass", "Deep Dubstep"))),
    ("Vocal Deep Dubstep", Some(("Bass", "Deep Dubstep"))),
    ("DafuQ! [Dubstep]", Some(("Bass", "Dubstep"))),
    ("Dirty/Heavy Dubstep/Grime", Some(("Bass", "Dubstep"))),
    ("Heavy Dubstep/Grime", Some(("Bass", "Dubstep"))),
    ("Ambient Dubstep", Some(("Chill", "Chillstep"))),
    ("LoveStep", Some(("Bass", "Dubstep"))),
    ("Dubstep,dub", Some(("Bass", "Dubstep"))),
    // Dubstep combo tags
    ("Dubstep/Grime", Some(("Bass", "Grime"))),
    ("Dubstep / Grime / Funky", Some(("Bass", "Grime"))),
    ("Dubstep / Riddim", Some(("Bass", "Riddim"))),
    ("Dubstep / Trap", Some(("Hip-Hop", "Trap"))),
    ("Dubstep / 2step", Some(("Bass", "Garage"))),
    // Garage
    ("FutureGarage", Some(("Bass", "Garage"))),
    ("Garage / Bassline / Grime", Some(("Bass", "Garage"))),
    ("Deep Dubstep, Future Garage", Some(("Bass", "Garage"))),
    // Bass
    ("Bass", Some(("Bass", "Leftfield Bass"))),
    ("Bass Music", Some(("Bass", "Leftfield Bass"))),
    ("Freeform Bass", Some(("Bass", "Freeform Bass"))),
    ("Leftfield Bass", Some(("Bass", "Leftfield Bass"))),
    // Drum & Bass
    ("Drum & Bass", Some(("Bass", "Drum & Bass"))),
    ("DafuQ! [DnB]", Some(("Bass", "Drum & Bass"))),
    // Electronic
    ("Electronic", Some(("Electronic", "House"))),
    ("Electonic", Some(("Electronic", "House"))),
    ("House", Some(("Electronic", "House"))),
    ("Deep House", Some(("Electronic", "Deep House"))),
    ("Classic Progressive House", Some(("Electronic", "Progressive House"))),
    ("IDM, Downtempo", Some(("Electronic", "IDM"))),
    ("Big Beat", Some(("Electronic", "Big Beat"))),
    ("Breakbeat", Some(("Electronic", "Breakbeat"))),
    ("Dance", Some(("Electronic", "House"))),
    ("Psychedelic Trance", Some(("Electronic", "Trance"))),
    ("Remix", Some(("Electronic", "House"))),
    // Glitch Hop
    ("Glitch Hop", Some(("Electronic", "Glitch Hop"))),
    ("Glitch-Hop", Some(("Electronic", "Glitch Hop"))),
    // Chill
    ("Chillout", Some(("Chill", "Chillout"))),
    ("Chill Out", Some(("Chill", "Chillout"))),
    ("Chill/The XXX", Some(("Chill", "Chillout"))),
    ("DafuQ! [Chill]", Some(("Chill", "Chillout"))),
    ("Chillstep", Some(("Chill", "Chillstep"))),
    ("Chill Step", Some(("Chill", "Chillstep"))),
    ("Downtempo", Some(("Chill", "Downtempo"))),
    ("Trip Hop", Some(("Chill", "Trip Hop"))),
    ("Abstract", Some(("Chill", "Ambient"))),
    // Hip-Hop
    ("Hip-Hop", Some(("Hip-Hop", "Hip-Hop"))),
    ("Hip-Hop Beats", Some(("Hip-Hop", "Beats"))),
    ("Beats", Some(("Hip-Hop", "Beats"))),
    ("Trap", Some(("Hip-Hop", "Trap"))),
    ("DafuQ! [Trap]", Some(("Hip-Hop", "Trap"))),
    ("Gangsta", Some(("Hip-Hop", "Hip-Hop"))),
    // Dub / Reggae
    ("Dub", Some(("Dub/Reggae", "Dub"))),
    ("Dub / Reggae", Some(("Dub/Reggae", "Dub"))),
    // Blues
    ("Blues", Some(("Blues/Soul", "Blues"))),
    ("R&B", Some(("Blues/Soul", "R&B"))),
    // Pop / Rock
    ("Pop", Some(("Pop/Rock", "Pop"))),
    ("Country", Some(("Pop/Rock", "Country"))),
    ("DafuQ! [Hipster]", Some(("Pop/Rock", "Indie"))),
    // Known but unclassifiable
    ("Other", None),
    ("Kulemina", None),
];

/// Directory names that imply a genre when tags are missing
pub const DIRECTORY_HINTS: &[(&str, (&str, &str))] = &[
    ("MOBCOIN_DEEP_DUBSTEAP", ("Bass", "Dubstep")),
    ("Downtempo:Lofi", ("Chill", "Lofi")),
    ("deltron", ("Hip-Hop", "Hip-Hop")),
    ("Animatrix", ("Electronic", "IDM")),
    ("NinjaSexParty", ("Pop/Rock", "Pop")),
];

/// Normalizes a raw tag string to (parent, sub)
///
/// Exact match first, then case-insensitive. Returns None for unknown
/// strings and for strings explicitly mapped to nothing.
pub fn normalize_tag(raw_genre: &str) -> Option<(&'static str, &'static str)> {
    let raw = raw_genre.trim();
    if raw.is_empty() {
        return None;
    }

    for (tag, mapping) in TAG_NORMALIZE {
        if *tag == raw {
            return *mapping;
        }
    }

    for (tag, mapping) in TAG_NORMALIZE {
        if tag.eq_ignore_ascii_case(raw) {
            return *mapping;
        }
    }

    None
}

/// Looks for a genre hint in a directory path
pub fn directory_hint(dirpath: &str) -> Option<(&'static str, &'static str)> {
    let lower = dirpath.to_lowercase();
    for (hint_dir, genre) in DIRECTORY_HINTS {
        if lower.contains(&hint_dir.to_lowercase()) {
            return Some(*genre);
        }
    }
    None
}

/// Returns the non-music content type implied by a directory path
pub fn content_type_for(dirpath: &str) -> Option<&'static str> {
    let normalized = dirpath.replace('\\', "/");
    for part in normalized.split('/') {
        for (dir, content_type) in CONTENT_TYPE_DIRS {
            if part == *dir {
                return Some(content_type);
            }
        }
    }
    None
}

/// Whether the parent genre exists in the taxonomy
pub fn is_valid_parent(parent: &str) -> bool {
    TAXONOMY.iter().any(|(p, _)| *p == parent)
}

/// Resolves a subgenre to its parent
pub fn parent_of(sub: &str) -> Option<&'static str> {
    for (parent, subs) in TAXONOMY {
        if subs.contains(&sub) {
            return Some(parent);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_tag_lookup() {
        assert_eq!(normalize_tag("Dubstep"), Some(("Bass", "Dubstep")));
        assert_eq!(normalize_tag("Glitch-Hop"), Some(("Electronic", "Glitch Hop")));
    }

    #[test]
    fn case_insensitive_fallback() {
        assert_eq!(normalize_tag("dubstep"), Some(("Bass", "Dubstep")));
        assert_eq!(normalize_tag("TRAP"), Some(("Hip-Hop", "Trap")));
    }

    #[test]
    fn unclassifiable_tags_stay_none() {
        assert_eq!(normalize_tag("Other"), None);
        assert_eq!(normalize_tag("Kulemina"), None);
        assert_eq!(normalize_tag("Completely Unknown Genre"), None);
    }

    #[test]
    fn blank_tag_is_none() {
        assert_eq!(normalize_tag(""), None);
        assert_eq!(normalize_tag("   "), None);
    }

    #[test]
    fn directory_hints_match_anywhere_in_path() {
        assert_eq!(
            directory_hint("music/MOBCOIN_DEEP_DUBSTEAP/2019"),
            Some(("Bass", "Dubstep"))
        );
        assert_eq!(directory_hint("music/deltron"), Some(("Hip-Hop", "Hip-Hop")));
        assert_eq!(directory_hint("music/random"), None);
    }

    #[test]
    fn content_type_matches_path_components() {
        assert_eq!(content_type_for("callsigns"), Some("callsign"));
        assert_eq!(content_type_for("station/commercials/2024"), Some("commercial"));
        assert_eq!(content_type_for("SHOWS"), Some("talking"));
        // substring of a component is not a match
        assert_eq!(content_type_for("my_callsigns_backup"), None);
        assert_eq!(content_type_for("music/bass"), None);
    }

    #[test]
    fn every_mapping_lands_in_the_taxonomy() {
        for (tag, mapping) in TAG_NORMALIZE {
            if let Some((parent, sub)) = mapping {
                assert!(is_valid_parent(parent), "{} maps to unknown parent {}", tag, parent);
                assert_eq!(parent_of(sub), Some(*parent), "{} maps to misplaced sub {}", tag, sub);
            }
        }
        for (_, mapping) in DIRECTORY_HINTS {
            let (parent, sub) = mapping;
            assert!(is_valid_parent(parent));
            assert_eq!(parent_of(sub), Some(*parent));
        }
    }
}
