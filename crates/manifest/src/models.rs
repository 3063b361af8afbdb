use serde::Serialize;

/// Which manifest layout a map was authored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// `_`-prefixed keys, used by v2 and v3 maps.
    Legacy,
    /// Nested `audio`/`song` objects, used by v4 maps.
    Current,
}

/// One playable difficulty of a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    /// The characteristic the difficulty belongs to (`Standard`, `OneSaber`,
    /// `Lawless`, ...).
    pub characteristic: String,
    pub difficulty: String,
    /// Chart data file, relative to the map folder.
    pub chart_filename: Option<String>,
    /// Lightshow data file, relative to the map folder. Only current-schema
    /// maps split lighting out of the chart.
    pub lightshow_filename: Option<String>,
}

/// Parsed `Info.dat`.
///
/// Only the fields needed to locate a map's files and show it in a listing
/// are kept; everything else in the manifest is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetManifest {
    pub schema: Schema,
    pub title: String,
    pub sub_title: String,
    pub artist: String,
    /// Level author(s), comma separated when the manifest lists several.
    pub mapper: String,
    pub audio_filename: String,
    pub cover_filename: String,
    pub variants: Vec<Variant>,
}

impl AssetManifest {
    /// Every file contributing to the content hash after the manifest
    /// itself, in hashing order: for each variant, its chart then its
    /// lightshow.
    ///
    /// A file referenced by several variants appears once per reference.
    pub fn hashed_files(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .flat_map(|v| v.chart_filename.as_deref().into_iter().chain(v.lightshow_filename.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(chart: Option<&str>, lightshow: Option<&str>) -> Variant {
        Variant {
            characteristic: "Standard".to_string(),
            difficulty: "Expert".to_string(),
            chart_filename: chart.map(str::to_string),
            lightshow_filename: lightshow.map(str::to_string),
        }
    }

    #[test]
    fn test_hashed_files_order_and_repeats() {
        let manifest = AssetManifest {
            schema: Schema::Current,
            title: "Song".into(),
            sub_title: String::new(),
            artist: "Artist".into(),
            mapper: "Mapper".into(),
            audio_filename: "song.ogg".into(),
            cover_filename: "cover.jpg".into(),
            variants: vec![
                variant(Some("Easy.dat"), Some("Lights.dat")),
                variant(None, None),
                variant(Some("Hard.dat"), Some("Lights.dat")),
            ],
        };
        let files: Vec<&str> = manifest.hashed_files().collect();
        assert_eq!(files, vec!["Easy.dat", "Lights.dat", "Hard.dat", "Lights.dat"]);
    }
}
