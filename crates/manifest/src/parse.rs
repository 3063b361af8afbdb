use crate::error::{ErrorKind, Result};
use crate::models::{AssetManifest, Schema, Variant};
use exn::ResultExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a raw `Info.dat`.
///
/// The schema is picked from the document's shape: a top-level
/// `_songFilename` means the legacy layout, a top-level `audio` object means
/// the current one. Anything else is rejected.
pub fn parse(raw: &[u8]) -> Result<AssetManifest> {
    let raw = raw.strip_prefix(BOM).unwrap_or(raw);
    let document: Value = serde_json::from_slice(raw).or_raise(|| ErrorKind::Parse("not valid JSON".to_string()))?;
    let Value::Object(fields) = &document else {
        exn::bail!(ErrorKind::Parse("manifest is not a JSON object".to_string()));
    };

    if fields.contains_key("_songFilename") {
        let legacy: LegacyInfo = from_value(document)?;
        Ok(legacy.into())
    } else if fields.get("audio").is_some_and(Value::is_object) {
        let current: CurrentInfo = from_value(document)?;
        Ok(current.into())
    } else {
        exn::bail!(ErrorKind::Parse("unrecognised manifest schema".to_string()));
    }
}

fn from_value<T: DeserializeOwned>(document: Value) -> Result<T> {
    serde_json::from_value(document).or_raise(|| ErrorKind::Parse("manifest does not match its schema".to_string()))
}

#[derive(Deserialize)]
struct LegacyInfo {
    #[serde(rename = "_songName", default)]
    song_name: String,
    #[serde(rename = "_songSubName", default)]
    song_sub_name: String,
    #[serde(rename = "_songAuthorName", default)]
    song_author_name: String,
    #[serde(rename = "_levelAuthorName", default)]
    level_author_name: String,
    #[serde(rename = "_songFilename")]
    song_filename: String,
    #[serde(rename = "_coverImageFilename", default)]
    cover_image_filename: String,
    #[serde(rename = "_difficultyBeatmapSets", default)]
    difficulty_beatmap_sets: Vec<LegacyBeatmapSet>,
}

#[derive(Deserialize)]
struct LegacyBeatmapSet {
    #[serde(rename = "_beatmapCharacteristicName", default)]
    characteristic: String,
    #[serde(rename = "_difficultyBeatmaps", default)]
    beatmaps: Vec<LegacyBeatmap>,
}

#[derive(Deserialize)]
struct LegacyBeatmap {
    #[serde(rename = "_difficulty", default)]
    difficulty: String,
    #[serde(rename = "_beatmapFilename")]
    filename: Option<String>,
}

impl From<LegacyInfo> for AssetManifest {
    fn from(info: LegacyInfo) -> Self {
        let variants = info
            .difficulty_beatmap_sets
            .into_iter()
            .flat_map(|set| {
                let characteristic = set.characteristic;
                set.beatmaps.into_iter().map(move |map| Variant {
                    characteristic: characteristic.clone(),
                    difficulty: map.difficulty,
                    chart_filename: map.filename.filter(|f| !f.is_empty()),
                    lightshow_filename: None,
                })
            })
            .collect();
        Self {
            schema: Schema::Legacy,
            title: info.song_name,
            sub_title: info.song_sub_name,
            artist: info.song_author_name,
            mapper: info.level_author_name,
            audio_filename: info.song_filename,
            cover_filename: info.cover_image_filename,
            variants,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentInfo {
    #[serde(default)]
    song: CurrentSong,
    audio: CurrentAudio,
    #[serde(default)]
    cover_image_filename: String,
    #[serde(default)]
    difficulty_beatmaps: Vec<CurrentBeatmap>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct CurrentSong {
    title: String,
    sub_title: String,
    author: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentAudio {
    song_filename: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentBeatmap {
    #[serde(default)]
    characteristic: String,
    #[serde(default)]
    difficulty: String,
    #[serde(default)]
    beatmap_authors: CurrentAuthors,
    beatmap_data_filename: Option<String>,
    lightshow_data_filename: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct CurrentAuthors {
    mappers: Vec<String>,
}

impl From<CurrentInfo> for AssetManifest {
    fn from(info: CurrentInfo) -> Self {
        // v4 credits mappers per difficulty; collapse them for display.
        let mut mappers: Vec<String> = Vec::new();
        for name in info.difficulty_beatmaps.iter().flat_map(|b| &b.beatmap_authors.mappers) {
            if !mappers.contains(name) {
                mappers.push(name.clone());
            }
        }
        let variants = info
            .difficulty_beatmaps
            .into_iter()
            .map(|map| Variant {
                characteristic: map.characteristic,
                difficulty: map.difficulty,
                chart_filename: map.beatmap_data_filename.filter(|f| !f.is_empty()),
                lightshow_filename: map.lightshow_data_filename.filter(|f| !f.is_empty()),
            })
            .collect();
        Self {
            schema: Schema::Current,
            title: info.song.title,
            sub_title: info.song.sub_title,
            artist: info.song.author,
            mapper: mappers.join(", "),
            audio_filename: info.audio.song_filename,
            cover_filename: info.cover_image_filename,
            variants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const LEGACY: &str = r#"{
        "_version": "2.1.0",
        "_songName": "Song",
        "_songSubName": "Remix",
        "_songAuthorName": "Artist",
        "_levelAuthorName": "Mapper",
        "_songFilename": "song.egg",
        "_coverImageFilename": "cover.jpg",
        "_difficultyBeatmapSets": [
            {
                "_beatmapCharacteristicName": "Standard",
                "_difficultyBeatmaps": [
                    { "_difficulty": "Expert", "_beatmapFilename": "ExpertStandard.dat" },
                    { "_difficulty": "ExpertPlus", "_beatmapFilename": "ExpertPlusStandard.dat" }
                ]
            },
            {
                "_beatmapCharacteristicName": "OneSaber",
                "_difficultyBeatmaps": [
                    { "_difficulty": "Hard", "_beatmapFilename": "HardOneSaber.dat" }
                ]
            }
        ]
    }"#;

    const CURRENT: &str = r#"{
        "version": "4.0.0",
        "song": { "title": "Song", "subTitle": "", "author": "Artist" },
        "audio": { "songFilename": "song.ogg", "songDuration": 120.0 },
        "coverImageFilename": "cover.png",
        "difficultyBeatmaps": [
            {
                "characteristic": "Standard",
                "difficulty": "Easy",
                "beatmapAuthors": { "mappers": ["A"], "lighters": ["L"] },
                "beatmapDataFilename": "Easy.dat",
                "lightshowDataFilename": "Lightshow.dat"
            },
            {
                "characteristic": "Standard",
                "difficulty": "Hard",
                "beatmapAuthors": { "mappers": ["A", "B"], "lighters": [] },
                "beatmapDataFilename": "Hard.dat",
                "lightshowDataFilename": "Lightshow.dat"
            }
        ]
    }"#;

    #[test]
    fn test_parse_legacy() {
        let manifest = parse(LEGACY.as_bytes()).unwrap();
        assert_eq!(manifest.schema, Schema::Legacy);
        assert_eq!(manifest.title, "Song");
        assert_eq!(manifest.sub_title, "Remix");
        assert_eq!(manifest.mapper, "Mapper");
        assert_eq!(manifest.audio_filename, "song.egg");
        assert_eq!(manifest.cover_filename, "cover.jpg");
        assert_eq!(manifest.variants.len(), 3);
        assert_eq!(manifest.variants[2].characteristic, "OneSaber");
        assert_eq!(
            manifest.hashed_files().collect::<Vec<_>>(),
            vec!["ExpertStandard.dat", "ExpertPlusStandard.dat", "HardOneSaber.dat"]
        );
    }

    #[test]
    fn test_parse_current() {
        let manifest = parse(CURRENT.as_bytes()).unwrap();
        assert_eq!(manifest.schema, Schema::Current);
        assert_eq!(manifest.artist, "Artist");
        assert_eq!(manifest.mapper, "A, B");
        assert_eq!(manifest.audio_filename, "song.ogg");
        assert_eq!(
            manifest.hashed_files().collect::<Vec<_>>(),
            vec!["Easy.dat", "Lightshow.dat", "Hard.dat", "Lightshow.dat"]
        );
    }

    #[test]
    fn test_parse_tolerates_bom() {
        let mut raw = BOM.to_vec();
        raw.extend_from_slice(LEGACY.as_bytes());
        assert_eq!(parse(&raw).unwrap(), parse(LEGACY.as_bytes()).unwrap());
    }

    #[rstest]
    #[case::not_json("this is not json")]
    #[case::not_object("[1, 2, 3]")]
    #[case::unknown_schema(r#"{"songName": "x"}"#)]
    #[case::legacy_wrong_type(r#"{"_songFilename": 42}"#)]
    #[case::current_missing_song_filename(r#"{"audio": {}}"#)]
    #[case::empty("")]
    fn test_parse_rejects(#[case] raw: &str) {
        let err = parse(raw.as_bytes()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Parse(_)));
    }
}
