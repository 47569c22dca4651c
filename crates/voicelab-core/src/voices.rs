//! Voice catalog: the fixed set of demo voices and the filters the voices endpoint accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback preview for ids that are not in the catalog.
pub const DEFAULT_PREVIEW_URL: &str = "/audio/previews/default.mp3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    Male,
    Female,
    Neutral,
}

impl FromStr for VoiceGender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(VoiceGender::Male),
            "female" => Ok(VoiceGender::Female),
            "neutral" => Ok(VoiceGender::Neutral),
            other => Err(format!("Unknown gender: {}", other)),
        }
    }
}

/// Language tags offered by the demo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "en-AU")]
    EnAu,
    #[serde(rename = "es-ES")]
    EsEs,
    #[serde(rename = "fr-FR")]
    FrFr,
    #[serde(rename = "de-DE")]
    DeDe,
    #[serde(rename = "it-IT")]
    ItIt,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::EnUs,
        Language::EnGb,
        Language::EnAu,
        Language::EsEs,
        Language::FrFr,
        Language::DeDe,
        Language::ItIt,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Language::EnUs => "en-US",
            Language::EnGb => "en-GB",
            Language::EnAu => "en-AU",
            Language::EsEs => "es-ES",
            Language::FrFr => "fr-FR",
            Language::DeDe => "de-DE",
            Language::ItIt => "it-IT",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Language::ALL
            .iter()
            .copied()
            .find(|l| l.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown language: {}", wanted))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    pub gender: VoiceGender,
    pub accent: String,
    pub language: Language,
    pub preview_url: String,
    pub description: String,
    pub premium: bool,
    pub sample_text: String,
}

/// Optional filters; `None` means "don't filter on this field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceFilters {
    pub gender: Option<VoiceGender>,
    pub language: Option<Language>,
    pub premium: Option<bool>,
}

impl VoiceFilters {
    pub fn matches(&self, voice: &Voice) -> bool {
        self.gender.map_or(true, |g| voice.gender == g)
            && self.language.map_or(true, |l| voice.language == l)
            && self.premium.map_or(true, |p| voice.premium == p)
    }
}

/// Listing returned by [`VoiceCatalog::list`]. `total` is the unfiltered catalog size.
#[derive(Debug, Clone, Serialize)]
pub struct VoiceListing {
    pub voices: Vec<Voice>,
    pub total: usize,
    pub filtered: usize,
}

/// Read-only voice catalog, built once at startup.
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    voices: Vec<Voice>,
}

impl VoiceCatalog {
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }

    /// The six demo voices.
    pub fn builtin() -> Self {
        Self::new(vec![
            voice(
                "sarah-us-female",
                "Sarah",
                VoiceGender::Female,
                "American",
                Language::EnUs,
                "Warm and professional female voice",
                false,
                "Hello! I'm Sarah, and I'll help you bring your text to life.",
            ),
            voice(
                "david-us-male",
                "David",
                VoiceGender::Male,
                "American",
                Language::EnUs,
                "Deep and authoritative male voice",
                false,
                "Hi there, I'm David. Let me tell your story with clarity and confidence.",
            ),
            voice(
                "emma-gb-female",
                "Emma",
                VoiceGender::Female,
                "British",
                Language::EnGb,
                "Elegant British female voice",
                true,
                "Good day, I'm Emma. I speak with a refined British accent.",
            ),
            voice(
                "james-gb-male",
                "James",
                VoiceGender::Male,
                "British",
                Language::EnGb,
                "Distinguished British male voice",
                true,
                "Greetings, I'm James. Allow me to narrate with sophistication.",
            ),
            voice(
                "sophia-au-female",
                "Sophia",
                VoiceGender::Female,
                "Australian",
                Language::EnAu,
                "Friendly Australian female voice",
                true,
                "G'day! I'm Sophia from down under, ready to chat.",
            ),
            voice(
                "miguel-es-male",
                "Miguel",
                VoiceGender::Male,
                "Spanish",
                Language::EsEs,
                "Passionate Spanish male voice",
                true,
                "Hola, soy Miguel. Permíteme contar tu historia con pasión.",
            ),
        ])
    }

    pub fn list(&self, filters: &VoiceFilters) -> VoiceListing {
        let voices: Vec<Voice> = self
            .voices
            .iter()
            .filter(|v| filters.matches(v))
            .cloned()
            .collect();
        VoiceListing {
            total: self.voices.len(),
            filtered: voices.len(),
            voices,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Preview clip for a voice, or the shared default clip for unknown ids.
    pub fn preview_url(&self, id: &str) -> String {
        self.get(id)
            .map(|v| v.preview_url.clone())
            .unwrap_or_else(|| DEFAULT_PREVIEW_URL.to_string())
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[allow(clippy::too_many_arguments)]
fn voice(
    id: &str,
    name: &str,
    gender: VoiceGender,
    accent: &str,
    language: Language,
    description: &str,
    premium: bool,
    sample_text: &str,
) -> Voice {
    let first = id.split('-').next().unwrap_or(id);
    Voice {
        id: id.to_string(),
        name: name.to_string(),
        gender,
        accent: accent.to_string(),
        language,
        preview_url: format!("/audio/previews/{}.mp3", first),
        description: description.to_string(),
        premium,
        sample_text: sample_text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_six_voices() {
        let catalog = VoiceCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        let sarah = catalog.get("sarah-us-female").unwrap();
        assert_eq!(sarah.preview_url, "/audio/previews/sarah.mp3");
        assert!(!sarah.premium);
    }

    #[test]
    fn filters_combine() {
        let catalog = VoiceCatalog::builtin();
        let listing = catalog.list(&VoiceFilters {
            gender: Some(VoiceGender::Female),
            premium: Some(true),
            ..Default::default()
        });
        let ids: Vec<&str> = listing.voices.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["emma-gb-female", "sophia-au-female"]);
        assert_eq!(listing.total, 6);
        assert_eq!(listing.filtered, 2);

        let british = catalog.list(&VoiceFilters {
            language: Some(Language::EnGb),
            ..Default::default()
        });
        assert_eq!(british.filtered, 2);

        let none = catalog.list(&VoiceFilters {
            gender: Some(VoiceGender::Neutral),
            ..Default::default()
        });
        assert!(none.voices.is_empty());
    }

    #[test]
    fn unknown_preview_falls_back_to_default() {
        let catalog = VoiceCatalog::builtin();
        assert_eq!(catalog.preview_url("nobody"), DEFAULT_PREVIEW_URL);
        assert_eq!(catalog.preview_url("miguel-es-male"), "/audio/previews/miguel.mp3");
    }

    #[test]
    fn language_tags_parse_and_serialize() {
        assert_eq!("en-gb".parse::<Language>().unwrap(), Language::EnGb);
        assert!("xx-XX".parse::<Language>().is_err());
        assert_eq!(serde_json::to_string(&Language::EsEs).unwrap(), "\"es-ES\"");
        assert_eq!("Female".parse::<VoiceGender>().unwrap(), VoiceGender::Female);
    }
}
