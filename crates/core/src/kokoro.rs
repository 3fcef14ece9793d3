//! Kokoro-82M language and voice catalog.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub full_code: &'static str,
    pub g2p: &'static str,
    pub fallback: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Female,
    Male,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Voice {
    pub id: &'static str,
    pub name: &'static str,
    pub gender: Gender,
    pub lang: &'static str,
}

pub const DEFAULT_VOICE: &str = "af_heart";
pub const DEFAULT_LANG_CODE: &str = "a";

pub static LANGUAGES: &[Language] = &[
    Language { code: "a", name: "American English", full_code: "en-us", g2p: "misaki[en]", fallback: Some("espeak-ng en-us") },
    Language { code: "b", name: "British English", full_code: "en-gb", g2p: "misaki[en]", fallback: Some("espeak-ng en-gb") },
    Language { code: "e", name: "Spanish", full_code: "es", g2p: "espeak-ng", fallback: Some("espeak-ng es") },
    Language { code: "f", name: "French", full_code: "fr-fr", g2p: "espeak-ng", fallback: Some("espeak-ng fr-fr") },
    Language { code: "h", name: "Hindi", full_code: "hi", g2p: "espeak-ng", fallback: Some("espeak-ng hi") },
    Language { code: "i", name: "Italian", full_code: "it", g2p: "espeak-ng", fallback: Some("espeak-ng it") },
    Language { code: "p", name: "Brazilian Portuguese", full_code: "pt-br", g2p: "espeak-ng", fallback: Some("espeak-ng pt-br") },
    Language { code: "j", name: "Japanese", full_code: "ja", g2p: "misaki[ja]", fallback: None },
    Language { code: "z", name: "Mandarin Chinese", full_code: "zh", g2p: "misaki[zh]", fallback: None },
];

const fn voice(id: &'static str, name: &'static str, gender: Gender, lang: &'static str) -> Voice {
    Voice { id, name, gender, lang }
}

use Gender::{Female, Male};

pub static VOICES: &[Voice] = &[
    // American English
    voice("af_heart", "Heart (Female)", Female, "a"),
    voice("af_bella", "Bella (Female)", Female, "a"),
    voice("af_sarah", "Sarah (Female)", Female, "a"),
    voice("af_nicole", "Nicole (Female)", Female, "a"),
    voice("af_sky", "Sky (Female)", Female, "a"),
    voice("af", "AF (Female)", Female, "a"),
    voice("am_adam", "Adam (Male)", Male, "a"),
    voice("am_michael", "Michael (Male)", Male, "a"),
    voice("am", "AM (Male)", Male, "a"),
    // British English
    voice("bf_emma", "Emma (Female)", Female, "b"),
    voice("bf_isabella", "Isabella (Female)", Female, "b"),
    voice("bf", "BF (Female)", Female, "b"),
    voice("bm_george", "George (Male)", Male, "b"),
    voice("bm_lewis", "Lewis (Male)", Male, "b"),
    voice("bm", "BM (Male)", Male, "b"),
    voice("jf", "JF (Female)", Female, "j"),
    voice("jm", "JM (Male)", Male, "j"),
    voice("zf", "ZF (Female)", Female, "z"),
    voice("zm", "ZM (Male)", Male, "z"),
    voice("ef", "EF (Female)", Female, "e"),
    voice("em", "EM (Male)", Male, "e"),
    voice("ff", "FF (Female)", Female, "f"),
    voice("hf", "HF (Female)", Female, "h"),
    voice("hm", "HM (Male)", Male, "h"),
    voice("if", "IF (Female)", Female, "i"),
    voice("im", "IM (Male)", Male, "i"),
    voice("pf", "PF (Female)", Female, "p"),
    voice("pm", "PM (Male)", Male, "p"),
];

pub fn language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code == code)
}

pub fn voices_for(lang_code: &str) -> Vec<&'static Voice> {
    VOICES.iter().filter(|v| v.lang == lang_code).collect()
}

pub fn find_voice(id: &str) -> Option<&'static Voice> {
    VOICES.iter().find(|v| v.id == id)
}

/// Comma-separated list of language codes, for error messages.
pub fn language_codes() -> String {
    LANGUAGES
        .iter()
        .map(|l| l.code)
        .collect::<Vec<_>>()
        .join(", ")
}
