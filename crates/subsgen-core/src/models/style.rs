//! Caption style catalog.
//!
//! The set is fixed; the processing service knows the same identifiers.
//! Colors are only used for rendering the picker.

use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StyleColors {
    pub primary: &'static str,
    pub highlight: &'static str,
    pub bg: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubtitleStyle {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub preview: &'static str,
    pub colors: StyleColors,
}

impl Display for SubtitleStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.name, self.id)
    }
}

pub const SUBTITLE_STYLES: &[SubtitleStyle] = &[
    SubtitleStyle {
        id: "hormozi",
        name: "Hormozi",
        description: "Bold yellow highlights",
        preview: "WORD BY WORD",
        colors: StyleColors {
            primary: "#FFFFFF",
            highlight: "#FFFF00",
            bg: "#000000",
        },
    },
    SubtitleStyle {
        id: "minimal",
        name: "Minimal",
        description: "Clean white text",
        preview: "Simple & Clean",
        colors: StyleColors {
            primary: "#FFFFFF",
            highlight: "#FFFFFF",
            bg: "transparent",
        },
    },
    SubtitleStyle {
        id: "neon",
        name: "Neon Glow",
        description: "Glowing cyan effect",
        preview: "NEON VIBES",
        colors: StyleColors {
            primary: "#00FFFF",
            highlight: "#FF00FF",
            bg: "#000000",
        },
    },
    SubtitleStyle {
        id: "fire",
        name: "Fire",
        description: "Orange & red energy",
        preview: "ON FIRE",
        colors: StyleColors {
            primary: "#FFFFFF",
            highlight: "#FF6600",
            bg: "#000000",
        },
    },
    SubtitleStyle {
        id: "karaoke",
        name: "Karaoke",
        description: "Green highlights",
        preview: "SING ALONG",
        colors: StyleColors {
            primary: "#FFFFFF",
            highlight: "#00FF00",
            bg: "#000000",
        },
    },
    SubtitleStyle {
        id: "purple",
        name: "Purple Vibes",
        description: "Trendy purple style",
        preview: "AESTHETIC",
        colors: StyleColors {
            primary: "#FFFFFF",
            highlight: "#A855F7",
            bg: "#000000",
        },
    },
];

pub fn find_style(id: &str) -> Option<&'static SubtitleStyle> {
    SUBTITLE_STYLES.iter().find(|style| style.id == id)
}

pub fn is_known_style(id: &str) -> bool {
    find_style(id).is_some()
}
