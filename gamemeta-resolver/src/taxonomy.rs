//! Free-text label → fixed taxonomy mapping
//!
//! Upstream catalogs tag games with arbitrary labels ("RPG", "Open World",
//! "Co-op"). These tables fold them into the host application's genre,
//! theme and feature enums. Matching is case-insensitive and exact; unmapped
//! labels become `Unknown` (genre/theme) or `None` (feature).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Genre {
    Unknown,
    Action,
    Adventure,
    Indie,
    RolePlaying,
    Strategy,
    RealTimeStrategy,
    TurnBasedStrategy,
    Tactical,
    Simulator,
    Racing,
    Sport,
    Shooter,
    Arcade,
    Puzzle,
    Platform,
    Fighting,
    PointAndClick,
    HackAndSlashBeatEmUp,
    VisualNovel,
    CardAndBoardGame,
    Mmo,
    Moba,
    Pinball,
    QuizTrivia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Theme {
    Unknown,
    Fantasy,
    ScienceFiction,
    Horror,
    Thriller,
    Survival,
    Historical,
    Stealth,
    Comedy,
    Business,
    Drama,
    NonFiction,
    Sandbox,
    Kids,
    OpenWorld,
    Warfare,
    Mystery,
    Romance,
    Erotic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    Singleplayer,
    Multiplayer,
    CoOp,
    Crossplay,
    Achievements,
    ControllerSupport,
    CloudSaves,
    Leaderboards,
    Splitscreen,
    Modding,
    Vr,
    Ar,
    Workshop,
    RemotePlay,
    LocalMultiplayer,
    OnlinePvp,
    OnlinePve,
    LocalPvp,
    LocalPve,
}

pub fn map_genre(label: &str) -> Genre {
    match label.trim().to_lowercase().as_str() {
        "action" => Genre::Action,
        "adventure" => Genre::Adventure,
        "indie" => Genre::Indie,
        "rpg" | "role-playing" | "crpg" | "jrpg" => Genre::RolePlaying,
        "strategy" => Genre::Strategy,
        "rts" | "real-time strategy" | "real-time" => Genre::RealTimeStrategy,
        "turn-based strategy" | "turn-based" => Genre::TurnBasedStrategy,
        "tactical" | "tactical rpg" => Genre::Tactical,
        "simulation" | "sim" | "walking simulator" => Genre::Simulator,
        "racing" => Genre::Racing,
        "sports" | "team sport" => Genre::Sport,
        "shooter" | "fps" | "fpp" | "tpp" | "shoot 'em up" | "twin stick shooter" => {
            Genre::Shooter
        }
        "arcade" => Genre::Arcade,
        "puzzle" | "logic" | "puzzle platformer" => Genre::Puzzle,
        "platformer" => Genre::Platform,
        "fighting" => Genre::Fighting,
        "point-and-click" | "point&click" => Genre::PointAndClick,
        "hack and slash" | "beat 'em up" => Genre::HackAndSlashBeatEmUp,
        "visual novel" => Genre::VisualNovel,
        "card game" | "board game" => Genre::CardAndBoardGame,
        "mmo" => Genre::Mmo,
        "moba" => Genre::Moba,
        "pinball" => Genre::Pinball,
        "quiz" | "trivia" => Genre::QuizTrivia,
        _ => Genre::Unknown,
    }
}

pub fn map_theme(label: &str) -> Theme {
    match label.trim().to_lowercase().as_str() {
        "fantasy" | "magic" | "supernatural" | "medieval" | "mythology" => Theme::Fantasy,
        "sci-fi" | "science fiction" | "science" | "space" | "cyberpunk" | "robots"
        | "steampunk" | "dystopian" | "post-apocalyptic" => Theme::ScienceFiction,
        "horror" | "psychological horror" | "survival horror" => Theme::Horror,
        "thriller" | "atmospheric" | "dark" => Theme::Thriller,
        "survival" => Theme::Survival,
        "historical" | "world war ii" | "world war i" | "western" | "noir" | "classic" => {
            Theme::Historical
        }
        "stealth" => Theme::Stealth,
        "comedy" | "funny" | "parody" | "dark comedy" => Theme::Comedy,
        "business" | "managerial" | "management" | "economic" | "trading"
        | "transportation" => Theme::Business,
        "drama" | "emotional" | "story rich" | "narrative" => Theme::Drama,
        "non-fiction" | "educational" | "programming" => Theme::NonFiction,
        "sandbox" => Theme::Sandbox,
        "kids" | "family" | "family friendly" => Theme::Kids,
        "open world" => Theme::OpenWorld,
        "warfare" | "war" | "military" | "combat" => Theme::Warfare,
        "mystery" | "detective" | "investigation" | "detective-mystery" | "lovecraftian" => {
            Theme::Mystery
        }
        "romance" | "dating sim" => Theme::Romance,
        "erotic" | "adult" | "sexual content" | "nudity" | "nsfw" | "hentai" | "mature" => {
            Theme::Erotic
        }
        _ => Theme::Unknown,
    }
}

pub fn map_feature(label: &str) -> Option<Feature> {
    let feature = match label.trim().to_lowercase().as_str() {
        "single-player" | "single" => Feature::Singleplayer,
        "multi-player" | "multiplayer" | "online multiplayer" | "galaxy multiplayer" => {
            Feature::Multiplayer
        }
        "co-op" | "cooperative" | "online co-op" | "local co-op" => Feature::CoOp,
        "cross-platform multiplayer" | "crossplay" => Feature::Crossplay,
        "achievements" | "overlay" => Feature::Achievements,
        "controller support" | "full controller support" | "partial controller support" => {
            Feature::ControllerSupport
        }
        "cloud saves" => Feature::CloudSaves,
        "leaderboards" => Feature::Leaderboards,
        "split-screen" | "split screen" => Feature::Splitscreen,
        "moddable" | "mods" | "mod" => Feature::Modding,
        "vr" => Feature::Vr,
        "ar" => Feature::Ar,
        "workshop" => Feature::Workshop,
        "remote play" => Feature::RemotePlay,
        "local multiplayer" => Feature::LocalMultiplayer,
        "online pvp" => Feature::OnlinePvp,
        "online pve" => Feature::OnlinePve,
        "local pvp" => Feature::LocalPvp,
        "local pve" => Feature::LocalPve,
        _ => return None,
    };
    Some(feature)
}

/// Mapped sets for one record's pooled labels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub genres: BTreeSet<Genre>,
    pub themes: BTreeSet<Theme>,
    pub features: BTreeSet<Feature>,
}

/// Run every label through all three mappers, dropping unknowns
pub fn classify<'a>(labels: impl IntoIterator<Item = &'a str>) -> Classification {
    let mut classification = Classification::default();
    for label in labels {
        let genre = map_genre(label);
        if genre != Genre::Unknown {
            classification.genres.insert(genre);
        }
        let theme = map_theme(label);
        if theme != Theme::Unknown {
            classification.themes.insert(theme);
        }
        if let Some(feature) = map_feature(label) {
            classification.features.insert(feature);
        }
    }
    classification
}
