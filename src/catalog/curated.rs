//! Hand-picked filter options for each upstream. Ids are the upstream's own.

use super::CuratedFilters;
use crate::models::FilterOption;

const fn opt(id: u32, name: &'static str) -> FilterOption {
    FilterOption { id, name }
}

pub static GIANTBOMB_FILTERS: CuratedFilters = CuratedFilters {
    genres: &[
        opt(1, "Action"),
        opt(4, "Adventure"),
        opt(5, "Role-Playing"),
        opt(7, "Strategy"),
        opt(3, "Simulation"),
        opt(11, "Shooter"),
        opt(6, "Driving/Racing"),
        opt(9, "Sports"),
        opt(10, "Fighting"),
        opt(20, "Puzzle"),
        opt(2, "Platformer"),
        opt(24, "Music/Rhythm"),
        opt(35, "Action-Adventure"),
        opt(36, "MMORPG"),
        opt(43, "Brawler"),
        opt(44, "Real-Time Strategy"),
        opt(49, "Card Game"),
    ],
    concepts: &[
        opt(1022, "Open World"),
        opt(207, "Roguelike"),
        opt(3063, "Metroidvania"),
        opt(1161, "Cooperative Play"),
        opt(4173, "Split-Screen Multiplayer"),
        opt(2086, "Time Travel"),
        opt(1143, "Post-Apocalyptic"),
        opt(292, "Dungeon Crawler"),
        opt(1316, "Stealth"),
        opt(3326, "Cult Favorite"),
        opt(1037, "Zombies"),
        opt(3178, "Pixel Graphics"),
    ],
    primary_platform_ids: &[94, 176, 179, 157, 146, 145, 96, 123],
};

pub static RAWG_FILTERS: CuratedFilters = CuratedFilters {
    genres: &[
        opt(4, "Action"),
        opt(51, "Indie"),
        opt(3, "Adventure"),
        opt(5, "RPG"),
        opt(10, "Strategy"),
        opt(2, "Shooter"),
        opt(40, "Casual"),
        opt(14, "Simulation"),
        opt(7, "Puzzle"),
        opt(11, "Arcade"),
        opt(83, "Platformer"),
        opt(1, "Racing"),
        opt(59, "Massively Multiplayer"),
        opt(15, "Sports"),
        opt(6, "Fighting"),
        opt(19, "Family"),
        opt(28, "Board Games"),
        opt(34, "Educational"),
        opt(17, "Card"),
    ],
    concepts: &[
        opt(31, "Singleplayer"),
        opt(7, "Multiplayer"),
        opt(36, "Open World"),
        opt(18, "Co-op"),
        opt(118, "Story Rich"),
        opt(32, "Sci-fi"),
        opt(40, "Atmospheric"),
        opt(16, "Horror"),
        opt(64, "Fantasy"),
        opt(1, "Survival"),
    ],
    primary_platform_ids: &[4, 187, 186, 7, 18, 1, 3, 21],
};
