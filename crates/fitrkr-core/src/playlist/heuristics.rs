//! Advisory block naming and type suggestions used to pre-fill fields.
//! Nothing here is enforced.

use fitrkr_db::models::BlockType;

/// Suggest a display name for a block.
///
/// An empty first block gets a primary name; later blocks get a counter
/// prefixed by their type.
pub fn suggest_block_name(block_type: BlockType, block_order: i32, has_exercises: bool) -> String {
    if block_order == 1 && !has_exercises {
        return match block_type {
            BlockType::Warmup => "Warm-up".to_owned(),
            BlockType::Cardio => "Cardio".to_owned(),
            BlockType::Cooldown => "Cool-down".to_owned(),
            _ => "Main Block".to_owned(),
        };
    }

    match block_type {
        BlockType::Superset => format!("Superset {block_order}"),
        BlockType::Triset => format!("Triset {block_order}"),
        BlockType::Circuit => format!("Circuit {block_order}"),
        BlockType::Dropset => format!("Dropset {block_order}"),
        BlockType::Cardio => format!("Cardio {block_order}"),
        BlockType::Warmup => "Warm-up".to_owned(),
        BlockType::Cooldown => "Cool-down".to_owned(),
        BlockType::Standard | BlockType::Playlist => format!("Block {block_order}"),
    }
}

/// Suggest a block type from the playlist title, the block's position and
/// how many exercises it holds. Title keywords win.
pub fn suggest_block_type(exercise_count: usize, is_first_block: bool, playlist_title: &str) -> BlockType {
    let title = playlist_title.to_lowercase();
    if title.contains("cardio") {
        return BlockType::Cardio;
    }
    if title.contains("warmup") || title.contains("warm-up") {
        return BlockType::Warmup;
    }
    if title.contains("cooldown") || title.contains("cool-down") {
        return BlockType::Cooldown;
    }

    if is_first_block {
        return BlockType::Standard;
    }

    match exercise_count {
        2 => BlockType::Superset,
        3 => BlockType::Triset,
        4..=6 => BlockType::Circuit,
        _ => BlockType::Standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_first_block_gets_primary_name() {
        assert_eq!(suggest_block_name(BlockType::Warmup, 1, false), "Warm-up");
        assert_eq!(suggest_block_name(BlockType::Cardio, 1, false), "Cardio");
        assert_eq!(suggest_block_name(BlockType::Cooldown, 1, false), "Cool-down");
        assert_eq!(suggest_block_name(BlockType::Superset, 1, false), "Main Block");
        assert_eq!(suggest_block_name(BlockType::Playlist, 1, false), "Main Block");
    }

    #[test]
    fn later_blocks_get_type_counter() {
        assert_eq!(suggest_block_name(BlockType::Standard, 3, false), "Block 3");
        assert_eq!(suggest_block_name(BlockType::Superset, 2, true), "Superset 2");
        assert_eq!(suggest_block_name(BlockType::Triset, 4, true), "Triset 4");
        assert_eq!(suggest_block_name(BlockType::Circuit, 2, false), "Circuit 2");
        assert_eq!(suggest_block_name(BlockType::Dropset, 5, true), "Dropset 5");
        assert_eq!(suggest_block_name(BlockType::Cardio, 2, true), "Cardio 2");
        assert_eq!(suggest_block_name(BlockType::Playlist, 2, true), "Block 2");
    }

    #[test]
    fn first_block_with_exercises_uses_counter() {
        assert_eq!(suggest_block_name(BlockType::Standard, 1, true), "Block 1");
    }

    #[test]
    fn warmup_and_cooldown_never_numbered() {
        assert_eq!(suggest_block_name(BlockType::Warmup, 5, true), "Warm-up");
        assert_eq!(suggest_block_name(BlockType::Cooldown, 7, true), "Cool-down");
    }

    #[test]
    fn title_keywords_take_precedence() {
        assert_eq!(suggest_block_type(2, false, "Morning CARDIO"), BlockType::Cardio);
        assert_eq!(suggest_block_type(3, true, "Quick Warm-up"), BlockType::Warmup);
        assert_eq!(suggest_block_type(0, false, "warmup flow"), BlockType::Warmup);
        assert_eq!(suggest_block_type(4, false, "Cool-down stretch"), BlockType::Cooldown);
        assert_eq!(suggest_block_type(4, false, "cooldown"), BlockType::Cooldown);
    }

    #[test]
    fn first_block_defaults_to_standard() {
        assert_eq!(suggest_block_type(2, true, "Push Day"), BlockType::Standard);
    }

    #[test]
    fn exercise_count_drives_later_blocks() {
        assert_eq!(suggest_block_type(1, false, "Push Day"), BlockType::Standard);
        assert_eq!(suggest_block_type(2, false, "Push Day"), BlockType::Superset);
        assert_eq!(suggest_block_type(3, false, "Push Day"), BlockType::Triset);
        for n in 4..=6 {
            assert_eq!(suggest_block_type(n, false, "Push Day"), BlockType::Circuit);
        }
        assert_eq!(suggest_block_type(7, false, "Push Day"), BlockType::Standard);
    }
}
