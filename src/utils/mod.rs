pub mod roll_cache;
pub mod roll_index;
