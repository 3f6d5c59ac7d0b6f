pub const MAX_RECIPE_NAME_LENGTH: usize = 256;
pub const MAX_TAG_NAME_LENGTH: usize = 32;
pub const MAX_TAG_SLUG_LENGTH: usize = 32;
pub const MAX_INGREDIENT_NAME_LENGTH: usize = 128;
pub const MAX_MEASUREMENT_UNIT_LENGTH: usize = 64;

pub const MIN_AMOUNT: i32 = 1;
pub const MAX_AMOUNT: i32 = 32000;

pub const MIN_COOKING_TIME: i32 = 1;
pub const MAX_COOKING_TIME: i32 = 32000;

pub const SHORT_LINK_LENGTH: usize = 8;
/// Upper bound on fresh candidates tried before giving up with `TokenExhaustion`.
pub const SHORT_LINK_MAX_ATTEMPTS: usize = 16;

/// Ids per membership query; stays well below SQLite's bound-parameter limit.
pub const ANNOTATION_BATCH_SIZE: usize = 10_000;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://foodgram.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
