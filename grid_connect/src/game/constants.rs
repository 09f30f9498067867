/// Upper bound on `width`, `height` and `win_threshold`.
pub const MAX_BOARD_DIMENSION: usize = 100;

/// Match listings default to this many entries per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Match listings never return more than this many entries per page.
pub const MAX_PAGE_SIZE: usize = 100;
