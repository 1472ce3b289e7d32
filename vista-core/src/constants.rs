//! Constants for VISTA
//!
//! Defaults for the search pipeline and the values stored by the
//! relationship graph. Environment overrides live in [`crate::config`].

// ============================================================================
// SEARCH
// ============================================================================

/// Default index searched by every sub-query.
pub const DEFAULT_INDEX_NAME: &str = "staging";

/// Field matched against the query text when the request names none.
pub const DEFAULT_SEARCH_FIELD: &str = "name";

/// Top-N cap per requested type. Deeper pagination is not supported.
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Offset of every sub-query.
pub const SEARCH_FROM: u32 = 0;

// ============================================================================
// LISTENER
// ============================================================================

/// Default number of requests processed concurrently by one listener.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

// ============================================================================
// RELATIONSHIP GRAPH VALUES
// ============================================================================

/// Look-me privacy: anyone may find the user.
pub const LOOK_ME_EVERYONE: i64 = 1;

/// Look-me privacy: only the user's inner circle may find the user.
pub const LOOK_ME_INNER_CIRCLE: i64 = 2;

/// Moderation flag that hides a post from everyone but its author.
pub const MODERATION_OFFENSIVE: &str = "offensive";
