use const_format::concatcp;

// Root
pub const API_PREFIX: &str = "/api";

// Paths
pub const SCAN_PATH: &str = concatcp!(API_PREFIX, "/scan");
pub const ADD_PATH: &str = concatcp!(API_PREFIX, "/add");
pub const REMOVE_PATH: &str = concatcp!(API_PREFIX, "/remove");

// Query parameters
pub const MIN_MCAP_PARAM: &str = "min_mcap";
