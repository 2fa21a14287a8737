// Error codes
// Stable identifiers surfaced in API error bodies and structured logs.

pub mod validation {
    pub const INVALID_INPUT: &str = "VALIDATION_1001";
}

pub mod catalog {
    pub const LOAD_FAILED: &str = "CATALOG_2001";
}

pub mod configuration {
    pub const INVALID_SETTING: &str = "CONFIG_3001";
}

pub mod processing {
    pub const CASE_FAILED: &str = "PROCESSING_4001";
    pub const INTERNAL: &str = "PROCESSING_4002";
}

pub mod transport {
    pub const SERVER: &str = "TRANSPORT_5001";
    pub const NETWORK: &str = "TRANSPORT_5002";
}
