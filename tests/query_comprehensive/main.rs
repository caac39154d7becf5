//! Strata Query Comprehensive Test Suite
//!
//! End-to-end tests through the `strata_query` facade.
//!
//! ## Test Tiers
//!
//! - **Tier 1**: Document store contract (set/get/list/delete, write policies)
//! - **Tier 2**: Secondary index lookups and maintenance
//! - **Tier 3**: Persisted layout compatibility (keys, envelope, fingerprints)
//! - **Tier 4**: Write interception with custom handlers
//! - **Tier 5**: Configuration
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test query_comprehensive
//! ```

mod test_utils;

// Tier 1: Document store
mod tier1_document_store;

// Tier 2: Secondary index
mod tier2_secondary_index;

// Tier 3: Persisted layout
mod tier3_persisted_layout;

// Tier 4: Event hub
mod tier4_event_hub;

// Tier 5: Configuration
mod tier5_config;
