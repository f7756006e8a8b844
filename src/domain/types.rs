//! Validated newtypes for the values that cross the HTTP boundary
//!
//! Raw request fields are turned into these types once, in the API layer, so
//! the rest of the crate never re-checks lengths or character sets.

use nutype::nutype;

use crate::domain::validation_constants::discovery::DEFAULT_MAX_RESULTS;

/// Owner segment of a GitHub repository path (user or organisation)
#[nutype(
    validate(
        not_empty,
        len_char_max = 100,
        regex = r"^[\w.\-]+$"
    ),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct RepoOwner(String);

/// Repository segment of a GitHub repository path
#[nutype(
    validate(
        not_empty,
        len_char_max = 100,
        regex = r"^[\w.\-]+$"
    ),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct RepoName(String);

/// Free-text discovery request
///
/// Anything shorter than ten characters is rejected before a completion call
/// is issued; there is not enough signal in it to recommend anything.
#[nutype(
    validate(len_char_min = 10, len_char_max = 2000),
    derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsRef, Display)
)]
pub struct DiscoveryQuery(String);

/// Number of recommendations requested from a discovery run
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 10),
    default = DEFAULT_MAX_RESULTS,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        Serialize,
        Deserialize,
        AsRef,
        Display,
        Default
    )
)]
pub struct MaxResults(u8);

/// Model identifier passed verbatim to the completion provider
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 200),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct ModelName(String);

/// Credential for the completion provider
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(Clone, PartialEq, Eq, AsRef)
)]
pub struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
