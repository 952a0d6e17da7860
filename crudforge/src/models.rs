use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use utoipa::{IntoParams, ToSchema};

/// Query parameters for paginated list endpoints.
///
/// Both values are coerced to integers `>= 1` during deserialization: numeric
/// strings and floats are accepted and normalized (floored, then clamped)
/// rather than rejected.
///
/// Example: `page=2&size=20`
#[derive(Debug, Clone, Copy, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// Page number, 1-based.
    #[serde(default = "default_page", deserialize_with = "coerce_positive")]
    #[param(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_size", deserialize_with = "coerce_positive")]
    #[param(example = 10)]
    pub size: u64,
}

impl PageRequest {
    /// Build a request programmatically; non-positive values are clamped to 1.
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            size: default_size(),
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_size() -> u64 {
    10
}

/// Accepts integers, floats and numeric strings; floors and clamps to `>= 1`.
fn coerce_positive<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u64),
        Float(f64),
        Text(String),
    }

    let value = match Raw::deserialize(deserializer)? {
        Raw::Int(n) => return Ok(n.max(1)),
        Raw::Float(f) => f,
        Raw::Text(s) => s
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("invalid number: {s}")))?,
    };
    if value.is_finite() && value >= 1.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(value.floor() as u64)
    } else {
        Ok(1)
    }
}

/// Metadata attached to one page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    /// The requested page, echoed back even past the end of the result set.
    pub page: u64,
    /// Items per page.
    pub size: u64,
    /// Total rows matching the query predicate.
    pub total_items: u64,
    /// `ceil(total_items / size)`.
    pub total_pages: u64,
    /// `size` on every full page; the remainder on the last page.
    pub item_count: u64,
}

/// One page of records plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Map the item type, keeping the metadata untouched.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Request body for batch deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest<Id> {
    pub ids: Vec<Id>,
}

/// Affected-row outcome of a batch delete or restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteOutcome {
    pub affected: u64,
}
