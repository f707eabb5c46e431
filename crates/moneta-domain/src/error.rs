use thiserror::Error;

/// Fatal structural failures. Raised by record constructors, single-field
/// updates and every Budget mutator; the attempted change is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("day value {0} is outside the supported calendar range")]
    DateOutOfRange(i32),
    #[error("{year:04}-{month:02}-{day:02} is not a valid calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },
    #[error("unparsable date literal: {0}")]
    UnparsableDate(String),
    #[error("budget end date (day {end}) precedes start date (day {start})")]
    DateRangeReversed { start: i32, end: i32 },
    #[error("{entity} id {id} must be positive")]
    NonPositiveId { entity: &'static str, id: i64 },
    #[error("duplicate {entity} id {id}")]
    DuplicateId { entity: &'static str, id: i64 },
    #[error("{entity} has no id")]
    MissingId { entity: &'static str },
    #[error("rule repeat factor must be at least 1")]
    RuleRepeatZero,
    #[error("transaction detail list is empty")]
    EmptyTransactionDetail,
    #[error("transfer transaction carries a categorized detail")]
    TransferDetailHasCategory,
    #[error("category {category} belongs to no group")]
    CategoryWithoutGroup { category: i64 },
    #[error("category {category} references unknown group {group}")]
    UnknownGroup { category: i64, group: i64 },
    #[error("unknown currency code `{code}`")]
    UnknownCurrency { code: String },
    #[error("category {category} has overlapping rules")]
    OverlappingRules { category: i64 },
    #[error("group {group} still contains categories")]
    GroupNotEmpty { group: i64 },
    #[error("transaction references unknown account {account}")]
    UnknownAccount { account: i64 },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("position {index} is out of bounds for a list of {len}")]
    IndexOutOfBounds { index: usize, len: usize },
    #[error("transactions are not in chronological order")]
    TransactionsOutOfOrder,
    #[error("categories are not ordered by their groups")]
    CategoriesOutOfOrder,
    #[error("unsupported data format major version {major}")]
    UnsupportedVersion { major: u32 },
}
