mod error;
mod filter;
mod hint;
mod operator;
mod path;
mod projection;
mod query;
mod read_preference;
mod sort;
mod walk;

pub use error::{LookupError, QueryError};
pub use filter::{Filter, FilterGroup, FilterNode, LogicalOp, parse_keyword};
pub use hint::Hint;
pub use operator::Operator;
pub use path::ProjectionPath;
pub use projection::{
    OverlapPolicy, Presence, ProjectionMode, ProjectionResolver, ProjectionSet, resolve,
};
pub use query::Query;
pub use read_preference::ReadPreference;
pub use sort::{Sort, SortDirection, parse_order_key};
pub use walk::{Resolved, resolve_path, resolve_path_scoped};
