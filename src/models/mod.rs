pub mod loaders;
pub mod record;
pub mod row;

pub use loaders::load_rows;
pub use record::{
    MatchKind, MatchOutcome, MatchStrategy, PendingRecord, ResultRecord, RowOutcome,
};
pub use row::{Row, RowRange};
