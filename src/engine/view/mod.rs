mod ledger;
mod materialized;


pub use ledger::RowLedger;
pub use materialized::AggregateView;
