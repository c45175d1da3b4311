mod event;


pub use event::{Change, ChangeEvent, RowId, fold_events};
