mod root;
mod state;

pub(crate) use state::{AppState, FetchKind, OrderForm, PendingFetch, ShellAction, StatusLine, parse_price};

pub use root::App;
