mod perf;
mod time_utils;

pub use time_utils::{
    AppInstant, DATE_FORMAT, STANDARD_TIME_FORMAT, epoch_sec_to_date, epoch_sec_to_string,
    format_duration,
};
