pub(crate) mod date;
pub(crate) mod timezone;

pub(crate) use date::{next_months_window, parse_date};
pub(crate) use timezone::Timezone;
