pub mod clean;
pub mod dates;
pub mod table;

pub use clean::{extract_link, strip_markup};
pub use dates::parse_posting_date;
pub use table::{table_rows, RawRow};
