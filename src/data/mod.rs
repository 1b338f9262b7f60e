pub mod csv_table;
pub mod source;
pub mod table;
pub mod trace_look;
pub mod transform;
pub mod x_formatter;
