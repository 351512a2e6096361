use chrono::{DateTime, Local, Utc};

/// Format a rupee amount with two decimals, e.g. `Rs.1299.00`.
pub fn format_amount(amount: f64) -> String {
	format!("Rs.{:.2}", amount)
}

/// Format a timestamp in local time as `M/D/YYYY, h:mm:ss AM`.
pub fn format_local_time(at: DateTime<Utc>) -> String {
	at.with_timezone(&Local)
		.format("%-m/%-d/%Y, %-I:%M:%S %p")
		.to_string()
}
