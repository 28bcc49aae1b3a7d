use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use time::{OffsetDateTime, macros::format_description};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.usage(AnsiColor::Magenta.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Report file name: `<name>.md` when a name is given, `summary_<timestamp>.md` otherwise.
///
/// A trailing `.md` on `name` is not doubled.
pub fn report_file_name(name: Option<&str>, at: OffsetDateTime) -> String {
	if let Some(name) = name.map(str::trim).filter(|name| !name.is_empty()) {
		let stem = name.strip_suffix(".md").unwrap_or(name);

		return format!("{stem}.md");
	}

	let stamp = at
		.format(format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]"))
		.unwrap_or_else(|_| at.unix_timestamp().to_string());

	format!("summary_{stamp}.md")
}

/// Current time in UTC. Report timestamps are always UTC.
pub fn now() -> OffsetDateTime {
	OffsetDateTime::now_utc()
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn timestamped_name_without_explicit_name() {
		let at = datetime!(2025-03-07 09:05:02 UTC);

		assert_eq!(report_file_name(None, at), "summary_2025-03-07_09-05-02.md");
		assert_eq!(report_file_name(Some("  "), at), "summary_2025-03-07_09-05-02.md");
	}

	#[test]
	fn explicit_name_gets_one_extension() {
		let at = datetime!(2025-03-07 09:05:02 UTC);

		assert_eq!(report_file_name(Some("escrow"), at), "escrow.md");
		assert_eq!(report_file_name(Some("escrow.md"), at), "escrow.md");
	}

	#[test]
	fn timestamps_are_utc() {
		let at = now();
		let name = report_file_name(None, at);

		assert!(at.offset().is_utc());
		assert!(name.starts_with(&format!("summary_{}-", at.year())));
		assert!(name.ends_with(".md"));
	}
}
