//! Help and error styling for the `cadview` binary.

use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};

/// Section headers stand out; flags and values read like the JSON keys they
/// map to; errors match the red `error:` prefix on stderr.
pub const CLI_STYLES: Styles = Styles::styled()
	.header(AnsiColor::Blue.on_default().effects(Effects::BOLD.insert(Effects::UNDERLINE)))
	.usage(AnsiColor::Blue.on_default().effects(Effects::BOLD))
	.literal(AnsiColor::BrightWhite.on_default().effects(Effects::BOLD))
	.placeholder(AnsiColor::Magenta.on_default())
	.error(AnsiColor::Red.on_default().effects(Effects::BOLD))
	.valid(AnsiColor::Green.on_default())
	.invalid(AnsiColor::Yellow.on_default().effects(Effects::BOLD));
