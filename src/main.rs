//! # photo-archive CLI
//!
//! Command-line interface for the photo archiver.
//!
//! ## Usage
//! ```bash
//! photo-archive ~/Downloads/camera /media/sdcard
//! photo-archive --user alice ~/Phone
//! ```

mod cli;

use photo_archiver::Result;

fn main() -> Result<()> {
    cli::run()
}
