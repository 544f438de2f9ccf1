use std::io;
use std::path::PathBuf;

const CHECKPOINT_DIR_NAME: &str = "temp_downloads";

/// Default checkpoint folder: `temp_downloads` under the user's downloads
/// directory, falling back to the home directory when no downloads directory
/// is known to the platform.
pub fn default_checkpoint_dir() -> io::Result<PathBuf> {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join(CHECKPOINT_DIR_NAME))
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine a downloads or home directory",
            )
        })
}
