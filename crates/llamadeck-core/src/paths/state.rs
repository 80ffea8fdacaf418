//! Location of the persisted server state file.

use std::path::PathBuf;

use super::PathError;
use super::platform::data_root;

/// File name of the state file under the data root.
pub const STATE_FILE_NAME: &str = "server.pid";

/// Returns the path of the state file recording the last spawned server.
///
/// Location: `<data_root>/server.pid`
pub fn state_file_path() -> Result<PathBuf, PathError> {
    Ok(data_root()?.join(STATE_FILE_NAME))
}
