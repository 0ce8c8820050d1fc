use std::path::{Path, PathBuf};

use log::error;

pub mod cgf;
pub mod chr;
pub mod mtl;
pub mod skin;
pub mod summary;

#[cfg(test)]
mod tests;

/// `<directory>/<group_name>.<extension>`, None for an empty group name.
pub fn create_output_filename(group_name: &str, directory: &Path, extension: &str) -> Option<PathBuf> {
    if group_name.is_empty() {
        return None;
    }

    let mut filename = directory.join(group_name).into_os_string();
    filename.push(".");
    filename.push(extension);
    Some(PathBuf::from(filename))
}

pub fn ensure_target_folder_exists(filename: &Path) -> bool {
    let Some(folder) = filename.parent().filter(|folder| !folder.as_os_str().is_empty()) else {
        return true;
    };

    match std::fs::create_dir_all(folder) {
        Ok(()) => true,
        Err(err) => {
            error!("Unable to create target folder {}: {:?}", folder.display(), err);
            false
        }
    }
}

/// The output filename of a group, with its folder created.
pub(crate) fn prepare_output_file(group_name: &str, directory: &Path, extension: &str) -> Option<PathBuf> {
    let filename = create_output_filename(group_name, directory, extension)?;
    ensure_target_folder_exists(&filename).then_some(filename)
}
