// src/data_input/organize.rs

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{MEASUREMENT_NUMBER_LEN, RAW_STEM_PREFIX_LEN, RAW_STEM_SUFFIX_LEN};
use crate::data_input::scan_parser::parse_scan_file;

/// Reorganizes raw instrument dumps into temperature subfolders.
///
/// Each measurement folder under `<data_path>/input/` may hold session
/// folders straight from the susceptometer. Files in a session folder are
/// grouped by their measurement number, labeled with the mean bath
/// temperature of the group, and moved into `<T>K/<freq>Hz.txt`. Session
/// folders are removed once emptied. Folders whose names already end in
/// `K` are considered organized and left alone, so a second run is a no-op.
pub fn organize(data_path: &Path) -> Result<(), Box<dyn Error>> {
    let input_folder = data_path.join("input");

    for measurement_entry in fs::read_dir(&input_folder)? {
        let measurement_folder = measurement_entry?.path();
        if !measurement_folder.is_dir() {
            continue;
        }

        for session_entry in fs::read_dir(&measurement_folder)? {
            let session_folder = session_entry?.path();
            if !session_folder.is_dir() || is_temperature_folder(&session_folder) {
                continue;
            }
            organize_session(&measurement_folder, &session_folder)?;
        }
    }

    Ok(())
}

fn organize_session(
    measurement_folder: &Path,
    session_folder: &Path,
) -> Result<(), Box<dyn Error>> {
    println!("  Organizing session '{}'...", session_folder.display());

    remove_non_txt_files(session_folder)?;

    // Group the remaining scan files by measurement number.
    let mut groups: BTreeMap<u32, Vec<PathBuf>> = BTreeMap::new();
    for entry in fs::read_dir(session_folder)? {
        let file = entry?.path();
        if !file.is_file() {
            continue;
        }
        match measurement_number(&file) {
            Some(number) => groups.entry(number).or_default().push(file),
            None => {
                eprintln!(
                    "Warning: '{}' does not follow the raw naming convention, leaving it in place",
                    file.display()
                );
            }
        }
    }

    for (number, files) in &groups {
        let label = match group_temperature_label(files) {
            Ok(label) => label,
            Err(e) => {
                eprintln!(
                    "Warning: Skipping measurement number {:04}: {}",
                    number, e
                );
                continue;
            }
        };

        let sorted_subfolder = measurement_folder.join(&label);
        fs::create_dir_all(&sorted_subfolder)?;

        for file in files {
            let Some(name) = organized_filename(file) else {
                eprintln!(
                    "Warning: '{}' has a stem too short to reorganize, leaving it in place",
                    file.display()
                );
                continue;
            };
            fs::rename(file, sorted_subfolder.join(name))?;
        }
    }

    // Only removable once every file has been moved out.
    if fs::read_dir(session_folder)?.next().is_none() {
        fs::remove_dir(session_folder)?;
    } else {
        eprintln!(
            "Warning: Session folder '{}' not empty after organizing, leaving it in place",
            session_folder.display()
        );
    }

    Ok(())
}

/// Organized temperature folders are named like "300K".
fn is_temperature_folder(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with('K'))
        .unwrap_or(false)
}

fn remove_non_txt_files(folder: &Path) -> Result<(), Box<dyn Error>> {
    for entry in fs::read_dir(folder)? {
        let file = entry?.path();
        if file.is_file() && file.extension().and_then(|e| e.to_str()) != Some("txt") {
            fs::remove_file(&file)?;
        }
    }
    Ok(())
}

/// Measurement number from the last four characters of a raw file stem.
pub fn measurement_number(file: &Path) -> Option<u32> {
    let stem = file.file_stem()?.to_str()?;
    let start = stem.len().checked_sub(MEASUREMENT_NUMBER_LEN)?;
    // `get` rejects multi-byte stems whose tail is not a char boundary.
    stem.get(start..)?.parse::<u32>().ok()
}

/// Organized name of a raw file: the stem with the session prefix and the
/// measurement-number suffix stripped, e.g. `<prefix>120Hz_0001.txt` becomes
/// `120Hz.txt`.
pub fn organized_filename(file: &Path) -> Option<String> {
    let stem = file.file_stem()?.to_str()?;
    if stem.len() <= RAW_STEM_PREFIX_LEN + RAW_STEM_SUFFIX_LEN {
        return None;
    }
    let label = stem.get(RAW_STEM_PREFIX_LEN..stem.len() - RAW_STEM_SUFFIX_LEN)?;
    Some(format!("{}.txt", label))
}

/// Temperature folder label for a group of scan files: the mean of the
/// per-file mean bath temperatures, rounded to the nearest kelvin.
fn group_temperature_label(files: &[PathBuf]) -> Result<String, Box<dyn Error>> {
    let mut file_means: Vec<f64> = Vec::new();
    for file in files {
        let scan = parse_scan_file(file)?;
        if let Some(mean) = scan.mean_temperature() {
            file_means.push(mean);
        }
    }
    if file_means.is_empty() {
        return Err("no finite temperature samples in any file of the group".into());
    }
    let mean = file_means.iter().sum::<f64>() / file_means.len() as f64;
    Ok(format!("{}K", mean.round()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measurement_number_reads_last_four_stem_chars() {
        let file = Path::new("ABCDEFGHIJKL120Hz_0023.txt");
        assert_eq!(measurement_number(file), Some(23));
        assert_eq!(measurement_number(Path::new("abc.txt")), None);
        assert_eq!(measurement_number(Path::new("no_number_here.txt")), None);
    }

    #[test]
    fn organized_filename_strips_prefix_and_suffix() {
        let file = Path::new("ABCDEFGHIJKL120Hz_0023.txt");
        assert_eq!(organized_filename(file), Some("120Hz.txt".to_string()));
        // Too short for the convention.
        assert_eq!(organized_filename(Path::new("short_0001.txt")), None);
    }

    #[test]
    fn multibyte_stems_fall_outside_the_convention() {
        // Slice boundaries inside '€' must reject the name, not panic.
        assert_eq!(measurement_number(Path::new("ab€€.txt")), None);
        assert_eq!(
            organized_filename(Path::new("ABCDEFGHIJK€120Hz_0001.txt")),
            None
        );
    }

    #[test]
    fn temperature_folders_end_in_kelvin_suffix() {
        assert!(is_temperature_folder(Path::new("/data/input/m1/300K")));
        assert!(!is_temperature_folder(Path::new("/data/input/m1/raw_dump")));
    }
}

// src/data_input/organize.rs
